//! Cluster client errors

use thiserror::Error;

/// Errors that can occur when talking to the Kubernetes API
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Kubernetes client/transport error
    #[error("Kubernetes error: {0}")]
    Kube(kube::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The object was modified since it was read (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Kubernetes API returned an error status
    #[error("Kubernetes API error: {0}")]
    Api(String),

    /// Invalid request (e.g., object without a name)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClusterError {
    /// Whether this error means the requested object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClusterError::NotFound(_))
    }
}

impl From<kube::Error> for ClusterError {
    fn from(err: kube::Error) -> Self {
        match &err {
            kube::Error::Api(response) if response.code == 404 => ClusterError::NotFound(response.message.clone()),
            kube::Error::Api(response) if response.code == 409 => ClusterError::Conflict(response.message.clone()),
            kube::Error::Api(response) => ClusterError::Api(format!("{} ({})", response.message, response.code)),
            _ => ClusterError::Kube(err),
        }
    }
}
