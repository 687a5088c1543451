//! Controller-specific error types.
//!
//! This module defines the error types of the ConfigMap Manager Controller
//! that are not covered by upstream library errors. Each variant maps to one
//! failure scope of the reconciliation loop.

use cluster_client::ClusterError;
use thiserror::Error;

/// Errors that can occur in the ConfigMap Manager Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Cluster access error (startup only: the client could not be built)
    #[error("Kubernetes error: {0}")]
    Cluster(#[from] ClusterError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Logging could not be initialized
    #[error("Logging setup failed: {0}")]
    Logging(String),

    /// Listing a resource collection failed; aborts the current scope
    #[error("Failed to list {resource}: {source}")]
    ListFailed {
        /// What was being listed
        resource: String,
        /// Underlying cause
        source: ClusterError,
    },

    /// Fetching or writing a ConfigMap failed
    #[error("Failed to update ConfigMap {name} in namespace {namespace}: {source}")]
    ConfigMapUpdate {
        /// Namespace of the ConfigMap
        namespace: String,
        /// Name of the ConfigMap
        name: String,
        /// Underlying cause
        source: ClusterError,
    },

    /// Writing a Deployment during restart failed; later Deployments were not attempted
    #[error("Failed to restart deployment {deployment} in namespace {namespace}: {source}")]
    DeploymentRestart {
        /// Namespace of the Deployment
        namespace: String,
        /// Name of the Deployment whose update failed
        deployment: String,
        /// Underlying cause
        source: ClusterError,
    },
}

impl ControllerError {
    /// Whether the underlying cause is a missing object
    pub fn is_not_found(&self) -> bool {
        match self {
            ControllerError::Cluster(source)
            | ControllerError::ListFailed { source, .. }
            | ControllerError::ConfigMapUpdate { source, .. }
            | ControllerError::DeploymentRestart { source, .. } => source.is_not_found(),
            ControllerError::InvalidConfig(_) | ControllerError::Logging(_) => false,
        }
    }
}
