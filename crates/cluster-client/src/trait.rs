//! ClusterClient trait for mocking
//!
//! This trait abstracts cluster access so the reconciliation loop can be
//! unit tested without a running API server. `KubeClusterClient` implements
//! it against a real cluster; `MockClusterClient` keeps objects in memory.

use crate::error::ClusterError;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace};
use kube::api::{ApiResource, DynamicObject};

/// Trait for the Kubernetes operations the controller needs
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ClusterClientTrait: Send + Sync {
    // Core operations
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError>;

    /// Fetch a ConfigMap; `ClusterError::NotFound` when it does not exist
    async fn get_configmap(&self, namespace: &str, name: &str) -> Result<ConfigMap, ClusterError>;

    /// Replace the whole ConfigMap object (no merge, no conflict retry)
    async fn update_configmap(&self, namespace: &str, configmap: &ConfigMap) -> Result<ConfigMap, ClusterError>;

    // Apps operations
    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, ClusterError>;

    /// Replace the whole Deployment object (no merge, no conflict retry)
    async fn update_deployment(&self, namespace: &str, deployment: &Deployment) -> Result<Deployment, ClusterError>;

    // Custom resources
    /// List instances of a custom resource across all namespaces
    async fn list_custom_resources(&self, resource: &ApiResource) -> Result<Vec<DynamicObject>, ClusterError>;
}
