//! Kubernetes API client
//!
//! Implements `ClusterClientTrait` on top of a kube-rs `Client`. Typed
//! `Api`s serve namespaces, ConfigMaps and Deployments; custom resources go
//! through the dynamic `Api<DynamicObject>`.

use crate::cluster_trait::ClusterClientTrait;
use crate::error::ClusterError;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace};
use kube::api::{Api, ApiResource, DynamicObject, ListParams, PostParams};
use kube::Client;
use tracing::debug;

/// Cluster client backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl std::fmt::Debug for KubeClusterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClusterClient").finish_non_exhaustive()
    }
}

impl KubeClusterClient {
    /// Wrap an existing kube client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the environment
    ///
    /// kube infers the configuration: the local kubeconfig when present,
    /// otherwise the in-cluster service account.
    pub async fn try_default() -> Result<Self, ClusterError> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }

    /// Get the underlying kube client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn object_name<'a>(name: Option<&'a String>, kind: &str) -> Result<&'a str, ClusterError> {
    name.map(String::as_str)
        .ok_or_else(|| ClusterError::InvalidRequest(format!("{} has no metadata.name", kind)))
}

#[async_trait::async_trait]
impl ClusterClientTrait for KubeClusterClient {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        debug!("Listed {} namespaces", list.items.len());
        Ok(list.items)
    }

    async fn get_configmap(&self, namespace: &str, name: &str) -> Result<ConfigMap, ClusterError> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        api.get_opt(name)
            .await?
            .ok_or_else(|| ClusterError::NotFound(format!("ConfigMap {}/{}", namespace, name)))
    }

    async fn update_configmap(&self, namespace: &str, configmap: &ConfigMap) -> Result<ConfigMap, ClusterError> {
        let name = object_name(configmap.metadata.name.as_ref(), "ConfigMap")?;
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        let updated = api.replace(name, &PostParams::default(), configmap).await?;
        Ok(updated)
    }

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, ClusterError> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&ListParams::default()).await?;
        debug!("Listed {} deployments in namespace {}", list.items.len(), namespace);
        Ok(list.items)
    }

    async fn update_deployment(&self, namespace: &str, deployment: &Deployment) -> Result<Deployment, ClusterError> {
        let name = object_name(deployment.metadata.name.as_ref(), "Deployment")?;
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let updated = api.replace(name, &PostParams::default(), deployment).await?;
        Ok(updated)
    }

    async fn list_custom_resources(&self, resource: &ApiResource) -> Result<Vec<DynamicObject>, ClusterError> {
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), resource);
        let list = api.list(&ListParams::default()).await?;
        debug!(
            "Listed {} {}/{} {}",
            list.items.len(),
            resource.group,
            resource.version,
            resource.plural
        );
        Ok(list.items)
    }
}
