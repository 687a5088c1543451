//! Mock ClusterClient for unit testing
//!
//! This module provides an in-memory implementation of `ClusterClientTrait`
//! that can be used in unit tests without a running API server. Individual
//! operations can be made to fail to exercise error paths.

use crate::cluster_trait::ClusterClientTrait;
use crate::error::ClusterError;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace};
use kube::api::{ApiResource, DynamicObject};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type ObjectKey = (String, String);

/// Mock ClusterClient for testing
///
/// Objects are kept per `(namespace, name)` and listed in name order, the
/// way the API server returns them. Clones share the same store, so a test
/// can hand one clone to the reconciler and inspect state through another.
#[derive(Clone, Default)]
pub struct MockClusterClient {
    // In-memory storage for resources
    namespaces: Arc<Mutex<BTreeMap<String, Namespace>>>,
    configmaps: Arc<Mutex<BTreeMap<ObjectKey, ConfigMap>>>,
    deployments: Arc<Mutex<BTreeMap<ObjectKey, Deployment>>>,
    custom_resources: Arc<Mutex<Vec<DynamicObject>>>,
    // Failure injection
    fail_list_namespaces: Arc<Mutex<bool>>,
    fail_list_custom_resources: Arc<Mutex<bool>>,
    failing_configmap_updates: Arc<Mutex<HashSet<ObjectKey>>>,
    failing_deployment_updates: Arc<Mutex<HashSet<ObjectKey>>>,
    // Call recording
    deployment_list_calls: Arc<Mutex<Vec<String>>>,
    deployment_updates: Arc<Mutex<Vec<ObjectKey>>>,
}

impl std::fmt::Debug for MockClusterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockClusterClient").finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn key(namespace: &str, name: &str) -> ObjectKey {
    (namespace.to_string(), name.to_string())
}

impl MockClusterClient {
    /// Create an empty mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace to the mock store (for test setup)
    pub fn add_namespace(&self, namespace: Namespace) {
        let name = namespace.metadata.name.clone().unwrap_or_default();
        lock(&self.namespaces).insert(name, namespace);
    }

    /// Add a ConfigMap to the mock store (for test setup)
    pub fn add_configmap(&self, configmap: ConfigMap) {
        let namespace = configmap.metadata.namespace.clone().unwrap_or_default();
        let name = configmap.metadata.name.clone().unwrap_or_default();
        lock(&self.configmaps).insert((namespace, name), configmap);
    }

    /// Add a Deployment to the mock store (for test setup)
    pub fn add_deployment(&self, deployment: Deployment) {
        let namespace = deployment.metadata.namespace.clone().unwrap_or_default();
        let name = deployment.metadata.name.clone().unwrap_or_default();
        lock(&self.deployments).insert((namespace, name), deployment);
    }

    /// Add a custom resource instance (for test setup)
    pub fn add_custom_resource(&self, object: DynamicObject) {
        lock(&self.custom_resources).push(object);
    }

    /// Read back a ConfigMap as currently stored
    pub fn configmap(&self, namespace: &str, name: &str) -> Option<ConfigMap> {
        lock(&self.configmaps).get(&key(namespace, name)).cloned()
    }

    /// Read back a Deployment as currently stored
    pub fn deployment(&self, namespace: &str, name: &str) -> Option<Deployment> {
        lock(&self.deployments).get(&key(namespace, name)).cloned()
    }

    /// Make `list_namespaces` fail
    pub fn fail_list_namespaces(&self, fail: bool) {
        *lock(&self.fail_list_namespaces) = fail;
    }

    /// Make `list_custom_resources` fail
    pub fn fail_list_custom_resources(&self, fail: bool) {
        *lock(&self.fail_list_custom_resources) = fail;
    }

    /// Make `update_configmap` fail with a conflict for one ConfigMap
    pub fn fail_configmap_update(&self, namespace: &str, name: &str) {
        lock(&self.failing_configmap_updates).insert(key(namespace, name));
    }

    /// Make `update_deployment` fail with a conflict for one Deployment
    pub fn fail_deployment_update(&self, namespace: &str, name: &str) {
        lock(&self.failing_deployment_updates).insert(key(namespace, name));
    }

    /// Namespaces passed to `list_deployments`, in call order
    pub fn deployment_list_calls(&self) -> Vec<String> {
        lock(&self.deployment_list_calls).clone()
    }

    /// Deployments successfully written, in call order
    pub fn deployment_updates(&self) -> Vec<(String, String)> {
        lock(&self.deployment_updates).clone()
    }
}

#[async_trait::async_trait]
impl ClusterClientTrait for MockClusterClient {
    async fn list_namespaces(&self) -> Result<Vec<Namespace>, ClusterError> {
        if *lock(&self.fail_list_namespaces) {
            return Err(ClusterError::Api("namespaces is forbidden".to_string()));
        }
        Ok(lock(&self.namespaces).values().cloned().collect())
    }

    async fn get_configmap(&self, namespace: &str, name: &str) -> Result<ConfigMap, ClusterError> {
        self.configmap(namespace, name)
            .ok_or_else(|| ClusterError::NotFound(format!("ConfigMap {}/{}", namespace, name)))
    }

    async fn update_configmap(&self, namespace: &str, configmap: &ConfigMap) -> Result<ConfigMap, ClusterError> {
        let name = configmap
            .metadata
            .name
            .clone()
            .ok_or_else(|| ClusterError::InvalidRequest("ConfigMap has no metadata.name".to_string()))?;
        let object_key = key(namespace, &name);

        if lock(&self.failing_configmap_updates).contains(&object_key) {
            return Err(ClusterError::Conflict(format!(
                "ConfigMap {}/{} has been modified",
                namespace, name
            )));
        }

        let mut configmaps = lock(&self.configmaps);
        if !configmaps.contains_key(&object_key) {
            return Err(ClusterError::NotFound(format!("ConfigMap {}/{}", namespace, name)));
        }
        configmaps.insert(object_key, configmap.clone());
        Ok(configmap.clone())
    }

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, ClusterError> {
        lock(&self.deployment_list_calls).push(namespace.to_string());
        Ok(lock(&self.deployments)
            .iter()
            .filter(|((ns, _), _)| ns.as_str() == namespace)
            .map(|(_, deployment)| deployment.clone())
            .collect())
    }

    async fn update_deployment(&self, namespace: &str, deployment: &Deployment) -> Result<Deployment, ClusterError> {
        let name = deployment
            .metadata
            .name
            .clone()
            .ok_or_else(|| ClusterError::InvalidRequest("Deployment has no metadata.name".to_string()))?;
        let object_key = key(namespace, &name);

        if lock(&self.failing_deployment_updates).contains(&object_key) {
            return Err(ClusterError::Conflict(format!(
                "Deployment {}/{} has been modified",
                namespace, name
            )));
        }

        let mut deployments = lock(&self.deployments);
        if !deployments.contains_key(&object_key) {
            return Err(ClusterError::NotFound(format!("Deployment {}/{}", namespace, name)));
        }
        deployments.insert(object_key.clone(), deployment.clone());
        lock(&self.deployment_updates).push(object_key);
        Ok(deployment.clone())
    }

    async fn list_custom_resources(&self, resource: &ApiResource) -> Result<Vec<DynamicObject>, ClusterError> {
        if *lock(&self.fail_list_custom_resources) {
            return Err(ClusterError::Api(format!(
                "the server could not find the requested resource ({})",
                resource.plural
            )));
        }
        Ok(lock(&self.custom_resources).clone())
    }
}
