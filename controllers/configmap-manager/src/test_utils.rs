//! Test utilities for unit testing the reconciler
//!
//! This module provides helpers for creating test data and setting up test scenarios.

use crds::ConfigMapManager;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    ConfigMap, ConfigMapEnvSource, Container, EnvFromSource, Namespace, PodSpec, PodTemplateSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{ApiResource, DynamicObject};
use std::collections::BTreeMap;

/// Helper to create a test Namespace, optionally carrying an `owner` annotation
pub fn create_test_namespace(name: &str, owner: Option<&str>) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            annotations: owner.map(|owner| BTreeMap::from([("owner".to_string(), owner.to_string())])),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Helper to create a test ConfigMap with the given data
pub fn create_test_configmap(namespace: &str, name: &str, data: &[(&str, &str)]) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: Some(
            data.iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        ),
        ..Default::default()
    }
}

/// Helper to create a test Deployment
///
/// `containers` holds, per container, the ConfigMap names bound through
/// `envFrom`. An empty slice creates a container without `envFrom`.
pub fn create_test_deployment(namespace: &str, name: &str, containers: &[&[&str]]) -> Deployment {
    let containers = containers
        .iter()
        .enumerate()
        .map(|(index, configmaps)| Container {
            name: format!("container-{}", index),
            image: Some("registry.local/app:1.0".to_string()),
            env_from: (!configmaps.is_empty()).then(|| {
                configmaps
                    .iter()
                    .map(|configmap| EnvFromSource {
                        config_map_ref: Some(ConfigMapEnvSource {
                            name: configmap.to_string(),
                            optional: None,
                        }),
                        ..Default::default()
                    })
                    .collect()
            }),
            ..Default::default()
        })
        .collect();

    Deployment {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(BTreeMap::from([("app".to_string(), name.to_string())])),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers,
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Helper to create a ConfigMapManager instance as the dynamic API returns it
pub fn create_test_configmap_manager(
    namespace: &str,
    name: &str,
    spec: serde_json::Value,
) -> DynamicObject {
    let resource = ApiResource::erase::<ConfigMapManager>(&());
    let mut object = DynamicObject::new(name, &resource).within(namespace);
    object.data = serde_json::json!({ "spec": spec });
    object
}

/// Annotations on the pod template of a Deployment
pub fn template_annotations(deployment: &Deployment) -> BTreeMap<String, String> {
    deployment
        .spec
        .as_ref()
        .and_then(|spec| spec.template.metadata.as_ref())
        .and_then(|metadata| metadata.annotations.clone())
        .unwrap_or_default()
}
