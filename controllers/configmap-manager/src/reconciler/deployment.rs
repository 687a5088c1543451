//! Deployment restart trigger
//!
//! A Deployment consuming a ConfigMap through `envFrom` only sees new values
//! when its pods are recreated. Changing an annotation on the pod template
//! makes the Deployment controller roll the pods.

use super::Reconciler;
use crate::error::ControllerError;
use chrono::{DateTime, SecondsFormat, Utc};
use k8s_openapi::api::apps::v1::Deployment;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Pod template annotation holding the time of the last triggered restart
pub const RESTART_ANNOTATION: &str = "configmap-update-timestamp";

/// Formats a restart timestamp as RFC 3339 (UTC, second precision)
pub fn restart_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Whether any container binds `configmap_name` through `envFrom`.
///
/// Stops at the first matching binding.
pub fn references_configmap(deployment: &Deployment, configmap_name: &str) -> bool {
    let Some(pod_spec) = deployment
        .spec
        .as_ref()
        .and_then(|spec| spec.template.spec.as_ref())
    else {
        return false;
    };

    pod_spec.containers.iter().any(|container| {
        container.env_from.iter().flatten().any(|source| {
            source
                .config_map_ref
                .as_ref()
                .is_some_and(|configmap_ref| configmap_ref.name == configmap_name)
        })
    })
}

/// Sets the restart annotation on the pod template, creating the metadata
/// and annotation map if needed. Container specs are not touched.
pub fn mark_for_restart(deployment: &mut Deployment, timestamp: &str) {
    let Some(spec) = deployment.spec.as_mut() else {
        return;
    };

    spec.template
        .metadata
        .get_or_insert_with(Default::default)
        .annotations
        .get_or_insert_with(BTreeMap::new)
        .insert(RESTART_ANNOTATION.to_string(), timestamp.to_string());
}

impl Reconciler {
    /// Restarts every Deployment in `namespace` that consumes `configmap_name`.
    ///
    /// Returns the names of the restarted Deployments. The first failed
    /// update stops the call: Deployments after it are not attempted and the
    /// error only names the one that failed.
    pub async fn restart_deployments_using_configmap(
        &self,
        namespace: &str,
        configmap_name: &str,
    ) -> Result<Vec<String>, ControllerError> {
        let deployments = self
            .cluster_client
            .list_deployments(namespace)
            .await
            .map_err(|source| ControllerError::ListFailed {
                resource: format!("deployments in namespace {}", namespace),
                source,
            })?;

        let mut restarted = Vec::new();
        for mut deployment in deployments {
            let name = deployment.metadata.name.clone().unwrap_or_default();
            if !references_configmap(&deployment, configmap_name) {
                debug!(
                    "Deployment {}/{} does not use ConfigMap {}",
                    namespace, name, configmap_name
                );
                continue;
            }

            mark_for_restart(&mut deployment, &restart_timestamp(Utc::now()));

            self.cluster_client
                .update_deployment(namespace, &deployment)
                .await
                .map_err(|source| ControllerError::DeploymentRestart {
                    namespace: namespace.to_string(),
                    deployment: name.clone(),
                    source,
                })?;

            info!(
                "Restarted deployment: {} in namespace {} using ConfigMap {}",
                name, namespace, configmap_name
            );
            restarted.push(name);
        }

        Ok(restarted)
    }
}
