//! Reconciliation logic for ConfigMapManager resources.
//!
//! One tick lists every ConfigMapManager and every namespace, then for each
//! eligible namespace applies each instance's ConfigMap updates and restarts
//! the Deployments consuming the updated ConfigMaps. Failures are contained
//! to the smallest unit that failed:
//! - listing ConfigMapManagers or namespaces aborts the tick
//! - an undecodable instance is skipped for that namespace
//! - a failed ConfigMap update skips that ConfigMap (and its restart)
//! - a failed restart is logged; the ConfigMap update already happened
//!
//! This module is organized by step:
//! - `configmap`: ConfigMap updater
//! - `deployment`: Deployment restart trigger

pub mod configmap;
pub mod deployment;

use crate::decoder::{decode_spec, resource_name};
use crate::error::ControllerError;
use cluster_client::ClusterClientTrait;
use crds::{ConfigMapManager, ConfigMapSpec};
use k8s_openapi::api::core::v1::Namespace;
use kube::api::ApiResource;
use tracing::{debug, error, info, warn};

/// Namespace annotation selecting namespaces for reconciliation
pub const OWNER_ANNOTATION: &str = "owner";

/// Required value of the owner annotation, compared ignoring case
pub const OWNER_VALUE: &str = "blacksyrius";

/// Whether a namespace is managed by this controller.
///
/// A namespace without the annotation, or with another owner, is skipped.
pub fn is_eligible_namespace(namespace: &Namespace) -> bool {
    namespace
        .metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(OWNER_ANNOTATION))
        .is_some_and(|owner| fold_case(owner) == OWNER_VALUE)
}

// Unicode case folding: upper then lower maps variants such as the Kelvin
// sign and the long s onto their ASCII letters.
fn fold_case(value: &str) -> String {
    value.to_uppercase().to_lowercase()
}

/// Counters describing what a single tick did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// Eligible namespaces processed
    pub namespaces_processed: usize,
    /// Namespaces skipped because of the owner annotation
    pub namespaces_skipped: usize,
    /// ConfigMapManager instances skipped (counted per namespace)
    pub custom_resources_skipped: usize,
    /// ConfigMaps updated
    pub configmaps_updated: usize,
    /// ConfigMaps whose fetch or update failed
    pub configmaps_failed: usize,
    /// Deployments restarted
    pub deployments_restarted: usize,
    /// Restart calls that failed
    pub restarts_failed: usize,
}

impl std::fmt::Display for TickSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} namespace(s) processed, {} skipped, {} ConfigMap(s) updated, {} failed, {} deployment(s) restarted, {} restart failure(s), {} custom resource(s) skipped",
            self.namespaces_processed,
            self.namespaces_skipped,
            self.configmaps_updated,
            self.configmaps_failed,
            self.deployments_restarted,
            self.restarts_failed,
            self.custom_resources_skipped
        )
    }
}

/// Reconciles ConfigMapManager resources against the cluster.
pub struct Reconciler {
    pub(crate) cluster_client: Box<dyn ClusterClientTrait + Send + Sync>,
    custom_resource: ApiResource,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("custom_resource", &self.custom_resource)
            .finish_non_exhaustive()
    }
}

impl Reconciler {
    /// Creates a new reconciler instance.
    pub fn new(cluster_client: impl ClusterClientTrait + Send + Sync + 'static) -> Self {
        Self {
            cluster_client: Box::new(cluster_client),
            custom_resource: ApiResource::erase::<ConfigMapManager>(&()),
        }
    }

    /// Runs one full reconciliation pass.
    ///
    /// Returns an error only when the tick had to be abandoned because the
    /// ConfigMapManagers or the namespaces could not be listed. Every other
    /// failure is logged, counted in the summary, and processing continues.
    pub async fn reconcile_tick(&self) -> Result<TickSummary, ControllerError> {
        let custom_resources = self
            .cluster_client
            .list_custom_resources(&self.custom_resource)
            .await
            .map_err(|source| ControllerError::ListFailed {
                resource: format!(
                    "custom resources {}/{} {}",
                    self.custom_resource.group, self.custom_resource.version, self.custom_resource.plural
                ),
                source,
            })?;

        let namespaces = self
            .cluster_client
            .list_namespaces()
            .await
            .map_err(|source| ControllerError::ListFailed {
                resource: "namespaces".to_string(),
                source,
            })?;

        debug!(
            "Found {} ConfigMapManager(s) and {} namespace(s)",
            custom_resources.len(),
            namespaces.len()
        );

        let mut summary = TickSummary::default();

        for namespace in &namespaces {
            if !is_eligible_namespace(namespace) {
                summary.namespaces_skipped += 1;
                continue;
            }
            let Some(namespace_name) = namespace.metadata.name.as_deref() else {
                summary.namespaces_skipped += 1;
                continue;
            };

            info!("Processing namespace: {}", namespace_name);
            summary.namespaces_processed += 1;

            for custom_resource in &custom_resources {
                let spec = match decode_spec(custom_resource) {
                    Ok(spec) => spec,
                    Err(e) => {
                        warn!("Skipping custom resource in namespace {}: {}", namespace_name, e);
                        summary.custom_resources_skipped += 1;
                        continue;
                    }
                };

                debug!(
                    "Applying ConfigMapManager {} ({} ConfigMap(s)) to namespace {}",
                    resource_name(custom_resource),
                    spec.config_maps.len(),
                    namespace_name
                );

                for configmap_spec in &spec.config_maps {
                    self.reconcile_configmap(namespace_name, configmap_spec, &mut summary)
                        .await;
                }
            }
        }

        Ok(summary)
    }

    /// Updates one ConfigMap and, if that succeeded, restarts its consumers.
    async fn reconcile_configmap(
        &self,
        namespace: &str,
        spec: &ConfigMapSpec,
        summary: &mut TickSummary,
    ) {
        if let Err(e) = self.update_configmap(namespace, spec).await {
            if e.is_not_found() {
                warn!("ConfigMap {} does not exist in namespace {}, skipping: {}", spec.name, namespace, e);
            } else {
                error!("{}", e);
            }
            summary.configmaps_failed += 1;
            return;
        }
        summary.configmaps_updated += 1;

        match self
            .restart_deployments_using_configmap(namespace, &spec.name)
            .await
        {
            Ok(restarted) => summary.deployments_restarted += restarted.len(),
            Err(e) => {
                error!(
                    "Failed to restart deployments for {} in namespace {}: {}",
                    spec.name, namespace, e
                );
                summary.restarts_failed += 1;
            }
        }
    }
}
