//! ConfigMap updater

use super::Reconciler;
use crate::error::ControllerError;
use cluster_client::ClusterError;
use crds::{ConfigMapSpec, ConfigMapUpdate};
use k8s_openapi::api::core::v1::ConfigMap;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Applies upserts in order; a later update of the same key wins.
///
/// Keys not named in `updates` are left untouched. A ConfigMap without
/// `data` gets an empty map first.
pub fn apply_updates(configmap: &mut ConfigMap, updates: &[ConfigMapUpdate]) {
    let data = configmap.data.get_or_insert_with(BTreeMap::new);
    for update in updates {
        data.insert(update.key.clone(), update.new_value.clone());
    }
}

impl Reconciler {
    /// Fetches the named ConfigMap, applies the spec's upserts and writes the
    /// whole object back.
    ///
    /// There is no resourceVersion check or retry: a concurrent writer
    /// between fetch and write is overwritten (or rejects this write).
    pub async fn update_configmap(
        &self,
        namespace: &str,
        spec: &ConfigMapSpec,
    ) -> Result<ConfigMap, ControllerError> {
        let update_error = |source: ClusterError| ControllerError::ConfigMapUpdate {
            namespace: namespace.to_string(),
            name: spec.name.clone(),
            source,
        };

        if spec.name.is_empty() {
            return Err(update_error(ClusterError::InvalidRequest(
                "ConfigMap name is empty".to_string(),
            )));
        }

        let mut configmap = self
            .cluster_client
            .get_configmap(namespace, &spec.name)
            .await
            .map_err(update_error)?;

        debug!(
            "Applying {} update(s) to ConfigMap {}/{}",
            spec.updates.len(),
            namespace,
            spec.name
        );
        apply_updates(&mut configmap, &spec.updates);

        let updated = self
            .cluster_client
            .update_configmap(namespace, &configmap)
            .await
            .map_err(update_error)?;

        info!(
            "ConfigMap {} updated in namespace {} with keys: {:?}",
            spec.name,
            namespace,
            spec.keys()
        );
        Ok(updated)
    }
}
