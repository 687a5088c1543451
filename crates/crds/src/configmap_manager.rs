//! ConfigMapManager CRD
//!
//! Declares key/value upserts for ConfigMaps. The same spec is applied in
//! every namespace whose `owner` annotation selects it.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// API group of the ConfigMapManager resource
pub const CONFIGMAP_MANAGER_GROUP: &str = "blacksyrius.ci.com";

/// API version of the ConfigMapManager resource
pub const CONFIGMAP_MANAGER_VERSION: &str = "v1";

/// Plural resource name used in API paths
pub const CONFIGMAP_MANAGER_PLURAL: &str = "configmapmanagers";

/// Decodes an explicit `null` (a bare `updates:` in YAML) as the default value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(CustomResource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "blacksyrius.ci.com",
    version = "v1",
    kind = "ConfigMapManager",
    plural = "configmapmanagers",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapManagerSpec {
    /// ConfigMaps to update, processed in order
    #[serde(default, deserialize_with = "null_as_default")]
    #[schemars(extend("nullable" = true))]
    pub config_maps: Vec<ConfigMapSpec>,
}

/// Target ConfigMap and the upserts to apply to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapSpec {
    /// Name of the ConfigMap within the namespace
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Upserts applied in order; a later entry for the same key wins
    #[serde(default, deserialize_with = "null_as_default")]
    #[schemars(extend("nullable" = true))]
    pub updates: Vec<ConfigMapUpdate>,
}

/// A single key/value upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigMapUpdate {
    /// Data key to insert or overwrite
    #[serde(default, deserialize_with = "null_as_default")]
    pub key: String,

    /// Value written under `key`
    #[serde(default, deserialize_with = "null_as_default")]
    pub new_value: String,
}

impl ConfigMapUpdate {
    /// Create an upsert for `key`
    pub fn new(key: impl Into<String>, new_value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            new_value: new_value.into(),
        }
    }
}

impl ConfigMapSpec {
    /// Keys touched by this spec, in first-seen order
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::with_capacity(self.updates.len());
        for update in &self.updates {
            if !keys.contains(&update.key.as_str()) {
                keys.push(&update.key);
            }
        }
        keys
    }
}
