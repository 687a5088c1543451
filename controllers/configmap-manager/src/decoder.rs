//! ConfigMapManager decoding.
//!
//! Custom resources are listed through the dynamic API, so their `spec`
//! arrives as an untyped JSON document. Decoding happens in two stages:
//! the `spec` field is looked up and checked to be an object, then it is
//! re-encoded to JSON and parsed against `ConfigMapManagerSpec`. Failures are
//! returned as `DecodeError` so the caller can skip the single instance.

use crds::ConfigMapManagerSpec;
use kube::api::DynamicObject;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors produced while decoding a ConfigMapManager instance.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The instance has no `spec` field
    #[error("custom resource {0} has no spec")]
    MissingSpec(String),

    /// The `spec` field is not an object
    #[error("custom resource {name} has an invalid spec: expected an object, found {found}")]
    InvalidSpec {
        /// Resource the spec belongs to
        name: String,
        /// JSON type that was found instead
        found: &'static str,
    },

    /// The spec does not match the ConfigMapManager schema
    #[error("failed to decode spec of custom resource {name}: {source}")]
    Serialization {
        /// Resource the spec belongs to
        name: String,
        /// Underlying serde error
        source: serde_json::Error,
    },
}

/// Display name of a dynamic object as `namespace/name`
pub fn resource_name(object: &DynamicObject) -> String {
    let name = object.metadata.name.as_deref().unwrap_or("<unknown>");
    match object.metadata.namespace.as_deref() {
        Some(namespace) => format!("{}/{}", namespace, name),
        None => name.to_string(),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Returns the `spec` sub-document if it is an object.
pub fn spec_document(object: &DynamicObject) -> Result<&Map<String, Value>, DecodeError> {
    let spec = object
        .data
        .get("spec")
        .ok_or_else(|| DecodeError::MissingSpec(resource_name(object)))?;

    spec.as_object().ok_or_else(|| DecodeError::InvalidSpec {
        name: resource_name(object),
        found: json_type(spec),
    })
}

/// Decodes the `spec` of a ConfigMapManager instance.
///
/// Unknown fields are ignored. Absent or `null` fields decode to their
/// empty value, so a malformed entry fails later at its own ConfigMap instead
/// of failing the whole instance here.
pub fn decode_spec(object: &DynamicObject) -> Result<ConfigMapManagerSpec, DecodeError> {
    let document = spec_document(object)?;

    let encoded = serde_json::to_vec(document).map_err(|source| DecodeError::Serialization {
        name: resource_name(object),
        source,
    })?;

    serde_json::from_slice(&encoded).map_err(|source| DecodeError::Serialization {
        name: resource_name(object),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_configmap_manager;
    use crds::ConfigMapUpdate;
    use serde_json::json;

    #[test]
    fn test_decode_valid_spec() {
        let object = create_test_configmap_manager(
            "ns-a",
            "manager",
            json!({
                "configMaps": [
                    { "name": "app-config", "updates": [ { "key": "LOG_LEVEL", "newValue": "debug" } ] },
                    { "name": "feature-flags", "updates": [] }
                ]
            }),
        );

        let spec = decode_spec(&object).expect("spec should decode");
        assert_eq!(spec.config_maps.len(), 2);
        assert_eq!(spec.config_maps[0].name, "app-config");
        assert_eq!(
            spec.config_maps[0].updates,
            vec![ConfigMapUpdate::new("LOG_LEVEL", "debug")]
        );
        assert_eq!(spec.config_maps[1].name, "feature-flags");
    }

    #[test]
    fn test_decode_missing_updates_is_empty() {
        let object = create_test_configmap_manager(
            "ns-a",
            "manager",
            json!({ "configMaps": [ { "name": "app-config" } ] }),
        );

        let spec = decode_spec(&object).expect("spec should decode");
        assert!(spec.config_maps[0].updates.is_empty());
    }

    #[test]
    fn test_decode_null_sequences_are_empty() {
        let object = create_test_configmap_manager(
            "ns-a",
            "manager",
            json!({ "configMaps": [ { "name": "app-config", "updates": null } ] }),
        );
        let spec = decode_spec(&object).expect("null updates should decode");
        assert_eq!(spec.config_maps[0].name, "app-config");
        assert!(spec.config_maps[0].updates.is_empty());

        let object = create_test_configmap_manager("ns-a", "manager", json!({ "configMaps": null }));
        let spec = decode_spec(&object).expect("null configMaps should decode");
        assert!(spec.config_maps.is_empty());
    }

    #[test]
    fn test_decode_missing_key_keeps_siblings() {
        let object = create_test_configmap_manager(
            "ns-a",
            "manager",
            json!({
                "configMaps": [
                    { "name": "first", "updates": [ { "newValue": "1" } ] },
                    { "name": "second", "updates": [ { "key": "B", "newValue": "2" } ] }
                ]
            }),
        );

        let spec = decode_spec(&object).expect("missing key should decode");
        assert_eq!(spec.config_maps.len(), 2);
        assert_eq!(spec.config_maps[0].updates, vec![ConfigMapUpdate::new("", "1")]);
        assert_eq!(spec.config_maps[1].updates, vec![ConfigMapUpdate::new("B", "2")]);
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let object = create_test_configmap_manager(
            "ns-a",
            "manager",
            json!({
                "description": "not part of the schema",
                "configMaps": [
                    { "name": "app-config", "owner": "team-a", "updates": [ { "key": "A", "newValue": "1", "note": "x" } ] }
                ]
            }),
        );

        let spec = decode_spec(&object).expect("unknown fields should be ignored");
        assert_eq!(spec.config_maps[0].updates, vec![ConfigMapUpdate::new("A", "1")]);
    }

    #[test]
    fn test_decode_rejects_wrong_types() {
        let object = create_test_configmap_manager(
            "ns-a",
            "manager",
            json!({ "configMaps": [ { "name": "app-config", "updates": [ { "key": "A", "newValue": 1 } ] } ] }),
        );

        let err = decode_spec(&object).unwrap_err();
        assert!(matches!(err, DecodeError::Serialization { .. }), "unexpected error: {}", err);
        assert!(err.to_string().contains("ns-a/manager"));
    }

    #[test]
    fn test_spec_not_an_object() {
        let object = create_test_configmap_manager("ns-a", "manager", json!(["app-config"]));

        let err = decode_spec(&object).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidSpec { found: "array", .. }));
    }

    #[test]
    fn test_missing_spec() {
        let mut object = create_test_configmap_manager("ns-a", "manager", json!({}));
        object.data = json!({ "status": {} });

        let err = decode_spec(&object).unwrap_err();
        assert!(matches!(err, DecodeError::MissingSpec(ref name) if name == "ns-a/manager"));
    }
}
