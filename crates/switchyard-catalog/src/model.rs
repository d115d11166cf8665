//! Model definition types
//!
//! A definition is one JSON document on disk. Scheduling and storage fields are
//! kept as opaque JSON so they pass through to the manifest exactly as written.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One model entry in the catalog.
///
/// Definitions are immutable once loaded; a reload replaces them wholesale.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDefinition {
    /// Unique catalog key. Definitions without one are skipped on load.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id: String,

    /// Human-readable name, defaults to `id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Serving runtime name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,

    /// Hugging Face repository id (e.g., "org/model")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hf_model_id: Option<String>,

    /// Explicit storage URI; wins over `hf_model_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_uri: Option<String>,

    /// Container environment, passed through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Value>,

    /// Storage spec, passed through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<Value>,

    /// Resource requests/limits, passed through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Value>,

    /// Predictor node selector, passed through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<Value>,

    /// Predictor tolerations, passed through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerations: Option<Value>,

    /// Model container volume mounts, passed through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_mounts: Option<Value>,

    /// Predictor volumes, passed through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Value>,

    /// Runtime engine arguments, in file order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vllm: Option<Map<String, Value>>,
}

impl ModelDefinition {
    /// Create a bare definition with only an id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Display name, falling back to the id
    pub fn display_name(&self) -> &str {
        non_empty(&self.display_name).unwrap_or(self.id.as_str())
    }

    /// Runtime name if set and non-empty
    pub fn runtime(&self) -> Option<&str> {
        non_empty(&self.runtime)
    }

    /// Hugging Face model id if set and non-empty
    pub fn hf_model_id(&self) -> Option<&str> {
        non_empty(&self.hf_model_id)
    }

    /// Explicit storage URI if set and non-empty
    pub fn storage_uri(&self) -> Option<&str> {
        non_empty(&self.storage_uri)
    }

    /// Summary view used for listing
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            id: self.id.clone(),
            display_name: self.display_name().to_string(),
            hf_model_id: self.hf_model_id().map(str::to_string),
            runtime: self.runtime().map(str::to_string),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Listing entry for a catalog model
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    /// Catalog key
    pub id: String,
    /// Display name (id when unset)
    pub display_name: String,
    /// Hugging Face model id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hf_model_id: Option<String>,
    /// Runtime name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_definition() {
        let def: ModelDefinition = serde_json::from_str(
            r#"{
                "id": "qwen2-7b",
                "displayName": "Qwen2 7B",
                "hfModelId": "Qwen/Qwen2-7B-Instruct",
                "runtime": "qwen-vllm-runtime",
                "env": [{"name": "HF_HUB_OFFLINE", "value": "0"}],
                "nodeSelector": {"gpu": "true"},
                "vllm": {"dtype": "bfloat16", "tensorParallelSize": 2}
            }"#,
        )
        .unwrap();

        assert_eq!(def.id, "qwen2-7b");
        assert_eq!(def.display_name(), "Qwen2 7B");
        assert_eq!(def.runtime(), Some("qwen-vllm-runtime"));
        assert_eq!(def.hf_model_id(), Some("Qwen/Qwen2-7B-Instruct"));
        assert!(def.env.is_some());
        assert!(def.storage.is_none());

        let keys: Vec<&String> = def.vllm.as_ref().unwrap().keys().collect();
        assert_eq!(keys, vec!["dtype", "tensorParallelSize"]);
    }

    #[test]
    fn test_missing_id_parses_as_empty() {
        let def: ModelDefinition = serde_json::from_str(r#"{"hfModelId": "org/m"}"#).unwrap();
        assert!(def.id.is_empty());
    }

    #[test]
    fn test_null_id_parses_as_empty() {
        let def: ModelDefinition =
            serde_json::from_str(r#"{"id": null, "hfModelId": "org/m"}"#).unwrap();
        assert!(def.id.is_empty());
        assert_eq!(def.hf_model_id(), Some("org/m"));
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let def: ModelDefinition =
            serde_json::from_str(r#"{"id": "m", "displayName": "", "runtime": ""}"#).unwrap();
        assert_eq!(def.display_name(), "m");
        assert_eq!(def.runtime(), None);
    }

    #[test]
    fn test_summary_defaults_display_name_to_id() {
        let mut def = ModelDefinition::new("m1");
        def.hf_model_id = Some("org/m1".to_string());

        let summary = def.summary();
        assert_eq!(summary.display_name, "m1");
        assert_eq!(summary.hf_model_id.as_deref(), Some("org/m1"));
        assert_eq!(summary.runtime, None);

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("runtime").is_none());
        assert_eq!(json["displayName"], "m1");
    }
}
