//! InferenceService manifest rendering
//!
//! Translates a catalog [`ModelDefinition`] into the full InferenceService
//! document submitted to the cluster. Rendering is pure and deterministic: the
//! same definition and target always produce byte-identical JSON, because
//! object keys keep insertion order.

use serde_json::{json, Map, Value};
use switchyard_catalog::ModelDefinition;
use switchyard_common::{
    INFERENCE_SERVICE_KIND, MODEL_ID_ANNOTATION, SECRET_NAME_ANNOTATION, SERVING_GROUP,
    SERVING_VERSION, STORAGE_READONLY_ANNOTATION,
};

use crate::ServingTarget;

/// Runtime used when a definition does not name one
pub const DEFAULT_RUNTIME: &str = "vllm-runtime";

/// Secret holding Hugging Face credentials
pub const DEFAULT_SECRET_NAME: &str = "hf-token";

/// Env var the runtime reads the model location from
pub const MODEL_ID_ENV: &str = "MODEL_ID";

const PVC_SCHEME: &str = "pvc://";
const HF_SCHEME: &str = "hf://";

/// Engine argument table: catalog field name to command-line flag
const VLLM_FLAGS: &[(&str, &str)] = &[
    ("tensorParallelSize", "--tensor-parallel-size"),
    ("dtype", "--dtype"),
    ("gpuMemoryUtilization", "--gpu-memory-utilization"),
    ("maxModelLen", "--max-model-len"),
    ("trustRemoteCode", "--trust-remote-code"),
];

/// Settings that shape every rendered manifest
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestOptions {
    /// Runtime for definitions without one
    pub default_runtime: String,
    /// Value of the secret-name annotation
    pub secret_name: String,
    /// Mount point of PVC-backed models inside the serving container.
    ///
    /// When set, `pvc://` definitions get a `MODEL_ID` env var pointing at the
    /// local copy.
    pub inference_model_root: Option<String>,
}

impl Default for ManifestOptions {
    fn default() -> Self {
        Self {
            default_runtime: DEFAULT_RUNTIME.to_string(),
            secret_name: DEFAULT_SECRET_NAME.to_string(),
            inference_model_root: None,
        }
    }
}

/// Full apiVersion of the managed kind
pub fn api_version() -> String {
    format!("{}/{}", SERVING_GROUP, SERVING_VERSION)
}

/// Render the InferenceService for `definition` at `target`
pub fn build_inference_service(
    definition: &ModelDefinition,
    target: &ServingTarget,
    options: &ManifestOptions,
) -> Value {
    let storage_uri = resolve_storage_uri(definition);

    let mut annotations = Map::new();
    annotations.insert(
        SECRET_NAME_ANNOTATION.to_string(),
        Value::String(options.secret_name.clone()),
    );
    annotations.insert(
        MODEL_ID_ANNOTATION.to_string(),
        Value::String(definition.id.clone()),
    );
    if storage_uri
        .as_deref()
        .is_some_and(|uri| uri.starts_with(PVC_SCHEME))
    {
        annotations.insert(
            STORAGE_READONLY_ANNOTATION.to_string(),
            Value::String("false".to_string()),
        );
    }

    let mut model = Map::new();
    model.insert("modelFormat".to_string(), json!({ "name": "custom" }));
    model.insert(
        "runtime".to_string(),
        Value::String(
            definition
                .runtime()
                .unwrap_or(options.default_runtime.as_str())
                .to_string(),
        ),
    );
    if let Some(uri) = storage_uri {
        model.insert("storageUri".to_string(), Value::String(uri));
    }
    if let Some(env) = prepare_env(definition, options) {
        model.insert("env".to_string(), env);
    }
    insert_opt(&mut model, "storage", &definition.storage);

    let args = definition
        .vllm
        .as_ref()
        .map(build_vllm_args)
        .unwrap_or_default();
    if !args.is_empty() {
        model.insert(
            "args".to_string(),
            Value::Array(args.into_iter().map(Value::String).collect()),
        );
    }
    insert_opt(&mut model, "resources", &definition.resources);
    insert_opt(&mut model, "volumeMounts", &definition.volume_mounts);

    let mut predictor = Map::new();
    predictor.insert("minReplicas".to_string(), json!(1));
    insert_opt(&mut predictor, "nodeSelector", &definition.node_selector);
    insert_opt(&mut predictor, "tolerations", &definition.tolerations);
    insert_opt(&mut predictor, "volumes", &definition.volumes);
    insert_opt(&mut predictor, "resources", &definition.resources);
    predictor.insert("model".to_string(), Value::Object(model));

    json!({
        "apiVersion": api_version(),
        "kind": INFERENCE_SERVICE_KIND,
        "metadata": {
            "name": target.name,
            "namespace": target.namespace,
            "annotations": annotations,
        },
        "spec": {
            "predictor": predictor,
        },
    })
}

/// Translate the engine config into flag tokens, in input order.
///
/// Unknown fields, `null`, `false` and `""` produce nothing; `true` produces the bare
/// flag; anything else produces the flag followed by its value.
pub fn build_vllm_args(vllm: &Map<String, Value>) -> Vec<String> {
    let mut args = Vec::new();
    for (field, value) in vllm {
        let Some(flag) = vllm_flag(field) else {
            continue;
        };
        match value {
            Value::Null | Value::Bool(false) => {}
            Value::String(s) if s.is_empty() => {}
            Value::Bool(true) => args.push(flag.to_string()),
            Value::String(s) => {
                args.push(flag.to_string());
                args.push(s.clone());
            }
            other => {
                args.push(flag.to_string());
                args.push(other.to_string());
            }
        }
    }
    args
}

fn vllm_flag(field: &str) -> Option<&'static str> {
    VLLM_FLAGS
        .iter()
        .find(|(name, _)| *name == field)
        .map(|(_, flag)| *flag)
}

/// Explicit URI wins, then `hf://<hfModelId>`, else none
fn resolve_storage_uri(definition: &ModelDefinition) -> Option<String> {
    definition
        .storage_uri()
        .map(str::to_string)
        .or_else(|| {
            definition
                .hf_model_id()
                .map(|id| format!("{}{}", HF_SCHEME, id))
        })
}

/// Local path of a `pvc://claim/sub/path` model under the configured root
fn local_model_path(storage_uri: &str, root: &str) -> Option<String> {
    let rest = storage_uri.strip_prefix(PVC_SCHEME)?;
    let sub_path = rest
        .split_once('/')
        .map(|(_, sub)| sub.trim_matches('/'))
        .unwrap_or_default();

    if sub_path.is_empty() {
        Some(root.to_string())
    } else {
        Some(format!("{}/{}", root.trim_end_matches('/'), sub_path))
    }
}

fn prepare_env(definition: &ModelDefinition, options: &ManifestOptions) -> Option<Value> {
    let local_path = options
        .inference_model_root
        .as_deref()
        .filter(|root| !root.is_empty())
        .zip(definition.storage_uri())
        .and_then(|(root, uri)| local_model_path(uri, root));

    let Some(local_path) = local_path else {
        return definition.env.clone();
    };

    let mut entries = match &definition.env {
        None => Vec::new(),
        Some(Value::Array(entries)) => entries.clone(),
        Some(other) => return Some(other.clone()),
    };

    let existing = entries
        .iter_mut()
        .filter_map(Value::as_object_mut)
        .find(|entry| entry.get("name").and_then(Value::as_str) == Some(MODEL_ID_ENV));

    match existing {
        Some(entry) => {
            let absolute = entry
                .get("value")
                .and_then(Value::as_str)
                .is_some_and(|v| v.starts_with('/'));
            if !absolute {
                entry.remove("valueFrom");
                entry.insert("value".to_string(), Value::String(local_path));
            }
        }
        None => entries.push(json!({ "name": MODEL_ID_ENV, "value": local_path })),
    }

    Some(Value::Array(entries))
}

fn insert_opt(map: &mut Map<String, Value>, key: &str, value: &Option<Value>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.clone());
    }
}
