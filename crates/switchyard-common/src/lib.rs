//! Common types for Switchyard: errors, cluster client bootstrap, polling and telemetry

#![deny(missing_docs)]

pub mod error;
pub mod kube_utils;
pub mod poll;
pub mod telemetry;

pub use error::Error;
pub use poll::{poll_until, Clock, PollError, PollPolicy, SystemClock};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// API group of the serving workload kind
pub const SERVING_GROUP: &str = "serving.kserve.io";

/// API version of the serving workload kind
pub const SERVING_VERSION: &str = "v1beta1";

/// Kind of the single managed serving resource
pub const INFERENCE_SERVICE_KIND: &str = "InferenceService";

/// Annotation recording which catalog model the live resource was built from
pub const MODEL_ID_ANNOTATION: &str = "model-manager/model-id";

/// Annotation naming the secret the serving runtime pulls credentials from
pub const SECRET_NAME_ANNOTATION: &str = "serving.kserve.io/secretName";

/// Annotation that marks PVC-backed storage as writable for the storage initializer
pub const STORAGE_READONLY_ANNOTATION: &str = "storage.kserve.io/readonly";
