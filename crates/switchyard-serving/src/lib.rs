//! InferenceService activation for Switchyard
//!
//! Renders catalog model definitions into InferenceService manifests and
//! drives the single managed resource between Absent and Present.

#![deny(missing_docs)]

use std::fmt;

pub mod activation;
pub mod error;
pub mod manifest;
pub mod store;

pub use activation::{
    ActivateAction, ActivateResult, ActivationClient, ActivationStrategy, DeactivateAction,
    DeactivateResult, DryRunAction, DryRunResult,
};
pub use error::ActivationError;
pub use manifest::{build_inference_service, build_vllm_args, ManifestOptions};
pub use store::{Deletion, KubeResourceStore, ResourceStore};

/// The fixed (namespace, name) of the managed InferenceService
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServingTarget {
    /// Namespace of the resource
    pub namespace: String,
    /// Name of the resource
    pub name: String,
}

impl ServingTarget {
    /// Create a target
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ServingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
