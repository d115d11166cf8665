//! Activation errors
//!
//! "Not found" never appears here: the store and the activation client turn it
//! into a normal result (`None`, `already_deleted`).

use std::time::Duration;

use thiserror::Error;

use crate::ServingTarget;

/// Error returned by resource store and activation operations
#[derive(Debug, Error)]
pub enum ActivationError {
    /// Cluster API call failed with anything other than "not found"
    #[error("{operation} {namespace}/{name} failed: {source}")]
    Kube {
        /// Operation that failed (get, create, replace, delete)
        operation: &'static str,
        /// Namespace of the managed resource
        namespace: String,
        /// Name of the managed resource
        name: String,
        /// The underlying kube-rs error, unchanged
        #[source]
        source: kube::Error,
    },

    /// The previous resource was still present when the deletion wait ran out
    #[error("timed out after {waited:?} waiting for {namespace}/{name} to be deleted")]
    DeletionTimeout {
        /// Namespace of the managed resource
        namespace: String,
        /// Name of the managed resource
        name: String,
        /// Time spent waiting
        waited: Duration,
    },

    /// A manifest or live object could not be converted
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ActivationError {
    /// Wrap a kube error with the operation and target it came from
    pub fn kube(operation: &'static str, target: &ServingTarget, source: kube::Error) -> Self {
        Self::Kube {
            operation,
            namespace: target.namespace.clone(),
            name: target.name.clone(),
            source,
        }
    }

    /// The underlying kube error, if this is an upstream failure
    pub fn kube_error(&self) -> Option<&kube::Error> {
        match self {
            Self::Kube { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Whether the cluster rejected the call because the resource already exists
    pub fn is_conflict(&self) -> bool {
        self.kube_error()
            .is_some_and(switchyard_common::kube_utils::is_conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: "boom".to_string(),
            reason: "Test".to_string(),
            code,
        })
    }

    fn target() -> ServingTarget {
        ServingTarget::new("ai", "active-llm")
    }

    #[test]
    fn test_kube_error_keeps_source_and_context() {
        let err = ActivationError::kube("create", &target(), api_error(500));
        assert!(err.to_string().starts_with("create ai/active-llm failed: "));
        assert!(matches!(err.kube_error(), Some(kube::Error::Api(ae)) if ae.code == 500));
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_conflict_detection() {
        let err = ActivationError::kube("create", &target(), api_error(409));
        assert!(err.is_conflict());

        let timeout = ActivationError::DeletionTimeout {
            namespace: "ai".to_string(),
            name: "active-llm".to_string(),
            waited: Duration::from_secs(300),
        };
        assert!(!timeout.is_conflict());
        assert!(timeout.kube_error().is_none());
    }
}
