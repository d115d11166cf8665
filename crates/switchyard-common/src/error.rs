//! Error types shared across Switchyard crates
//!
//! Errors carry the context they were raised in so that startup and
//! client-bootstrap failures can be diagnosed from a single log line.

use thiserror::Error;

/// Main error type for shared Switchyard operations
#[derive(Debug, Error)]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },

    /// Configuration could not be loaded or is invalid
    #[error("configuration error [{context}]: {message}")]
    Config {
        /// Description of what's wrong
        message: String,
        /// Where the configuration was being loaded (e.g., "kubeconfig", "in-cluster")
        context: String,
    },

    /// Internal/operational error
    #[error("internal error [{context}]: {message}")]
    Internal {
        /// Description of what failed
        message: String,
        /// Context where the error occurred (e.g., "create_client", "telemetry")
        context: String,
    },
}

impl Error {
    /// Create a configuration error with context
    pub fn config_with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            context: context.into(),
        }
    }

    /// Create an internal error with context
    pub fn internal_with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
            context: context.into(),
        }
    }

    /// Get the context if this error has one
    pub fn context(&self) -> Option<&str> {
        match self {
            Error::Config { context, .. } => Some(context),
            Error::Internal { context, .. } => Some(context),
            Error::Kube { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_with_context() {
        let err = Error::config_with_context("kubeconfig", "file not readable");
        assert_eq!(err.context(), Some("kubeconfig"));
        assert!(err.to_string().contains("[kubeconfig]"));
        assert!(err.to_string().contains("file not readable"));
    }

    #[test]
    fn test_internal_error_with_context() {
        let err = Error::internal_with_context("create_client", "no TLS backend");
        assert_eq!(err.context(), Some("create_client"));
        assert_eq!(
            err.to_string(),
            "internal error [create_client]: no TLS backend"
        );
    }

    #[test]
    fn test_kube_error_converts_and_has_no_context() {
        let kube_err = kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: "forbidden".to_string(),
            reason: "Forbidden".to_string(),
            code: 403,
        });
        let err: Error = kube_err.into();
        assert!(err.context().is_none());
        assert!(err.to_string().starts_with("kubernetes error"));
    }
}
