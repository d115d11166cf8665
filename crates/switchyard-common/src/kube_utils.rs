//! Shared Kubernetes utilities using kube-rs
//!
//! Client bootstrap follows two ordered strategies: in-cluster service account
//! credentials first, then the local kubeconfig. An explicit kubeconfig path
//! skips discovery entirely.

use std::path::Path;
use std::time::Duration;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::discovery::ApiResource;
use kube::{Client, Config};
use tracing::{info, warn};

use crate::{Error, Result};

/// Default connection timeout for kube clients
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default read timeout for kube clients
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Create a kube client from an optional kubeconfig path with default timeouts
pub async fn create_client(kubeconfig: Option<&Path>) -> Result<Client> {
    create_client_with_timeout(kubeconfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT).await
}

/// Create a kube client from an optional kubeconfig path with custom timeouts
///
/// Without a path, in-cluster configuration is tried first and the local
/// kubeconfig is the fallback. Both failures are reported together.
pub async fn create_client_with_timeout(
    kubeconfig: Option<&Path>,
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<Client> {
    let mut config = match kubeconfig {
        Some(path) => load_kubeconfig_file(path).await?,
        None => discover_config().await?,
    };
    config.connect_timeout = Some(connect_timeout);
    config.read_timeout = Some(read_timeout);

    Client::try_from(config).map_err(|e| {
        Error::internal_with_context("create_client", format!("failed to create client: {}", e))
    })
}

async fn load_kubeconfig_file(path: &Path) -> Result<Config> {
    let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
        Error::config_with_context(
            "kubeconfig",
            format!("failed to read kubeconfig {}: {}", path.display(), e),
        )
    })?;
    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| {
            Error::config_with_context(
                "kubeconfig",
                format!("failed to load kubeconfig {}: {}", path.display(), e),
            )
        })?;
    info!(path = %path.display(), "Loaded Kubernetes config from explicit kubeconfig");
    Ok(config)
}

async fn discover_config() -> Result<Config> {
    let in_cluster_err = match Config::incluster() {
        Ok(config) => {
            info!("Loaded in-cluster Kubernetes config");
            return Ok(config);
        }
        Err(e) => e,
    };

    warn!(error = %in_cluster_err, "In-cluster config not available, trying local kubeconfig");

    match Config::from_kubeconfig(&KubeConfigOptions::default()).await {
        Ok(config) => {
            info!("Loaded local kubeconfig");
            Ok(config)
        }
        Err(e) => Err(Error::config_with_context(
            "create_client",
            format!(
                "no usable Kubernetes credentials (in-cluster: {}; kubeconfig: {})",
                in_cluster_err, e
            ),
        )),
    }
}

/// Build an ApiResource from a known apiVersion and kind.
///
/// # Example
/// ```
/// use switchyard_common::kube_utils::build_api_resource;
///
/// let ar = build_api_resource("serving.kserve.io/v1beta1", "InferenceService");
/// assert_eq!(ar.group, "serving.kserve.io");
/// assert_eq!(ar.plural, "inferenceservices");
/// ```
pub fn build_api_resource(api_version: &str, kind: &str) -> ApiResource {
    let (group, version) = parse_api_version(api_version);
    ApiResource {
        group,
        version,
        kind: kind.to_string(),
        api_version: api_version.to_string(),
        plural: pluralize_kind(kind),
    }
}

/// Parse apiVersion into (group, version)
///
/// # Examples
/// ```
/// use switchyard_common::kube_utils::parse_api_version;
///
/// let (group, version) = parse_api_version("apps/v1");
/// assert_eq!(group, "apps");
/// assert_eq!(version, "v1");
///
/// let (group, version) = parse_api_version("v1");
/// assert_eq!(group, "");
/// assert_eq!(version, "v1");
/// ```
pub fn parse_api_version(api_version: &str) -> (String, String) {
    match api_version.split_once('/') {
        Some((group, version)) => (group.to_string(), version.to_string()),
        None => (String::new(), api_version.to_string()),
    }
}

/// Derive the REST plural for a kind (lowercase, pluralized)
pub fn pluralize_kind(kind: &str) -> String {
    let lower = kind.to_lowercase();
    if lower.ends_with('s') || lower.ends_with("ch") || lower.ends_with("sh") {
        format!("{}es", lower)
    } else if let Some(stem) = lower.strip_suffix('y') {
        format!("{}ies", stem)
    } else {
        format!("{}s", lower)
    }
}

/// Check whether a kube error is an API "not found" response
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.code == 404)
}

/// Check whether a kube error is an API "already exists"/conflict response
pub fn is_conflict(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.code == 409)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: format!("{} error", reason),
            reason: reason.to_string(),
            code,
        })
    }

    #[test]
    fn test_build_api_resource_for_inference_service() {
        let ar = build_api_resource("serving.kserve.io/v1beta1", "InferenceService");
        assert_eq!(ar.group, "serving.kserve.io");
        assert_eq!(ar.version, "v1beta1");
        assert_eq!(ar.kind, "InferenceService");
        assert_eq!(ar.api_version, "serving.kserve.io/v1beta1");
        assert_eq!(ar.plural, "inferenceservices");
    }

    #[test]
    fn test_pluralize_kind() {
        assert_eq!(pluralize_kind("Deployment"), "deployments");
        assert_eq!(pluralize_kind("Ingress"), "ingresses");
        assert_eq!(pluralize_kind("NetworkPolicy"), "networkpolicies");
        assert_eq!(pluralize_kind("InferenceService"), "inferenceservices");
    }

    #[test]
    fn test_not_found_and_conflict_detection() {
        assert!(is_not_found(&api_error(404, "NotFound")));
        assert!(!is_not_found(&api_error(409, "AlreadyExists")));
        assert!(is_conflict(&api_error(409, "AlreadyExists")));
        assert!(!is_conflict(&api_error(500, "InternalError")));
    }

    #[tokio::test]
    async fn test_missing_explicit_kubeconfig_is_config_error() {
        let Err(err) = create_client(Some(Path::new("/nonexistent/switchyard/kubeconfig"))).await
        else {
            panic!("missing kubeconfig must fail");
        };
        assert_eq!(err.context(), Some("kubeconfig"));
    }
}
