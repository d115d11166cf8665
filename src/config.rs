//! Process configuration
//!
//! Built once at startup from flags and environment variables, then handed to
//! component constructors. Nothing reads the environment after this.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use switchyard_common::telemetry::TelemetryConfig;
use switchyard_common::{Error, PollPolicy};
use switchyard_serving::{ActivationStrategy, ManifestOptions, ServingTarget};

/// Switchyard - switches the active LLM InferenceService from a model catalog
#[derive(Parser, Debug, Clone)]
#[command(name = "switchyard", version, about, long_about = None)]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:8080")]
    pub server_addr: SocketAddr,

    /// Root directory of the model catalog
    #[arg(long, env = "MODEL_CATALOG_ROOT", default_value = "/workspace/catalog")]
    pub catalog_root: PathBuf,

    /// Subdirectory of the catalog root holding model definition files
    #[arg(long, env = "MODEL_CATALOG_MODELS_SUBDIR", default_value = "models")]
    pub models_subdir: String,

    /// Namespace of the managed InferenceService
    #[arg(long, env = "ACTIVE_NAMESPACE", default_value = "ai")]
    pub namespace: String,

    /// Name of the managed InferenceService
    #[arg(long, env = "ACTIVE_INFERENCESERVICE_NAME", default_value = "active-llm")]
    pub inference_service_name: String,

    /// Mount point of PVC-backed models inside the serving container
    #[arg(long, env = "INFERENCE_MODEL_ROOT")]
    pub inference_model_root: Option<String>,

    /// How long activation waits for the previous InferenceService to disappear
    #[arg(long, env = "DELETE_TIMEOUT_SECS", default_value_t = 300)]
    pub delete_timeout_secs: u64,

    /// How often activation checks whether the previous InferenceService is gone
    #[arg(long, env = "DELETE_POLL_INTERVAL_SECS", default_value_t = 2)]
    pub delete_poll_interval_secs: u64,

    /// What to do when an InferenceService already exists: recreate or in-place
    #[arg(long, env = "ACTIVATION_STRATEGY", default_value = "recreate")]
    pub activation_strategy: ActivationStrategy,

    /// Explicit kubeconfig path; otherwise in-cluster, then local kubeconfig
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Emit JSON log lines (env accepts true/false, 1/0, yes/no, on/off)
    #[arg(long, env = "LOG_JSON", value_parser = clap::builder::BoolishValueParser::new())]
    pub log_json: bool,
}

impl Config {
    /// Reject settings that would make the deletion wait meaningless
    pub fn validate(&self) -> switchyard_common::Result<()> {
        if self.delete_poll_interval_secs == 0 {
            return Err(Error::config_with_context(
                "delete_poll_interval_secs",
                "poll interval must be at least 1 second",
            ));
        }
        if self.delete_poll_interval_secs > self.delete_timeout_secs {
            return Err(Error::config_with_context(
                "delete_poll_interval_secs",
                format!(
                    "poll interval ({}s) exceeds deletion timeout ({}s)",
                    self.delete_poll_interval_secs, self.delete_timeout_secs
                ),
            ));
        }
        if self.namespace.is_empty() || self.inference_service_name.is_empty() {
            return Err(Error::config_with_context(
                "target",
                "namespace and InferenceService name must be non-empty",
            ));
        }
        Ok(())
    }

    /// Deletion wait policy
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_secs(self.delete_poll_interval_secs),
            Duration::from_secs(self.delete_timeout_secs),
        )
    }

    /// The managed InferenceService
    pub fn serving_target(&self) -> ServingTarget {
        ServingTarget::new(&self.namespace, &self.inference_service_name)
    }

    /// Manifest rendering options
    pub fn manifest_options(&self) -> ManifestOptions {
        ManifestOptions {
            inference_model_root: self
                .inference_model_root
                .clone()
                .filter(|root| !root.is_empty()),
            ..Default::default()
        }
    }

    /// Telemetry settings
    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            json: self.log_json,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["switchyard"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]);
        assert_eq!(config.server_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.catalog_root, PathBuf::from("/workspace/catalog"));
        assert_eq!(config.models_subdir, "models");
        assert_eq!(config.namespace, "ai");
        assert_eq!(config.inference_service_name, "active-llm");
        assert_eq!(config.activation_strategy, ActivationStrategy::Recreate);
        assert_eq!(config.poll_policy(), PollPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&[
            "--namespace",
            "llm",
            "--inference-service-name",
            "current",
            "--delete-timeout-secs",
            "60",
            "--delete-poll-interval-secs",
            "5",
            "--activation-strategy",
            "in-place",
            "--inference-model-root",
            "/mnt/models",
            "--log-json",
        ]);

        assert_eq!(config.serving_target(), ServingTarget::new("llm", "current"));
        assert_eq!(
            config.poll_policy(),
            PollPolicy::new(Duration::from_secs(5), Duration::from_secs(60))
        );
        assert_eq!(config.activation_strategy, ActivationStrategy::InPlace);
        assert_eq!(
            config.manifest_options().inference_model_root.as_deref(),
            Some("/mnt/models")
        );
        assert!(config.telemetry().json);
    }

    #[test]
    fn test_log_json_env_accepts_numeric_values() {
        // no other test depends on LOG_JSON
        std::env::set_var("LOG_JSON", "1");
        let enabled = Config::try_parse_from(["switchyard"]);
        std::env::set_var("LOG_JSON", "0");
        let disabled = Config::try_parse_from(["switchyard"]);
        std::env::remove_var("LOG_JSON");

        assert!(enabled.unwrap().telemetry().json);
        assert!(!disabled.unwrap().telemetry().json);
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let result = Config::try_parse_from(["switchyard", "--activation-strategy", "patch"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_bad_poll_settings() {
        let zero = parse(&["--delete-poll-interval-secs", "0"]);
        assert_eq!(
            zero.validate().unwrap_err().context(),
            Some("delete_poll_interval_secs")
        );

        let inverted = parse(&[
            "--delete-poll-interval-secs",
            "30",
            "--delete-timeout-secs",
            "10",
        ]);
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_empty_model_root_is_unset() {
        let config = parse(&["--inference-model-root", ""]);
        assert_eq!(config.manifest_options().inference_model_root, None);
    }
}
