//! Switchyard - model activation control plane

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use switchyard::config::Config;
use switchyard_api::AppState;
use switchyard_catalog::ModelCatalog;
use switchyard_common::kube_utils::create_client;
use switchyard_common::telemetry::init_telemetry;
use switchyard_serving::{ActivationClient, KubeResourceStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install crypto provider before any TLS client is built
    if let Err(e) = rustls::crypto::aws_lc_rs::default_provider().install_default() {
        eprintln!(
            "CRITICAL: Failed to install crypto provider: {:?}. \
             Kubernetes API calls cannot be made without a working TLS implementation.",
            e
        );
        std::process::exit(1);
    }

    let config = Config::parse();
    init_telemetry(&config.telemetry())?;
    config.validate()?;

    let target = config.serving_target();
    info!(
        addr = %config.server_addr,
        catalog_root = %config.catalog_root.display(),
        models_subdir = %config.models_subdir,
        resource = %target,
        strategy = %config.activation_strategy,
        delete_timeout_secs = config.delete_timeout_secs,
        delete_poll_interval_secs = config.delete_poll_interval_secs,
        inference_model_root = ?config.inference_model_root,
        "Starting switchyard"
    );

    let client = create_client(config.kubeconfig.as_deref())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Kubernetes client: {}", e))?;

    let catalog = Arc::new(ModelCatalog::new(
        &config.catalog_root,
        &config.models_subdir,
    ));
    catalog.reload();

    let store = Arc::new(KubeResourceStore::new(client, target.clone()));
    let activation = ActivationClient::new(store, target)
        .with_options(config.manifest_options())
        .with_strategy(config.activation_strategy)
        .with_poll_policy(config.poll_policy());

    let state = AppState::new(catalog, Arc::new(activation));
    switchyard_api::serve(config.server_addr, state, shutdown_signal()).await?;

    info!("Switchyard stopped");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
