//! HTTP server

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::sync::Mutex;
use tracing::info;

use switchyard_catalog::{ModelCatalog, ModelDefinition};
use switchyard_serving::ActivationClient;

use crate::error::Error;
use crate::handlers;

/// Shared state for handlers
#[derive(Clone)]
pub struct AppState {
    /// Model definitions
    pub catalog: Arc<ModelCatalog>,
    /// Activation state machine for the managed InferenceService
    pub activation: Arc<ActivationClient>,
    /// Serializes activate and deactivate against the single resource
    pub mutation_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Create state over a catalog and activation client
    pub fn new(catalog: Arc<ModelCatalog>, activation: Arc<ActivationClient>) -> Self {
        Self {
            catalog,
            activation,
            mutation_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Reload the catalog and look up `id`
    pub(crate) fn resolve(&self, id: &str) -> Result<Arc<ModelDefinition>, Error> {
        self.catalog.reload();
        self.catalog
            .get(id)
            .ok_or_else(|| Error::ModelNotFound(id.to_string()))
    }
}

/// Build the router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/models", get(handlers::list_models))
        .route("/models/activate", post(handlers::activate_model))
        .route("/models/dry-run", post(handlers::dry_run_model))
        .route("/models/deactivate", post(handlers::deactivate_model))
        .route("/models/{id}", get(handlers::get_model))
        .route("/active", get(handlers::active_model))
        .route("/refresh", post(handlers::refresh_catalog))
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(addr: SocketAddr, state: AppState, shutdown: F) -> Result<(), Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Internal(format!("failed to bind {}: {}", addr, e)))?;

    info!(addr = %addr, "Starting HTTP server");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Internal(format!("server error: {}", e)))?;

    info!("HTTP server stopped");
    Ok(())
}
