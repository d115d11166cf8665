//! Request handlers
//!
//! Catalog reads reload from disk first so edits to definition files are
//! picked up without a restart.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use switchyard_catalog::{ModelDefinition, ModelSummary};
use switchyard_serving::DryRunResult;

use crate::error::{Error, Result};
use crate::server::AppState;

/// Body of activate and dry-run requests
#[derive(Debug, Deserialize)]
pub struct ModelRequest {
    /// Catalog id of the model
    #[serde(default)]
    pub id: String,
}

impl ModelRequest {
    fn from_body(body: std::result::Result<Json<ModelRequest>, JsonRejection>) -> Result<String> {
        let Json(request) = body.map_err(|e| Error::BadRequest(e.body_text()))?;
        if request.id.is_empty() {
            return Err(Error::BadRequest("'id' is required".to_string()));
        }
        Ok(request.id)
    }
}

/// `GET /healthz`
pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /models`
pub async fn list_models(State(state): State<AppState>) -> Json<Vec<ModelSummary>> {
    state.catalog.reload();
    Json(state.catalog.list())
}

/// `GET /models/{id}`
pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ModelDefinition>> {
    let definition = state.resolve(&id)?;
    Ok(Json(definition.as_ref().clone()))
}

/// `POST /models/activate`
pub async fn activate_model(
    State(state): State<AppState>,
    body: std::result::Result<Json<ModelRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let id = ModelRequest::from_body(body)?;
    let _guard = state.mutation_lock.lock().await;

    let definition = state.resolve(&id)?;
    let result = state.activation.activate(&definition).await?;

    info!(
        model = %id,
        resource = %state.activation.target(),
        "Model activation request completed"
    );
    Ok(Json(json!({
        "status": "success",
        "message": format!("Model {} activated", id),
        "model": definition.as_ref(),
        "inferenceservice": result,
    })))
}

/// `POST /models/dry-run`
pub async fn dry_run_model(
    State(state): State<AppState>,
    body: std::result::Result<Json<ModelRequest>, JsonRejection>,
) -> Result<Json<DryRunResult>> {
    let id = ModelRequest::from_body(body)?;
    let definition = state.resolve(&id)?;
    Ok(Json(state.activation.dry_run(&definition).await?))
}

/// `POST /models/deactivate`
pub async fn deactivate_model(State(state): State<AppState>) -> Result<Json<Value>> {
    let _guard = state.mutation_lock.lock().await;
    let result = state.activation.deactivate().await?;
    info!(resource = %state.activation.target(), "Model deactivation request completed");

    Ok(Json(json!({
        "status": "success",
        "message": "Active model deactivated",
        "result": result,
    })))
}

/// `GET /active`
pub async fn active_model(State(state): State<AppState>) -> Result<Json<Value>> {
    let body = match state.activation.get_active().await? {
        Some(inference_service) => json!({
            "status": "active",
            "inferenceservice": inference_service,
        }),
        None => json!({
            "status": "none",
            "message": "No active model",
        }),
    };
    Ok(Json(body))
}

/// `POST /refresh`
pub async fn refresh_catalog(State(state): State<AppState>) -> Json<Value> {
    info!("Refreshing model catalog");
    state.catalog.reload();

    Json(json!({
        "status": "success",
        "message": "Catalog refreshed",
        "models": state.catalog.list(),
    }))
}
