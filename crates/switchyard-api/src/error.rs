//! Error types for the HTTP surface

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use switchyard_serving::ActivationError;

/// Result type for handler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for handler operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Requested model id is not in the catalog
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Request body is missing or malformed
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Cluster operation failed
    #[error(transparent)]
    Activation(#[from] ActivationError),

    /// Server failed to bind or run
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Error::ModelNotFound(_) => StatusCode::NOT_FOUND,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Activation(ActivationError::DeletionTimeout { .. }) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            Error::Activation(ActivationError::Kube { .. }) => StatusCode::BAD_GATEWAY,
            Error::Activation(ActivationError::Serialization(_)) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        }

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use switchyard_serving::ServingTarget;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::ModelNotFound("m1".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::BadRequest("missing id".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Activation(ActivationError::DeletionTimeout {
                namespace: "ai".into(),
                name: "active-llm".into(),
                waited: Duration::from_secs(300),
            })
            .status(),
            StatusCode::GATEWAY_TIMEOUT
        );

        let upstream = ActivationError::kube(
            "create",
            &ServingTarget::new("ai", "active-llm"),
            kube::Error::Api(kube::error::ErrorResponse {
                status: "Failure".into(),
                message: "forbidden".into(),
                reason: "Forbidden".into(),
                code: 403,
            }),
        );
        assert_eq!(
            Error::Activation(upstream).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            Error::Internal("bind".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_into_response_uses_status() {
        let response = Error::ModelNotFound("m1".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
