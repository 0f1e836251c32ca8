//! Error types for the HTTP API

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kiddyblaster_scan::ScanError;
use kiddyblaster_storage::{ProvisionError, StorageError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn scan_status(error: &ScanError) -> (StatusCode, &'static str) {
    match error {
        ScanError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "NO_CARD"),
        ScanError::ReaderBusy | ScanError::Cancelled => {
            (StatusCode::SERVICE_UNAVAILABLE, "READER_BUSY")
        }
        ScanError::UidReadFailed | ScanError::AuthenticationFailed | ScanError::Hardware(_) => {
            (StatusCode::BAD_GATEWAY, "CARD_ERROR")
        }
    }
}

fn storage_status(error: &StorageError) -> (StatusCode, &'static str) {
    match error {
        StorageError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        StorageError::Validation(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "REGISTRY_ERROR"),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, error_code) = match &self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Storage(err) | ApiError::Provision(ProvisionError::Registry(err)) => {
                storage_status(err)
            }
            ApiError::Provision(ProvisionError::Scan(err)) => scan_status(err),
            ApiError::Provision(ProvisionError::IdentifierOverflow { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "IDENTIFIER_OVERFLOW")
            }
            ApiError::Provision(ProvisionError::CardWritePending { id, .. }) => {
                error!(id, "provisioning incomplete: {message}");
                let body = Json(json!({
                    "error": {
                        "code": "CARD_WRITE_PENDING",
                        "message": message,
                    },
                    "id": id,
                    "pendingWrite": true,
                }));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
        };

        if status.is_server_error() {
            error!(status = %status, "{message}");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
