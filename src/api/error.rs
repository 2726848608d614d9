use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::ShiptivityError;

/// Wire form of a failure: an HTTP status plus `{code, message}` where
/// `code` is machine-readable and stable.
pub struct ApiError(pub ShiptivityError);

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            ShiptivityError::CardNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ShiptivityError::InvalidStatus(_) => (StatusCode::BAD_REQUEST, "invalid_status"),
            ShiptivityError::InvalidPriority { .. } => {
                (StatusCode::BAD_REQUEST, "invalid_priority")
            }
            ShiptivityError::StaleMove { .. } => (StatusCode::CONFLICT, "conflict"),
            ShiptivityError::InvariantViolation { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "invariant_violation")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "storage_failure"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, code, "request failed");
        }
        (
            status,
            Json(json!({ "code": code, "message": self.0.to_string() })),
        )
            .into_response()
    }
}

impl From<ShiptivityError> for ApiError {
    fn from(err: ShiptivityError) -> Self {
        Self(err)
    }
}
