use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    api::{error::ApiError, AppState},
    storage::PinVerification,
};

#[derive(Deserialize)]
pub struct PinBody {
    pin: Option<String>,
}

/// POST /api/v1/verify-pin: resolves a PIN to an actor identity.
///
/// Zero matches is an ordinary unauthorized response; more than one match
/// means the user table is misconfigured and surfaces as a server error.
pub async fn verify_pin(
    State(state): State<AppState>,
    Json(body): Json<PinBody>,
) -> Result<Response, ApiError> {
    let pin = match body.pin.as_deref() {
        Some(pin) if !pin.trim().is_empty() => pin,
        _ => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({ "code": "missing_pin", "message": "Missing PIN" })),
            )
                .into_response())
        }
    };

    let response = match state.store.verify_pin(pin).await? {
        PinVerification::Valid { user_id, name } => (
            StatusCode::OK,
            Json(json!({ "valid": true, "userId": user_id, "name": name })),
        ),
        PinVerification::Invalid => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "valid": false,
                "code": "invalid_pin",
                "message": "Invalid PIN"
            })),
        ),
        PinVerification::Ambiguous => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "valid": false,
                "code": "pin_not_unique",
                "message": "PIN is not unique. Contact admin."
            })),
        ),
    };
    Ok(response.into_response())
}
