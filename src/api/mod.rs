//! HTTP surface over the storage seam.
//!
//! Handlers never talk to SQLite directly; everything goes through the
//! injected [`Storage`] implementation, so the router can be built over an
//! in-memory database in tests.

pub mod cards;
pub mod error;
pub mod pin;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::storage::Storage;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Storage>,
}

pub fn build_router(store: Arc<dyn Storage>) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/", get(banner))
        .route("/api/v1/cards", get(cards::list_cards))
        .route(
            "/api/v1/cards/{id}",
            get(cards::get_card).put(cards::move_card),
        )
        .route("/api/v1/cards/{id}/history", get(cards::card_history))
        .route("/api/v1/verify-pin", post(pin::verify_pin))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn banner() -> Json<serde_json::Value> {
    Json(json!({ "message": "SHIPTIVITY API. Read documentation to see API docs" }))
}
