use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::str::FromStr;

use crate::{
    api::{error::ApiError, AppState},
    domain::{
        card::{Card, CardId, CardStatus},
        history::ChangeRecord,
        reorder::MoveRequest,
    },
};

#[derive(Deserialize)]
pub struct ListQuery {
    status: Option<String>,
}

/// GET /api/v1/cards: the whole board in lane order, or one lane when
/// `?status=` is given.
pub async fn list_cards(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Card>>, ApiError> {
    let status = match query.status.as_deref() {
        Some(raw) => Some(CardStatus::from_str(raw)?),
        None => None,
    };
    Ok(Json(state.store.list_cards(status).await?))
}

/// GET /api/v1/cards/{id}
pub async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Card>, ApiError> {
    Ok(Json(state.store.get_card(CardId::new(id)).await?))
}

/// GET /api/v1/cards/{id}/history
pub async fn card_history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<ChangeRecord>>, ApiError> {
    let id = CardId::new(id);
    // A clean 404 for unknown cards rather than an empty log.
    state.store.get_card(id).await?;
    Ok(Json(state.store.history(id).await?))
}

/// Body of a move request. Field names mirror the original client wire
/// format; statuses arrive as raw strings so unknown lanes map to the
/// `invalid_status` error code rather than a deserialization failure.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardBody {
    pub new_status: String,
    pub new_priority: i64,
    pub old_status: String,
    pub old_priority: i64,
    pub actor: String,
}

/// PUT /api/v1/cards/{id}: applies a move and returns the refreshed full
/// card list.
pub async fn move_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<MoveCardBody>,
) -> Result<Json<Vec<Card>>, ApiError> {
    let req = MoveRequest {
        card_id: CardId::new(id),
        old_status: CardStatus::from_str(&body.old_status)?,
        old_priority: body.old_priority,
        new_status: CardStatus::from_str(&body.new_status)?,
        new_priority: body.new_priority,
        actor: body.actor,
    };

    state.store.apply_move(req).await?;
    Ok(Json(state.store.list_cards(None).await?))
}
