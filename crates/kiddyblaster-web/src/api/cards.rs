//! Registry lookup and provisioning endpoints

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use kiddyblaster_storage::{ProvisionOutcome, ProvisionRequest, Registry, RegistryEntry};
use serde_json::{Value, json};

/// GET /cards - all registry entries
pub async fn list_cards(State(state): State<AppState>) -> ApiResult<Json<Vec<RegistryEntry>>> {
    Ok(Json(state.registry.find_all().await?))
}

/// GET /cards/:id - the entry a card identifier maps to
pub async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<RegistryEntry>> {
    state
        .registry
        .find_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("card {id}")))
}

/// POST /cards/provision - bind the card on the reader to a name and URI
///
/// Answers 201 for a newly allocated card, 200 for an updated entry and
/// 409 with the existing entry when the overwrite needs confirmation.
pub async fn provision(
    State(state): State<AppState>,
    Json(request): Json<ProvisionRequest>,
) -> ApiResult<Response> {
    let outcome = state.reconciler.provision(&request).await?;

    let status = match &outcome {
        ProvisionOutcome::Allocated { .. } => StatusCode::CREATED,
        ProvisionOutcome::Updated { .. } => StatusCode::OK,
        ProvisionOutcome::ConfirmationRequired { .. } => StatusCode::CONFLICT,
    };

    Ok((status, Json(outcome)).into_response())
}

/// POST /cards/:id/write - finish a provisioning whose card write failed
pub async fn retry_write(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    let card_id = state.reconciler.retry_write(id).await?;
    Ok(Json(json!({ "id": id, "cardId": card_id })))
}
