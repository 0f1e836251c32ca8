//! Control endpoints for the simulated reader

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use kiddyblaster_core::CardId;
use kiddyblaster_hardware::mock::{MockCard, MockReaderHandle};
use kiddyblaster_hardware::types::Uid;
use serde::Deserialize;
use tracing::info;

/// Card to place on the simulated reader.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentRequest {
    /// UID as hex, e.g. `"04A1B2C3"`.
    pub uid: String,

    /// Identifier to put in the data block. Unknown cards without one are blank.
    #[serde(default)]
    pub card_id: Option<u16>,
}

fn simulator(state: &AppState) -> ApiResult<&MockReaderHandle> {
    state
        .simulator
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("simulator not enabled".to_string()))
}

/// POST /simulator/present - place a card on the reader
pub async fn present(
    State(state): State<AppState>,
    Json(request): Json<PresentRequest>,
) -> ApiResult<StatusCode> {
    let handle = simulator(&state)?;
    let uid = Uid::from_hex(&request.uid).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    match request.card_id {
        Some(id) => {
            let block = state.scanner.protocol().block();
            handle.insert_card(MockCard::with_id(uid.clone(), block, CardId::new(id)));
        }
        None if handle.card(&uid).is_none() => handle.insert_card(MockCard::blank(uid.clone())),
        None => {}
    }
    handle
        .present(&uid)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    info!(uid = %uid, "simulated card presented");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /simulator/remove - lift the card off the reader
pub async fn remove(State(state): State<AppState>) -> ApiResult<StatusCode> {
    simulator(&state)?.remove();
    info!("simulated card removed");
    Ok(StatusCode::NO_CONTENT)
}
