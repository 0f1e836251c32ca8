//! HTTP handlers and routing

pub mod cards;
pub mod simulator;
pub mod stream;

use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Detection stream
        .route("/stream", get(stream::card_stream))
        // Registry and provisioning
        .route("/cards", get(cards::list_cards))
        .route("/cards/provision", post(cards::provision))
        .route("/cards/:id", get(cards::get_card))
        .route("/cards/:id/write", post(cards::retry_write))
        // Simulated reader
        .route("/simulator/present", post(simulator::present))
        .route("/simulator/remove", post(simulator::remove))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
