//! Server-Sent Events stream of card detections.
//!
//! Each connection runs its own scan loop on the shared reader; a second
//! client waits until the first disconnects. Every detection is sent as an
//! event named `message` whose data is the JSON [`CardEvent`].
//!
//! [`CardEvent`]: kiddyblaster_core::CardEvent

use crate::state::AppState;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use kiddyblaster_scan::publish;
use std::time::Duration;
use tracing::debug;

/// SSE event name carrying detections.
const EVENT_NAME: &str = "message";

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// GET /stream - card detection stream
pub async fn card_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    debug!("stream client connected");

    let events = publish(state.scanner.clone())
        .map(|event| Event::default().event(EVENT_NAME).json_data(event));

    Sse::new(events).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("keep-alive"),
    )
}
