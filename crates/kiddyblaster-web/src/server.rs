//! HTTP server startup

use crate::api::build_router;
use crate::state::AppState;
use tokio::net::TcpListener;
use tracing::info;

/// Serve the API on `listener` until the server fails.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, build_router(state)).await
}
