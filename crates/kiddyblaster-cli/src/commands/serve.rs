use anyhow::{Context, Result};
use kiddyblaster_storage::SqliteRegistry;
use kiddyblaster_web::AppState;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use super::with_database;
use crate::config::Config;
use crate::reader::{self, SimulatedCard};

/// Run the HTTP server until Ctrl+C.
pub async fn run(config: &Config, bind: Option<SocketAddr>, card: &SimulatedCard) -> Result<()> {
    with_database(config, |db| async move {
        let (scanner, simulator) = reader::open(config, card)?;
        let state = AppState::new(scanner, SqliteRegistry::new(db.pool().clone()))
            .with_simulator(simulator);

        let addr = bind.unwrap_or(config.server.bind);
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {addr}"))?;

        tokio::select! {
            result = kiddyblaster_web::serve(listener, state) => result.context("Server error")?,
            _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
        }
        Ok(())
    })
    .await?;

    info!("Server shutdown complete");
    Ok(())
}
