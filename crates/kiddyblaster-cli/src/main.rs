//! Kiddyblaster - card box service and tools
//!
//! `kiddyblaster serve` runs the HTTP API with the detection stream,
//! `kiddyblaster write NAME PATH` provisions the card on the reader and
//! `kiddyblaster read` shows what the card on the reader plays.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

mod commands;
mod config;
mod reader;

use commands::write::WriteArgs;
use config::Config;
use reader::SimulatedCard;

/// Command-line arguments for kiddyblaster
#[derive(Parser, Debug)]
#[command(name = "kiddyblaster")]
#[command(about = "RFID card box: detection stream and card provisioning")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, env = "KIDDYBLASTER_CONFIG")]
    config: Option<PathBuf>,

    /// Place a card with this hex UID on the simulated reader
    #[arg(long, global = true)]
    uid: Option<String>,

    /// Identifier already stored on the simulated card
    #[arg(long, global = true, requires = "uid")]
    card_id: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Provision the card on the reader for a library directory
    Write {
        /// Display name
        name: String,

        /// Directory inside the music library
        path: String,

        /// Overwrite a provisioned card without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Read the card on the reader and look it up
    Read,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let card = SimulatedCard {
        uid: cli.uid,
        card_id: cli.card_id,
    };

    info!("Starting kiddyblaster v{}", kiddyblaster_core::VERSION);

    match cli.command {
        Command::Serve { bind } => commands::serve::run(&config, bind, &card).await,
        Command::Write { name, path, yes } => {
            commands::write::run(&config, &WriteArgs { name, path, yes }, &card).await
        }
        Command::Read => commands::read::run(&config, &card).await,
    }
}
