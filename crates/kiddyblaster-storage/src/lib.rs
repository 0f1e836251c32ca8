//! Storage layer for the Kiddyblaster card registry.
//!
//! This crate provides SQLite-backed persistence for provisioned cards and
//! the provisioning workflow that keeps cards and registry in step.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool manager with automatic migrations
//! - [`Registry`] - Data access trait, implemented by [`SqliteRegistry`]
//! - [`Reconciler`] - Reads the card on the reader, allocates or updates its
//!   entry, and writes newly allocated ids onto the card
//!
//! # Identifier Allocation
//!
//! Registry ids are allocated by SQLite (`AUTOINCREMENT`, starting at 1) and
//! written to the card as a 16-bit value. A factory-blank card reads as `0`
//! and therefore never matches an entry.
//!
//! # Examples
//!
//! ```no_run
//! use kiddyblaster_hardware::CardProtocol;
//! use kiddyblaster_hardware::mock::MockReader;
//! use kiddyblaster_scan::{ScanConfig, Scanner};
//! use kiddyblaster_storage::{
//!     Database, DatabaseConfig, ProvisionOutcome, ProvisionRequest, Reconciler, SqliteRegistry,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::new("cards.sql")).await?;
//! let (reader, _handle) = MockReader::new();
//! let scanner = Scanner::new(reader, CardProtocol::default(), ScanConfig::default());
//!
//! let reconciler = Reconciler::new(SqliteRegistry::new(db.pool().clone()), scanner);
//! let request = ProvisionRequest::new("Pippi Langstrumpf", "Pippi Langstrumpf/CD1");
//!
//! match reconciler.provision(&request).await? {
//!     ProvisionOutcome::Allocated { id } => println!("card now carries id {id}"),
//!     ProvisionOutcome::Updated { id } => println!("entry {id} updated"),
//!     ProvisionOutcome::ConfirmationRequired { existing } => {
//!         println!("card already plays {}", existing.name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod models;
pub mod reconciler;
pub mod repositories;

pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use models::RegistryEntry;
pub use reconciler::{ProvisionError, ProvisionOutcome, ProvisionRequest, Reconciler};
pub use repositories::{Registry, SqliteRegistry};
