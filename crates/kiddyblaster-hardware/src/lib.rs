//! Reader abstraction and card protocol driver for the Kiddyblaster card box.
//!
//! This crate provides a trait-based abstraction over an MFRC522-class RFID
//! transceiver, a mock implementation for development and tests, the driver
//! that sequences the transceiver to read or store a card identifier, and
//! the lease that keeps the single reader exclusive.
//!
//! # Layers
//!
//! ```text
//! ReaderLease<R>   exclusive checkout of the one reader (lease)
//!      │
//! CardProtocol     reset/detect/uid/select/auth/read|write/stop (driver)
//!      │
//! ReaderDevice     register-level capability surface (traits)
//!      │
//! MockReader | real SPI driver
//! ```
//!
//! # Reading a card
//!
//! ```
//! use kiddyblaster_core::CardId;
//! use kiddyblaster_hardware::{CardOutcome, CardProtocol, SharedReader};
//! use kiddyblaster_hardware::mock::{MockCard, MockReader};
//! use kiddyblaster_hardware::types::Uid;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (reader, handle) = MockReader::new();
//!     let uid = Uid::new(vec![0x04, 0xAB, 0xCD, 0xEF]).unwrap();
//!     handle.insert_card(MockCard::with_id(uid.clone(), 8, CardId::new(7)));
//!     handle.present(&uid).unwrap();
//!
//!     let shared = SharedReader::new(reader);
//!     let mut lease = shared.acquire().await;
//!
//!     match CardProtocol::default().read_id(&mut *lease) {
//!         CardOutcome::Complete(id) => assert_eq!(id, CardId::new(7)),
//!         other => panic!("unexpected outcome: {other:?}"),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! Device operations return [`Result<T>`][error::Result] with
//! [`HardwareError`]. The driver folds those into a [`CardOutcome`] so that
//! callers can tell "no card yet" apart from real failures.

pub mod driver;
pub mod error;
pub mod lease;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use driver::{CardOutcome, CardProtocol, ScanResult, WriteResult};
pub use error::{HardwareError, Result};
pub use lease::{ReaderLease, SharedReader};
pub use traits::ReaderDevice;
pub use types::{MAX_UID_LENGTH, MIN_UID_LENGTH, MifareKey, ReaderInfo, Uid};
