//! Card scanning for the Kiddyblaster card box.
//!
//! This crate turns single driver attempts into sessions with a poll
//! interval, a deadline and cancellation, and fans continuous detections
//! out as a stream of [`CardEvent`](kiddyblaster_core::CardEvent)s.
//!
//! # Overview
//!
//! - [`session`]: the per-session state machine
//! - [`scanner`]: [`Scanner`] and the exclusive [`ScanHandle`]
//! - [`publisher`]: [`publish`] and the [`CardEvents`] stream
//!
//! # Examples
//!
//! ```
//! use kiddyblaster_core::CardId;
//! use kiddyblaster_hardware::CardProtocol;
//! use kiddyblaster_hardware::mock::{MockCard, MockReader};
//! use kiddyblaster_hardware::types::Uid;
//! use kiddyblaster_scan::{ScanConfig, Scanner};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (reader, handle) = MockReader::new();
//!     let uid = Uid::new(vec![0x04, 0x01, 0x02, 0x03]).unwrap();
//!     handle.insert_card(MockCard::with_id(uid.clone(), 8, CardId::new(3)));
//!     handle.present(&uid).unwrap();
//!
//!     let scanner = Scanner::new(reader, CardProtocol::default(), ScanConfig::default());
//!     let id = scanner.scan(Duration::from_secs(1)).await.unwrap();
//!     assert_eq!(id, CardId::new(3));
//! }
//! ```

pub mod error;
pub mod publisher;
pub mod scanner;
pub mod session;

pub use error::ScanError;
pub use publisher::{CardEvents, publish};
pub use scanner::{ScanConfig, ScanHandle, Scanner};
pub use session::{ScanSession, ScanState, StateTransition};
