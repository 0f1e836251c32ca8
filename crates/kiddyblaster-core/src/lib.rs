//! Shared vocabulary for the Kiddyblaster card box.
//!
//! A card placed on the reader carries a small numeric identifier in a fixed
//! memory block. Every other crate in the workspace speaks about that
//! identifier through [`CardId`], about the detections it produces through
//! [`CardEvent`], and about the reader's fixed parameters through
//! [`constants`].

pub mod constants;
pub mod error;
pub mod types;
pub mod uri;

pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
