//! Mock device implementations for testing and development.
//!
//! This module provides a simulated reader that can be controlled
//! programmatically without requiring physical hardware.

pub mod rfid;

// Re-export commonly used types
pub use rfid::{MAX_CALL_LOG, MockCard, MockReader, MockReaderHandle, ReaderCall};
