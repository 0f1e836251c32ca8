//! Error types for reader operations.
//!
//! This module defines the failures a reader can report while a card is
//! being addressed: a UID that cannot be read, a sector that refuses the
//! key, a block that cannot be read or written, and plain transport faults.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during reader operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// The card answered the request but its UID could not be read.
    #[error("UID read failed")]
    UidReadFailed,

    /// The sector holding the block rejected the key.
    #[error("Authentication failed for block {block}")]
    AuthenticationFailed { block: u8 },

    /// Reading a block failed after authentication.
    #[error("Block {block} read failed: {message}")]
    BlockReadFailed { block: u8, message: String },

    /// Writing a block was rejected by the card.
    #[error("Block {block} write failed: {message}")]
    WriteFailed { block: u8, message: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    pub fn authentication(block: u8) -> Self {
        Self::AuthenticationFailed { block }
    }

    pub fn block_read(block: u8, message: impl Into<String>) -> Self {
        Self::BlockReadFailed {
            block,
            message: message.into(),
        }
    }

    pub fn write_failed(block: u8, message: impl Into<String>) -> Self {
        Self::WriteFailed {
            block,
            message: message.into(),
        }
    }

    /// Transport fault on the bus between host and transceiver.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }
}
