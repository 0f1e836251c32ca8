//! Error types for scan sessions.

use kiddyblaster_hardware::HardwareError;
use std::time::Duration;

/// Why a scan session ended without an identifier.
///
/// "No card yet" is never an error; it only keeps the session polling.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// A card answered but its UID could not be read.
    #[error("Could not read card UID")]
    UidReadFailed,

    /// The card rejected the key for the data block.
    #[error("Card rejected authentication")]
    AuthenticationFailed,

    /// Any other reader or card fault.
    #[error("Reader fault: {0}")]
    Hardware(#[from] HardwareError),

    /// No card was presented before the deadline.
    #[error("No card presented within {after:?}")]
    Timeout { after: Duration },

    /// The session was cancelled by its owner.
    #[error("Scan cancelled")]
    Cancelled,

    /// Another consumer held the reader for too long.
    #[error("Reader is busy")]
    ReaderBusy,
}

impl ScanError {
    /// Returns `true` for failures caused by the card or the reader,
    /// as opposed to the session's own lifetime limits.
    pub fn is_hardware(&self) -> bool {
        matches!(
            self,
            Self::UidReadFailed | Self::AuthenticationFailed | Self::Hardware(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScanError::Timeout {
            after: Duration::from_secs(60),
        };
        assert_eq!(err.to_string(), "No card presented within 60s");

        let err = ScanError::from(HardwareError::communication("spi"));
        assert_eq!(err.to_string(), "Reader fault: Communication error: spi");
    }

    #[test]
    fn test_is_hardware() {
        assert!(ScanError::UidReadFailed.is_hardware());
        assert!(ScanError::AuthenticationFailed.is_hardware());
        assert!(!ScanError::Cancelled.is_hardware());
        assert!(!ScanError::ReaderBusy.is_hardware());
    }
}
