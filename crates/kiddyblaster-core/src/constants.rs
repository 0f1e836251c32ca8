//! Card layout and reader timing constants.
//!
//! The identifier lives in a single 16-byte data block of a Mifare Classic
//! card. Block 8 is the first block of sector 2, so it never collides with
//! the manufacturer block (0) or a sector trailer (3, 7, 11, ...).
//!
//! ```text
//!  byte:  0      1      2 .. 15
//!        +------+------+------------------+
//!        | id % | id / |   0xFF fill      |
//!        | 256  | 256  |                  |
//!        +------+------+------------------+
//! ```
//!
//! # Usage
//!
//! ```
//! use kiddyblaster_core::constants::*;
//!
//! assert_eq!(DATA_BLOCK, 8);
//! assert_eq!(DEFAULT_KEY, [0xFF; KEY_LENGTH]);
//!
//! use std::time::Duration;
//! let interval = Duration::from_millis(DEFAULT_POLL_INTERVAL_MS);
//! assert_eq!(interval.as_millis(), 500);
//! ```

// ============================================================================
// Card Layout
// ============================================================================

/// Block that stores the card identifier.
pub const DATA_BLOCK: u8 = 8;

/// Number of blocks on a Mifare Classic 1K card (16 sectors of 4).
pub const BLOCK_COUNT: u8 = 64;

/// Size of a Mifare Classic data block in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Number of leading block bytes that encode the identifier.
pub const ID_BYTES: usize = 2;

/// Value written to the unused tail of the data block.
pub const BLOCK_FILL: u8 = 0xFF;

/// Length of a Mifare Classic sector key.
pub const KEY_LENGTH: usize = 6;

/// Factory default key A (transport key) shipped on blank cards.
pub const DEFAULT_KEY: [u8; KEY_LENGTH] = [0xFF; KEY_LENGTH];

// ============================================================================
// Reader Timing
// ============================================================================

/// Delay between two polls of the reader in milliseconds.
///
/// Each poll is a short synchronous exchange with the transceiver; the delay
/// keeps the field from being hammered while nothing is present.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// How long a bounded scan (card write, single read) waits for a card.
pub const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 60;

/// How long a bounded operation waits for another consumer to release the reader.
pub const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// Library
// ============================================================================

/// Directory the player serves audio from; registry URIs are relative to it.
pub const DEFAULT_MUSIC_DIR: &str = "/home/pi/Music";
