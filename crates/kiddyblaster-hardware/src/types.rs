//! Types exchanged with the reader.
//!
//! This module defines the card UID used to address a card during a
//! session, the sector key used to authenticate, and reader metadata.

use crate::error::{HardwareError, Result};
use kiddyblaster_core::constants::{DEFAULT_KEY, KEY_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum UID length in bytes (per ISO 14443 specification).
pub const MIN_UID_LENGTH: usize = 4;

/// Maximum UID length in bytes (per ISO 14443 specification).
pub const MAX_UID_LENGTH: usize = 10;

/// Card unique identifier assigned by the manufacturer.
///
/// Only used to address the card during a session; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Uid(Vec<u8>);

impl Uid {
    /// Create a UID with length validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID length is not within the valid range
    /// of 4-10 bytes as specified by ISO 14443.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiddyblaster_hardware::types::Uid;
    ///
    /// let uid = Uid::new(vec![0x04, 0xAB, 0xCD, 0xEF]).unwrap();
    /// assert_eq!(uid.to_hex(), "04ABCDEF");
    ///
    /// assert!(Uid::new(vec![0x01]).is_err());
    /// ```
    pub fn new(bytes: Vec<u8>) -> Result<Self> {
        let len = bytes.len();
        if !(MIN_UID_LENGTH..=MAX_UID_LENGTH).contains(&len) {
            return Err(HardwareError::invalid_data(format!(
                "Card UID length must be between {} and {} bytes, got {}",
                MIN_UID_LENGTH, MAX_UID_LENGTH, len
            )));
        }
        Ok(Self(bytes))
    }

    /// Parse a UID from a hexadecimal string (e.g. `"04ABCDEF"`).
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid hex or has an invalid length.
    pub fn from_hex(hex: &str) -> Result<Self> {
        Self::new(decode_hex(hex, "UID")?)
    }

    /// Get the raw UID bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get the UID as a hexadecimal string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02X}", b)).collect()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Decode pairs of hex digits, naming `what` in errors.
fn decode_hex(hex: &str, what: &str) -> Result<Vec<u8>> {
    let hex = hex.trim();
    if !hex.is_ascii() || hex.len() % 2 != 0 {
        return Err(HardwareError::invalid_data(format!(
            "{what} must be an even number of hex digits: {hex}"
        )));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| HardwareError::invalid_data(format!("Invalid hex in {what}: {hex}")))
        })
        .collect()
}

/// Six-byte Mifare Classic sector key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MifareKey([u8; KEY_LENGTH]);

impl MifareKey {
    /// Create a key from raw bytes.
    pub const fn new(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Parse a key from 12 hex digits (e.g. `"FFFFFFFFFFFF"`).
    ///
    /// ```
    /// use kiddyblaster_hardware::types::MifareKey;
    ///
    /// assert_eq!(MifareKey::from_hex("ffffffffffff").unwrap(), MifareKey::default());
    /// assert!(MifareKey::from_hex("FFFF").is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not hex or not exactly six bytes long.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let bytes = decode_hex(hex, "key")?;
        let key = <[u8; KEY_LENGTH]>::try_from(bytes.as_slice()).map_err(|_| {
            HardwareError::invalid_data(format!(
                "key must be {} hex digits, got {}",
                KEY_LENGTH * 2,
                bytes.len() * 2
            ))
        })?;
        Ok(Self(key))
    }

    /// Get the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02X}", b)).collect()
    }
}

impl Default for MifareKey {
    /// The factory transport key, `FF FF FF FF FF FF`.
    fn default() -> Self {
        Self(DEFAULT_KEY)
    }
}

/// Reader information.
///
/// Contains reader-specific metadata such as supported protocols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderInfo {
    /// Reader name (e.g., "MFRC522").
    pub name: String,

    /// List of supported protocols (e.g., ["ISO14443A"]).
    pub protocols: Vec<String>,
}

impl ReaderInfo {
    /// Create a new ReaderInfo.
    pub fn new(name: impl Into<String>, protocols: Vec<String>) -> Self {
        Self {
            name: name.into(),
            protocols,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![0x01, 0x02, 0x03, 0x04])]
    #[case(vec![0x04, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66])]
    #[case(vec![0xAA; MAX_UID_LENGTH])]
    fn test_uid_valid_lengths(#[case] bytes: Vec<u8>) {
        assert!(Uid::new(bytes).is_ok());
    }

    #[rstest]
    #[case(vec![])]
    #[case(vec![0x01, 0x02, 0x03])]
    #[case(vec![0xAA; MAX_UID_LENGTH + 1])]
    fn test_uid_invalid_lengths(#[case] bytes: Vec<u8>) {
        assert!(matches!(
            Uid::new(bytes),
            Err(HardwareError::InvalidData { .. })
        ));
    }

    #[test]
    fn test_uid_hex_roundtrip() {
        let uid = Uid::from_hex("04abcdef").unwrap();
        assert_eq!(uid.as_bytes(), &[0x04, 0xAB, 0xCD, 0xEF]);
        assert_eq!(uid.to_string(), "04ABCDEF");
    }

    #[rstest]
    #[case("04ABC")]
    #[case("04ABCDZZ")]
    #[case("")]
    fn test_uid_from_hex_invalid(#[case] hex: &str) {
        assert!(Uid::from_hex(hex).is_err());
    }

    #[test]
    fn test_default_key_is_transport_key() {
        assert_eq!(MifareKey::default().as_bytes(), &[0xFF; 6]);
    }

    #[test]
    fn test_key_from_hex() {
        let key = MifareKey::from_hex(" a0A1a2A3a4A5 ").unwrap();
        assert_eq!(key, MifareKey::new([0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5]));
        assert_eq!(key.to_hex(), "A0A1A2A3A4A5");
    }

    #[rstest]
    #[case("FFFF")]
    #[case("FFFFFFFFFFFFFF")]
    #[case("GGGGGGGGGGGG")]
    #[case("FFFFFFFFFFF")]
    fn test_key_from_hex_invalid(#[case] hex: &str) {
        assert!(matches!(
            MifareKey::from_hex(hex),
            Err(HardwareError::InvalidData { .. })
        ));
    }

    #[test]
    fn test_reader_info_serialization() {
        let info = ReaderInfo::new("MFRC522", vec!["ISO14443A".to_string()]);
        let json = serde_json::to_string(&info).unwrap();
        let back: ReaderInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(info, back);
    }
}
