use crate::{
    Result,
    constants::{BLOCK_FILL, BLOCK_SIZE},
    error::Error,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier stored on a card (two bytes, little-endian, in the data block).
///
/// Once written, the identifier is the primary key of the registry entry the
/// card stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(u16);

impl CardId {
    /// Value decoded from a factory-blank data block.
    ///
    /// Registry identifiers start at 1, so a blank card never resolves to an entry.
    pub const UNPROVISIONED: CardId = CardId(0);

    /// Create a card identifier from its raw value.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        CardId(id)
    }

    /// Get the raw identifier.
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns `true` if the card has never been written.
    #[must_use]
    pub fn is_unprovisioned(&self) -> bool {
        *self == Self::UNPROVISIONED
    }

    /// Encode the identifier into a full data block.
    ///
    /// Byte 0 holds `id % 256`, byte 1 holds `id / 256`, the rest is fill.
    #[must_use]
    pub fn to_block(&self) -> [u8; BLOCK_SIZE] {
        let mut block = [BLOCK_FILL; BLOCK_SIZE];
        let [lo, hi] = self.0.to_le_bytes();
        block[0] = lo;
        block[1] = hi;
        block
    }

    /// Decode the identifier from a data block read off a card.
    ///
    /// # Errors
    /// Returns `Error::InvalidBlockLength` if the block is not exactly 16 bytes.
    pub fn from_block(block: &[u8]) -> Result<Self> {
        match block {
            [lo, hi, ..] if block.len() == BLOCK_SIZE => Ok(CardId(u16::from_le_bytes([*lo, *hi]))),
            _ => Err(Error::InvalidBlockLength {
                expected: BLOCK_SIZE,
                actual: block.len(),
            }),
        }
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for CardId {
    fn from(id: u16) -> Self {
        CardId(id)
    }
}

impl From<CardId> for i64 {
    fn from(id: CardId) -> Self {
        i64::from(id.0)
    }
}

impl TryFrom<i64> for CardId {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        u16::try_from(value)
            .map(CardId)
            .map_err(|_| Error::IdOutOfRange { value })
    }
}

impl std::str::FromStr for CardId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidId(s.to_string()))?;
        CardId::try_from(value)
    }
}

/// A card detection pushed to streaming consumers.
///
/// Serializes as `{"time": "...", "cardId": 7}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardEvent {
    /// Detection time, RFC 3339.
    pub time: String,

    /// Identifier read from the card.
    pub card_id: CardId,
}

impl CardEvent {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn now(card_id: CardId) -> Self {
        Self::at(Utc::now(), card_id)
    }

    /// Create an event stamped with the given time.
    #[must_use]
    pub fn at(time: DateTime<Utc>, card_id: CardId) -> Self {
        Self {
            time: time.to_rfc3339_opts(SecondsFormat::Millis, true),
            card_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(0, [0x00, 0x00])]
    #[case(7, [0x07, 0x00])]
    #[case(255, [0xFF, 0x00])]
    #[case(256, [0x00, 0x01])]
    #[case(65535, [0xFF, 0xFF])]
    fn test_card_id_block_layout(#[case] id: u16, #[case] head: [u8; 2]) {
        let block = CardId::new(id).to_block();
        assert_eq!(&block[..2], &head);
        assert!(block[2..].iter().all(|b| *b == BLOCK_FILL));
    }

    #[test]
    fn test_card_id_from_factory_block() {
        let blank = [0u8; BLOCK_SIZE];
        let id = CardId::from_block(&blank).unwrap();
        assert!(id.is_unprovisioned());
    }

    #[test]
    fn test_card_id_reads_both_bytes() {
        let mut block = [0u8; BLOCK_SIZE];
        block[0] = 0x2C;
        block[1] = 0x01;
        assert_eq!(CardId::from_block(&block).unwrap().as_u16(), 300);
    }

    #[rstest]
    #[case(0)]
    #[case(15)]
    #[case(17)]
    fn test_card_id_rejects_short_or_long_blocks(#[case] len: usize) {
        let block = vec![0u8; len];
        assert!(matches!(
            CardId::from_block(&block),
            Err(Error::InvalidBlockLength { .. })
        ));
    }

    #[rstest]
    #[case(1, true)]
    #[case(65535, true)]
    #[case(65536, false)]
    #[case(-1, false)]
    fn test_card_id_try_from_i64(#[case] value: i64, #[case] ok: bool) {
        assert_eq!(CardId::try_from(value).is_ok(), ok);
    }

    #[test]
    fn test_card_id_from_str() {
        assert_eq!("42".parse::<CardId>().unwrap(), CardId::new(42));
        assert!("abc".parse::<CardId>().is_err());
        assert!("70000".parse::<CardId>().is_err());
    }

    #[test]
    fn test_card_event_json_shape() {
        let time = Utc.with_ymd_and_hms(2025, 1, 15, 12, 30, 0).unwrap();
        let event = CardEvent::at(time, CardId::new(7));
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["cardId"], 7);
        assert_eq!(json["time"], "2025-01-15T12:30:00.000Z");
    }
}
