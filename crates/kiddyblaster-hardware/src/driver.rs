//! Card protocol driver.
//!
//! Drives a [`ReaderDevice`] through the fixed sequence needed to read or
//! store a [`CardId`] in the data block of a Mifare Classic card:
//!
//! ```text
//! reset ─► detect ─► read UID ─► select ─► authenticate ─► read/write ─► stop crypto
//!            │           │                      │
//!            ▼           ▼                      ▼
//!         NoCard   UidReadFailed      AuthenticationFailed
//! ```
//!
//! Every failing step ends the sequence with a typed [`CardOutcome`]. Once
//! authentication has been attempted, the encrypted session is closed on
//! every exit path by a scoped guard; a session left open blocks all
//! subsequent reads.
//!
//! The driver performs exactly one attempt. Retrying is the scan loop's
//! decision.

use crate::error::{HardwareError, Result};
use crate::traits::ReaderDevice;
use crate::types::{MifareKey, Uid};
use kiddyblaster_core::CardId;
use kiddyblaster_core::constants::DATA_BLOCK;
use tracing::trace;

/// Outcome of a single driver attempt.
#[derive(Debug)]
#[must_use]
pub enum CardOutcome<T> {
    /// The operation completed on a card.
    Complete(T),

    /// No card in the field. Not an error.
    NoCard,

    /// A card answered but its UID could not be read.
    UidReadFailed,

    /// The data block's sector rejected the key.
    AuthenticationFailed,

    /// Any other transport or card fault (select, block read, write).
    Fault(HardwareError),
}

impl<T> CardOutcome<T> {
    fn from_error(error: HardwareError) -> Self {
        match error {
            HardwareError::UidReadFailed => Self::UidReadFailed,
            HardwareError::AuthenticationFailed { .. } => Self::AuthenticationFailed,
            other => Self::Fault(other),
        }
    }

    /// Returns `true` for the no-card outcome.
    pub fn is_no_card(&self) -> bool {
        matches!(self, Self::NoCard)
    }

    /// Get the completed value, if any.
    pub fn complete(self) -> Option<T> {
        match self {
            Self::Complete(value) => Some(value),
            _ => None,
        }
    }
}

/// Result of [`CardProtocol::read_id`].
pub type ScanResult = CardOutcome<CardId>;

/// Result of [`CardProtocol::write_id`].
pub type WriteResult = CardOutcome<()>;

/// Card protocol parameters: which block holds the identifier and which key opens it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardProtocol {
    block: u8,
    key: MifareKey,
}

impl Default for CardProtocol {
    fn default() -> Self {
        Self::new(DATA_BLOCK, MifareKey::default())
    }
}

impl CardProtocol {
    /// Create a driver for the given block and key.
    pub fn new(block: u8, key: MifareKey) -> Self {
        Self { block, key }
    }

    /// Block holding the identifier.
    pub fn block(&self) -> u8 {
        self.block
    }

    /// Read the identifier stored on the card in the field.
    ///
    /// # Examples
    ///
    /// ```
    /// use kiddyblaster_core::CardId;
    /// use kiddyblaster_hardware::driver::CardProtocol;
    /// use kiddyblaster_hardware::mock::{MockCard, MockReader};
    /// use kiddyblaster_hardware::types::Uid;
    ///
    /// let (mut reader, handle) = MockReader::new();
    /// let uid = Uid::new(vec![0x01, 0x02, 0x03, 0x04]).unwrap();
    /// handle.insert_card(MockCard::with_id(uid.clone(), 8, CardId::new(7)));
    /// handle.present(&uid).unwrap();
    ///
    /// let protocol = CardProtocol::default();
    /// assert_eq!(protocol.read_id(&mut reader).complete(), Some(CardId::new(7)));
    /// ```
    pub fn read_id<R: ReaderDevice + ?Sized>(&self, device: &mut R) -> ScanResult {
        let block = self.block;
        self.attempt(device, |device| {
            let data = device.read_block(block)?;
            CardId::from_block(&data).map_err(|e| HardwareError::block_read(block, e.to_string()))
        })
    }

    /// Store `id` on the card in the field.
    ///
    /// Completes only if the block write itself is acknowledged.
    pub fn write_id<R: ReaderDevice + ?Sized>(&self, device: &mut R, id: CardId) -> WriteResult {
        let block = self.block;
        let data = id.to_block();
        self.attempt(device, |device| device.write_block(block, &data))
    }

    fn attempt<R, T>(&self, device: &mut R, op: impl FnOnce(&mut R) -> Result<T>) -> CardOutcome<T>
    where
        R: ReaderDevice + ?Sized,
    {
        if let Err(e) = device.reset() {
            return CardOutcome::Fault(e);
        }

        match device.detect_card() {
            Ok(true) => {}
            Ok(false) => return CardOutcome::NoCard,
            Err(e) => return CardOutcome::Fault(e),
        }

        let uid = match device.read_uid() {
            Ok(uid) => uid,
            Err(e) => return CardOutcome::from_error(e),
        };

        let capacity = match device.select_card(&uid) {
            Ok(capacity) => capacity,
            Err(e) => return CardOutcome::from_error(e),
        };
        trace!(uid = %uid, capacity, "card selected");

        let session = CryptoSession::open(device);
        match session.run(self.block, &self.key, &uid, op) {
            Ok(value) => CardOutcome::Complete(value),
            Err(e) => CardOutcome::from_error(e),
        }
    }
}

/// Scoped authenticated session; stops crypto when dropped.
struct CryptoSession<'a, R: ReaderDevice + ?Sized> {
    device: &'a mut R,
}

impl<'a, R: ReaderDevice + ?Sized> CryptoSession<'a, R> {
    fn open(device: &'a mut R) -> Self {
        Self { device }
    }

    fn run<T>(
        mut self,
        block: u8,
        key: &MifareKey,
        uid: &Uid,
        op: impl FnOnce(&mut R) -> Result<T>,
    ) -> Result<T> {
        self.device.authenticate(block, key, uid)?;
        op(&mut *self.device)
    }
}

impl<R: ReaderDevice + ?Sized> Drop for CryptoSession<'_, R> {
    fn drop(&mut self) {
        self.device.stop_session();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockCard, MockReader, MockReaderHandle, ReaderCall};
    use proptest::prelude::*;

    fn uid() -> Uid {
        Uid::new(vec![0x04, 0x11, 0x22, 0x33]).unwrap()
    }

    fn reader_with(card: MockCard) -> (MockReader, MockReaderHandle) {
        let (reader, handle) = MockReader::new();
        let card_uid = card.uid.clone();
        handle.insert_card(card);
        handle.present(&card_uid).unwrap();
        (reader, handle)
    }

    #[test]
    fn test_read_id_no_card() {
        let (mut reader, handle) = MockReader::new();

        assert!(CardProtocol::default().read_id(&mut reader).is_no_card());
        assert_eq!(handle.calls(), vec![ReaderCall::Reset, ReaderCall::DetectCard]);
    }

    #[test]
    fn test_read_id_full_sequence() {
        let (mut reader, handle) = reader_with(MockCard::with_id(uid(), 8, CardId::new(300)));

        let outcome = CardProtocol::default().read_id(&mut reader);
        assert_eq!(outcome.complete(), Some(CardId::new(300)));
        assert_eq!(
            handle.calls(),
            vec![
                ReaderCall::Reset,
                ReaderCall::DetectCard,
                ReaderCall::ReadUid,
                ReaderCall::SelectCard,
                ReaderCall::Authenticate(8),
                ReaderCall::ReadBlock(8),
                ReaderCall::StopSession,
            ]
        );
        assert!(!handle.is_session_open());
    }

    #[test]
    fn test_read_id_blank_card_is_unprovisioned() {
        let (mut reader, _handle) = reader_with(MockCard::blank(uid()));

        let id = CardProtocol::default().read_id(&mut reader).complete().unwrap();
        assert!(id.is_unprovisioned());
    }

    #[test]
    fn test_read_id_uid_failure() {
        let (mut reader, handle) = reader_with(MockCard::blank(uid()));
        handle.fail_uid_reads(1);

        let outcome = CardProtocol::default().read_id(&mut reader);
        assert!(matches!(outcome, CardOutcome::UidReadFailed));
        assert!(!handle.calls().contains(&ReaderCall::Authenticate(8)));
    }

    #[test]
    fn test_read_id_authentication_failure_closes_session() {
        let key = MifareKey::new([0x01; 6]);
        let (mut reader, handle) = reader_with(MockCard::blank(uid()).with_key(key));

        let outcome = CardProtocol::default().read_id(&mut reader);
        assert!(matches!(outcome, CardOutcome::AuthenticationFailed));
        assert_eq!(handle.calls().last(), Some(&ReaderCall::StopSession));
        assert!(!handle.calls().contains(&ReaderCall::ReadBlock(8)));
    }

    #[test]
    fn test_read_id_with_custom_key() {
        let key = MifareKey::new([0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5]);
        let (mut reader, _handle) =
            reader_with(MockCard::with_id(uid(), 8, CardId::new(5)).with_key(key));

        let protocol = CardProtocol::new(8, key);
        assert_eq!(protocol.read_id(&mut reader).complete(), Some(CardId::new(5)));
    }

    #[test]
    fn test_write_id_layout() {
        let (mut reader, handle) = reader_with(MockCard::blank(uid()));

        let outcome = CardProtocol::default().write_id(&mut reader, CardId::new(0x0102));
        assert!(matches!(outcome, CardOutcome::Complete(())));

        let block = handle.card(&uid()).unwrap().block(8);
        assert_eq!(block[0], 0x02);
        assert_eq!(block[1], 0x01);
        assert!(block[2..].iter().all(|b| *b == 0xFF));
        assert!(!handle.is_session_open());
    }

    #[test]
    fn test_write_id_rejected_write_is_fault() {
        let (mut reader, handle) = reader_with(MockCard::blank(uid()));
        handle.fail_writes(1);

        let outcome = CardProtocol::default().write_id(&mut reader, CardId::new(9));
        assert!(matches!(
            outcome,
            CardOutcome::Fault(HardwareError::WriteFailed { block: 8, .. })
        ));
        assert!(!handle.is_session_open());
        assert!(handle.card(&uid()).unwrap().block(8).iter().all(|b| *b == 0));
    }

    #[test]
    fn test_select_failure_is_fault() {
        struct Flaky(MockReader);
        impl ReaderDevice for Flaky {
            fn info(&self) -> crate::types::ReaderInfo {
                self.0.info()
            }
            fn reset(&mut self) -> Result<()> {
                self.0.reset()
            }
            fn detect_card(&mut self) -> Result<bool> {
                self.0.detect_card()
            }
            fn read_uid(&mut self) -> Result<Uid> {
                self.0.read_uid()
            }
            fn select_card(&mut self, _uid: &Uid) -> Result<u8> {
                Err(HardwareError::communication("collision"))
            }
            fn authenticate(&mut self, block: u8, key: &MifareKey, uid: &Uid) -> Result<()> {
                self.0.authenticate(block, key, uid)
            }
            fn read_block(&mut self, block: u8) -> Result<[u8; 16]> {
                self.0.read_block(block)
            }
            fn write_block(&mut self, block: u8, data: &[u8; 16]) -> Result<()> {
                self.0.write_block(block, data)
            }
            fn stop_session(&mut self) {
                self.0.stop_session();
            }
        }

        let (reader, handle) = reader_with(MockCard::blank(uid()));
        let mut flaky = Flaky(reader);

        let outcome = CardProtocol::default().read_id(&mut flaky);
        assert!(matches!(
            outcome,
            CardOutcome::Fault(HardwareError::CommunicationError { .. })
        ));
        assert!(!handle.calls().contains(&ReaderCall::Authenticate(8)));
    }

    #[test]
    fn test_boxed_reader_is_a_reader() {
        let (reader, handle) = reader_with(MockCard::with_id(uid(), 8, CardId::new(12)));
        let mut boxed: Box<dyn ReaderDevice> = Box::new(reader);

        assert_eq!(
            CardProtocol::default().read_id(&mut boxed).complete(),
            Some(CardId::new(12))
        );
        assert!(!handle.is_session_open());
    }

    proptest! {
        /// Property: any identifier written to a card reads back unchanged.
        #[test]
        fn prop_write_then_read_roundtrip(id in any::<u16>()) {
            let (mut reader, _handle) = reader_with(MockCard::blank(uid()));
            let protocol = CardProtocol::default();

            let written = protocol.write_id(&mut reader, CardId::new(id));
            prop_assert!(matches!(written, CardOutcome::Complete(())));
            prop_assert_eq!(protocol.read_id(&mut reader).complete(), Some(CardId::new(id)));
        }
    }
}
