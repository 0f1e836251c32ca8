//! Reader device trait definition.
//!
//! This module defines the contract between the card protocol driver and a
//! physical (or simulated) RFID transceiver. The operations mirror the
//! register-level primitives an MFRC522-class reader exposes; sequencing
//! them into a complete read or write is the job of
//! [`CardProtocol`](crate::driver::CardProtocol).
//!
//! Every operation is a short synchronous exchange over the reader's bus.
//! Callers poll on a timer and never hold the reader across an await point
//! inside a single operation.

use crate::error::Result;
use crate::types::{MifareKey, ReaderInfo, Uid};
use kiddyblaster_core::constants::BLOCK_SIZE;

/// RFID reader capability surface.
///
/// Implementations must be `Send` so a reader can live behind a
/// [`SharedReader`](crate::lease::SharedReader) and be driven from Tokio
/// tasks. The trait is object-safe; `Box<dyn ReaderDevice>` is a reader too.
///
/// # Examples
///
/// ```
/// use kiddyblaster_hardware::traits::ReaderDevice;
/// use kiddyblaster_hardware::error::Result;
///
/// fn card_in_field<R: ReaderDevice>(reader: &mut R) -> Result<bool> {
///     reader.reset()?;
///     reader.detect_card()
/// }
/// ```
pub trait ReaderDevice: Send {
    /// Get reader metadata.
    fn info(&self) -> ReaderInfo;

    /// Reset the transceiver, clearing state left over from a failed session.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be reached.
    fn reset(&mut self) -> Result<()>;

    /// Check whether a card is present in the field.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be reached.
    fn detect_card(&mut self) -> Result<bool>;

    /// Run anticollision and read the UID of the card in the field.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::UidReadFailed`](crate::HardwareError::UidReadFailed)
    /// if the UID cannot be read.
    fn read_uid(&mut self) -> Result<Uid>;

    /// Select the card with the given UID, returning its declared memory capacity.
    ///
    /// # Errors
    ///
    /// Returns an error if the card does not answer the select.
    fn select_card(&mut self, uid: &Uid) -> Result<u8>;

    /// Authenticate the sector containing `block` with key A.
    ///
    /// Opens an encrypted session that must be closed with
    /// [`stop_session`](Self::stop_session).
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::AuthenticationFailed`](crate::HardwareError::AuthenticationFailed)
    /// if the card rejects the key.
    fn authenticate(&mut self, block: u8, key: &MifareKey, uid: &Uid) -> Result<()>;

    /// Read a 16-byte block from the authenticated sector.
    ///
    /// # Errors
    ///
    /// Returns an error if the block cannot be read.
    fn read_block(&mut self, block: u8) -> Result<[u8; BLOCK_SIZE]>;

    /// Write a 16-byte block into the authenticated sector.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::WriteFailed`](crate::HardwareError::WriteFailed)
    /// if the card does not acknowledge the write.
    fn write_block(&mut self, block: u8, data: &[u8; BLOCK_SIZE]) -> Result<()>;

    /// Close the encrypted session (stop crypto). Idempotent.
    fn stop_session(&mut self);
}

impl<D: ReaderDevice + ?Sized> ReaderDevice for Box<D> {
    fn info(&self) -> ReaderInfo {
        (**self).info()
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }

    fn detect_card(&mut self) -> Result<bool> {
        (**self).detect_card()
    }

    fn read_uid(&mut self) -> Result<Uid> {
        (**self).read_uid()
    }

    fn select_card(&mut self, uid: &Uid) -> Result<u8> {
        (**self).select_card(uid)
    }

    fn authenticate(&mut self, block: u8, key: &MifareKey, uid: &Uid) -> Result<()> {
        (**self).authenticate(block, key, uid)
    }

    fn read_block(&mut self, block: u8) -> Result<[u8; BLOCK_SIZE]> {
        (**self).read_block(block)
    }

    fn write_block(&mut self, block: u8, data: &[u8; BLOCK_SIZE]) -> Result<()> {
        (**self).write_block(block, data)
    }

    fn stop_session(&mut self) {
        (**self).stop_session();
    }
}
