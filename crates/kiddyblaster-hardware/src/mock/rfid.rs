//! Mock RFID reader implementation for testing and development.
//!
//! This module provides a simulated MFRC522-style reader with an in-memory
//! card database. Cards can be placed on and lifted off the reader through a
//! [`MockReaderHandle`], failures can be scripted, and every call the driver
//! makes is recorded so tests can assert on the exact hardware traffic.

use crate::{
    HardwareError, Result,
    traits::ReaderDevice,
    types::{MifareKey, ReaderInfo, Uid},
};
use kiddyblaster_core::{CardId, constants::BLOCK_SIZE};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// SAK answered by a Mifare Classic 1K on select.
const MIFARE_1K_SAK: u8 = 0x08;

/// Number of most recent calls kept in the call log.
pub const MAX_CALL_LOG: usize = 256;

/// A call made against the mock reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderCall {
    Reset,
    DetectCard,
    ReadUid,
    SelectCard,
    Authenticate(u8),
    ReadBlock(u8),
    WriteBlock(u8),
    StopSession,
}

/// A card known to the mock reader.
///
/// Blocks that were never written read back as zeros, like a factory-fresh card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCard {
    /// Card UID.
    pub uid: Uid,

    /// Key A of every sector.
    pub key: MifareKey,

    /// Written blocks.
    pub blocks: HashMap<u8, [u8; BLOCK_SIZE]>,
}

impl MockCard {
    /// A factory-blank card with the transport key.
    pub fn blank(uid: Uid) -> Self {
        Self {
            uid,
            key: MifareKey::default(),
            blocks: HashMap::new(),
        }
    }

    /// A card that already carries `id` in `block`.
    pub fn with_id(uid: Uid, block: u8, id: CardId) -> Self {
        let mut card = Self::blank(uid);
        card.blocks.insert(block, id.to_block());
        card
    }

    /// Replace the sector key.
    pub fn with_key(mut self, key: MifareKey) -> Self {
        self.key = key;
        self
    }

    /// Read a block as stored on the card.
    pub fn block(&self, block: u8) -> [u8; BLOCK_SIZE] {
        self.blocks.get(&block).copied().unwrap_or([0; BLOCK_SIZE])
    }
}

#[derive(Debug, Default)]
struct MockState {
    cards: HashMap<Uid, MockCard>,
    present: Option<Uid>,
    selected: Option<Uid>,
    authenticated_sector: Option<u8>,
    failing_uid_reads: u32,
    failing_writes: u32,
    calls: VecDeque<ReaderCall>,
    call_count: usize,
    poll_count: usize,
}

impl MockState {
    fn record(&mut self, call: ReaderCall) {
        if self.calls.len() >= MAX_CALL_LOG {
            self.calls.pop_front();
        }
        self.calls.push_back(call);
        self.call_count += 1;
        if call == ReaderCall::DetectCard {
            self.poll_count += 1;
        }
    }

    fn authenticated_card(&mut self, block: u8) -> Option<&mut MockCard> {
        if self.authenticated_sector != Some(sector_of(block)) {
            return None;
        }
        let uid = self.selected.as_ref()?;
        self.cards.get_mut(uid)
    }
}

fn sector_of(block: u8) -> u8 {
    block / 4
}

/// Mock RFID reader for testing and development.
///
/// # Examples
///
/// ```
/// use kiddyblaster_hardware::mock::{MockCard, MockReader};
/// use kiddyblaster_hardware::traits::ReaderDevice;
/// use kiddyblaster_hardware::types::Uid;
///
/// let (mut reader, handle) = MockReader::new();
///
/// let uid = Uid::new(vec![0x04, 0xAB, 0xCD, 0xEF]).unwrap();
/// handle.insert_card(MockCard::blank(uid.clone()));
/// handle.present(&uid).unwrap();
///
/// assert!(reader.detect_card().unwrap());
/// assert_eq!(reader.read_uid().unwrap(), uid);
/// ```
#[derive(Debug)]
pub struct MockReader {
    state: Arc<Mutex<MockState>>,
    name: String,
}

impl MockReader {
    /// Create a new mock reader with the default name.
    ///
    /// Returns a tuple of (MockReader, MockReaderHandle) where the handle
    /// can be used to simulate card presentations.
    pub fn new() -> (Self, MockReaderHandle) {
        Self::with_name("Mock MFRC522")
    }

    /// Create a new mock reader with a custom name.
    pub fn with_name(name: impl Into<String>) -> (Self, MockReaderHandle) {
        let state = Arc::new(Mutex::new(MockState::default()));
        let reader = Self {
            state: Arc::clone(&state),
            name: name.into(),
        };
        (reader, MockReaderHandle { state })
    }

    fn state(&self) -> Result<MutexGuard<'_, MockState>> {
        self.state
            .lock()
            .map_err(|_| HardwareError::disconnected(self.name.clone()))
    }
}

impl ReaderDevice for MockReader {
    fn info(&self) -> ReaderInfo {
        ReaderInfo::new(self.name.clone(), vec!["ISO14443A".to_string()])
    }

    fn reset(&mut self) -> Result<()> {
        let mut state = self.state()?;
        state.record(ReaderCall::Reset);
        state.selected = None;
        Ok(())
    }

    fn detect_card(&mut self) -> Result<bool> {
        let mut state = self.state()?;
        state.record(ReaderCall::DetectCard);
        Ok(state.present.is_some())
    }

    fn read_uid(&mut self) -> Result<Uid> {
        let mut state = self.state()?;
        state.record(ReaderCall::ReadUid);
        if state.failing_uid_reads > 0 {
            state.failing_uid_reads -= 1;
            return Err(HardwareError::UidReadFailed);
        }
        state.present.clone().ok_or(HardwareError::UidReadFailed)
    }

    fn select_card(&mut self, uid: &Uid) -> Result<u8> {
        let mut state = self.state()?;
        state.record(ReaderCall::SelectCard);
        if state.present.as_ref() != Some(uid) {
            return Err(HardwareError::communication(format!(
                "Card {uid} did not answer select"
            )));
        }
        state.selected = Some(uid.clone());
        Ok(MIFARE_1K_SAK)
    }

    fn authenticate(&mut self, block: u8, key: &MifareKey, uid: &Uid) -> Result<()> {
        let mut state = self.state()?;
        state.record(ReaderCall::Authenticate(block));
        let accepted = state.selected.as_ref() == Some(uid)
            && state.cards.get(uid).is_some_and(|card| card.key == *key);
        if !accepted {
            return Err(HardwareError::authentication(block));
        }
        state.authenticated_sector = Some(sector_of(block));
        Ok(())
    }

    fn read_block(&mut self, block: u8) -> Result<[u8; BLOCK_SIZE]> {
        let mut state = self.state()?;
        state.record(ReaderCall::ReadBlock(block));
        state
            .authenticated_card(block)
            .map(|card| card.block(block))
            .ok_or_else(|| HardwareError::block_read(block, "sector not authenticated"))
    }

    fn write_block(&mut self, block: u8, data: &[u8; BLOCK_SIZE]) -> Result<()> {
        let mut state = self.state()?;
        state.record(ReaderCall::WriteBlock(block));
        if state.failing_writes > 0 {
            state.failing_writes -= 1;
            return Err(HardwareError::write_failed(block, "card did not acknowledge"));
        }
        let card = state
            .authenticated_card(block)
            .ok_or_else(|| HardwareError::write_failed(block, "sector not authenticated"))?;
        card.blocks.insert(block, *data);
        Ok(())
    }

    fn stop_session(&mut self) {
        if let Ok(mut state) = self.state() {
            state.record(ReaderCall::StopSession);
            state.authenticated_sector = None;
        }
    }
}

/// Handle for controlling a mock RFID reader.
///
/// Cloning the handle shares the same reader state.
#[derive(Debug, Clone)]
pub struct MockReaderHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockReaderHandle {
    fn state(&self) -> MutexGuard<'_, MockState> {
        // A panic while holding the lock only happens inside a failing test.
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Add a card to the reader's database (replacing one with the same UID).
    pub fn insert_card(&self, card: MockCard) {
        self.state().cards.insert(card.uid.clone(), card);
    }

    /// Place a known card on the reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the card UID is not in the database.
    pub fn present(&self, uid: &Uid) -> Result<()> {
        let mut state = self.state();
        if !state.cards.contains_key(uid) {
            return Err(HardwareError::invalid_data(format!(
                "Card {uid} not in database"
            )));
        }
        state.present = Some(uid.clone());
        Ok(())
    }

    /// Lift the current card off the reader.
    pub fn remove(&self) {
        let mut state = self.state();
        state.present = None;
        state.selected = None;
    }

    /// UID of the card currently on the reader, if any.
    pub fn present_uid(&self) -> Option<Uid> {
        self.state().present.clone()
    }

    /// Snapshot of a card in the database.
    pub fn card(&self, uid: &Uid) -> Option<MockCard> {
        self.state().cards.get(uid).cloned()
    }

    /// Make the next `count` UID reads fail.
    pub fn fail_uid_reads(&self, count: u32) {
        self.state().failing_uid_reads = count;
    }

    /// Make the next `count` block writes fail.
    pub fn fail_writes(&self, count: u32) {
        self.state().failing_writes = count;
    }

    /// The most recent calls, oldest first, at most [`MAX_CALL_LOG`].
    pub fn calls(&self) -> Vec<ReaderCall> {
        self.state().calls.iter().copied().collect()
    }

    /// Number of calls made so far, including those dropped from the log.
    pub fn call_count(&self) -> usize {
        self.state().call_count
    }

    /// Number of polls (card detections) made so far.
    pub fn poll_count(&self) -> usize {
        self.state().poll_count
    }

    /// Forget recorded calls and reset the counters.
    pub fn clear_calls(&self) {
        let mut state = self.state();
        state.calls.clear();
        state.call_count = 0;
        state.poll_count = 0;
    }

    /// Returns `true` while an authenticated session is open.
    pub fn is_session_open(&self) -> bool {
        self.state().authenticated_sector.is_some()
    }
}
