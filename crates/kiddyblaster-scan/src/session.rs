//! Scan session state machine.
//!
//! A [`ScanSession`] drives repeated driver attempts ("ticks") until one of
//! them settles the session:
//!
//! ```text
//! Idle ─► Polling ─┬─► Resolved   (a card answered with an identifier)
//!                  ├─► Failed     (UID, authentication or reader fault)
//!                  ├─► TimedOut   (deadline passed before the next tick)
//!                  └─► Cancelled  (owner cancelled the session)
//! ```
//!
//! The deadline is checked at the top of every tick, before the reader is
//! touched, so no tick starts at or after it. Between ticks the session
//! sleeps one poll interval; the sleep races the cancellation token.
//!
//! Sessions are single-use. A failed read ends its session and the next
//! attempt starts a new one with a fresh deadline.

use crate::error::ScanError;
use kiddyblaster_hardware::CardOutcome;
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Maximum number of state transitions to keep in history.
const MAX_HISTORY_SIZE: usize = 16;

/// States of a scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanState {
    /// Created, no tick issued yet.
    Idle,

    /// Ticking on the poll interval.
    Polling,

    /// A card answered with an identifier.
    Resolved,

    /// The card or the reader failed.
    Failed,

    /// The deadline passed.
    TimedOut,

    /// The owner cancelled the session.
    Cancelled,
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            ScanState::Idle => "Idle",
            ScanState::Polling => "Polling",
            ScanState::Resolved => "Resolved",
            ScanState::Failed => "Failed",
            ScanState::TimedOut => "TimedOut",
            ScanState::Cancelled => "Cancelled",
        };
        write!(f, "{}", state_str)
    }
}

impl ScanState {
    /// Check if transition to target state is valid from this state.
    ///
    /// ```
    /// use kiddyblaster_scan::ScanState;
    ///
    /// assert!(ScanState::Idle.can_transition_to(&ScanState::Polling));
    /// assert!(!ScanState::Resolved.can_transition_to(&ScanState::Polling));
    /// ```
    pub fn can_transition_to(&self, target: &ScanState) -> bool {
        matches!(
            (self, target),
            (ScanState::Idle, ScanState::Polling | ScanState::Cancelled)
                | (
                    ScanState::Polling,
                    ScanState::Resolved
                        | ScanState::Failed
                        | ScanState::TimedOut
                        | ScanState::Cancelled
                )
        )
    }

    /// Returns `true` once the session can no longer change.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanState::Resolved | ScanState::Failed | ScanState::TimedOut | ScanState::Cancelled
        )
    }
}

/// A recorded state change.
#[derive(Debug, Clone, Copy)]
pub struct StateTransition {
    pub from: ScanState,
    pub to: ScanState,
    /// Time since the session started.
    pub at: Duration,
}

/// One bounded or unbounded attempt to obtain a result from the card in the field.
#[derive(Debug)]
pub struct ScanSession {
    started_at: Instant,
    timeout: Option<Duration>,
    state: ScanState,
    ticks: u32,
    history: VecDeque<StateTransition>,
}

impl ScanSession {
    /// Create a session. `None` means no deadline.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            started_at: Instant::now(),
            timeout,
            state: ScanState::Idle,
            ticks: 0,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Number of ticks issued so far.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn history(&self) -> impl Iterator<Item = &StateTransition> {
        self.history.iter()
    }

    fn expired_timeout(&self) -> Option<Duration> {
        self.timeout
            .filter(|timeout| self.started_at.elapsed() >= *timeout)
    }

    fn enter(&mut self, target: ScanState) {
        debug_assert!(
            self.state.can_transition_to(&target),
            "invalid scan transition {} -> {}",
            self.state,
            target
        );

        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(StateTransition {
            from: self.state,
            to: target,
            at: self.elapsed(),
        });
        self.state = target;
    }

    fn fail(&mut self, error: ScanError) -> ScanError {
        self.enter(ScanState::Failed);
        debug!(ticks = self.ticks, error = %error, "scan session failed");
        error
    }

    /// Tick until the session settles.
    ///
    /// `tick` is one driver attempt. [`CardOutcome::NoCard`] keeps the
    /// session polling; every other outcome ends it.
    ///
    /// # Errors
    ///
    /// [`ScanError::Timeout`] once the deadline passes, [`ScanError::Cancelled`]
    /// when `cancel` fires, and the failure of the settling tick otherwise.
    pub async fn run<T, F>(
        &mut self,
        interval: Duration,
        cancel: &CancellationToken,
        mut tick: F,
    ) -> Result<T, ScanError>
    where
        F: FnMut() -> CardOutcome<T>,
    {
        // A settled session cannot be rerun.
        if self.state != ScanState::Idle {
            return Err(ScanError::Cancelled);
        }
        if cancel.is_cancelled() {
            self.enter(ScanState::Cancelled);
            return Err(ScanError::Cancelled);
        }
        self.enter(ScanState::Polling);

        loop {
            if cancel.is_cancelled() {
                self.enter(ScanState::Cancelled);
                return Err(ScanError::Cancelled);
            }
            if let Some(after) = self.expired_timeout() {
                self.enter(ScanState::TimedOut);
                return Err(ScanError::Timeout { after });
            }

            self.ticks += 1;
            match tick() {
                CardOutcome::Complete(value) => {
                    self.enter(ScanState::Resolved);
                    debug!(ticks = self.ticks, "scan session resolved");
                    return Ok(value);
                }
                CardOutcome::NoCard => {}
                CardOutcome::UidReadFailed => return Err(self.fail(ScanError::UidReadFailed)),
                CardOutcome::AuthenticationFailed => {
                    return Err(self.fail(ScanError::AuthenticationFailed));
                }
                CardOutcome::Fault(e) => return Err(self.fail(ScanError::Hardware(e))),
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.enter(ScanState::Cancelled);
                    return Err(ScanError::Cancelled);
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }
}
