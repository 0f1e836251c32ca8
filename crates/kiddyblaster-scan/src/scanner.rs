//! Scanner facade over the shared reader.
//!
//! [`Scanner`] owns the process's [`SharedReader`] together with the card
//! protocol and poll timing. Consumers check the reader out as a
//! [`ScanHandle`] and run scan or write sessions on it; the reader returns
//! to the pool when the handle is dropped.

use crate::error::ScanError;
use crate::session::ScanSession;
use kiddyblaster_core::CardId;
use kiddyblaster_core::constants::{
    DEFAULT_BUSY_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WRITE_TIMEOUT_SECS,
};
use kiddyblaster_hardware::{CardProtocol, ReaderDevice, ReaderLease, SharedReader};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Scan timing configuration.
///
/// # Examples
///
/// ```
/// use kiddyblaster_scan::ScanConfig;
/// use std::time::Duration;
///
/// let config = ScanConfig::default()
///     .with_poll_interval(Duration::from_millis(250))
///     .with_write_timeout(Duration::from_secs(30));
///
/// assert_eq!(config.poll_interval, Duration::from_millis(250));
/// assert_eq!(config.busy_timeout, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Pause between two ticks of a session.
    pub poll_interval: Duration,

    /// Deadline for a card to be presented during provisioning.
    pub write_timeout: Duration,

    /// How long a bounded operation waits for the reader.
    pub busy_timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            write_timeout: Duration::from_secs(DEFAULT_WRITE_TIMEOUT_SECS),
            busy_timeout: Duration::from_secs(DEFAULT_BUSY_TIMEOUT_SECS),
        }
    }
}

impl ScanConfig {
    /// Set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the provisioning deadline.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set how long to wait for a busy reader.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }
}

/// Entry point to the reader for every consumer in the process.
#[derive(Debug)]
pub struct Scanner<R> {
    reader: SharedReader<R>,
    protocol: CardProtocol,
    config: ScanConfig,
}

impl<R> Clone for Scanner<R> {
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
            protocol: self.protocol,
            config: self.config,
        }
    }
}

impl<R: ReaderDevice> Scanner<R> {
    /// Take ownership of a reader.
    pub fn new(device: R, protocol: CardProtocol, config: ScanConfig) -> Self {
        Self::with_shared(SharedReader::new(device), protocol, config)
    }

    /// Build a scanner on an existing shared reader.
    pub fn with_shared(
        reader: SharedReader<R>,
        protocol: CardProtocol,
        config: ScanConfig,
    ) -> Self {
        Self {
            reader,
            protocol,
            config,
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn protocol(&self) -> &CardProtocol {
        &self.protocol
    }

    pub fn reader(&self) -> &SharedReader<R> {
        &self.reader
    }

    /// Wait for the reader and check it out.
    pub async fn checkout(&self) -> ScanHandle<R> {
        let lease = self.reader.acquire().await;
        ScanHandle::new(lease, self.protocol, self.config.poll_interval)
    }

    /// Check the reader out, waiting at most the configured busy timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::ReaderBusy`] if the reader stays leased.
    pub async fn checkout_bounded(&self) -> Result<ScanHandle<R>, ScanError> {
        match self.reader.acquire_timeout(self.config.busy_timeout).await {
            Some(lease) => Ok(ScanHandle::new(lease, self.protocol, self.config.poll_interval)),
            None => {
                debug!(waited = ?self.config.busy_timeout, "reader busy");
                Err(ScanError::ReaderBusy)
            }
        }
    }

    /// Read one card within `timeout`, releasing the reader afterwards.
    ///
    /// # Errors
    ///
    /// See [`ScanHandle::scan`]; also [`ScanError::ReaderBusy`].
    pub async fn scan(&self, timeout: Duration) -> Result<CardId, ScanError> {
        let mut handle = self.checkout_bounded().await?;
        handle.scan(Some(timeout), &CancellationToken::new()).await
    }
}

/// Exclusive checkout of the reader for one consumer.
#[derive(Debug)]
pub struct ScanHandle<R> {
    lease: ReaderLease<R>,
    protocol: CardProtocol,
    interval: Duration,
}

impl<R: ReaderDevice> ScanHandle<R> {
    fn new(lease: ReaderLease<R>, protocol: CardProtocol, interval: Duration) -> Self {
        Self {
            lease,
            protocol,
            interval,
        }
    }

    /// Poll until a card answers with its identifier.
    ///
    /// `None` polls until a card appears or `cancel` fires.
    ///
    /// # Errors
    ///
    /// - [`ScanError::Timeout`] if no card appeared in time
    /// - [`ScanError::Cancelled`] if `cancel` fired
    /// - [`ScanError::UidReadFailed`], [`ScanError::AuthenticationFailed`] or
    ///   [`ScanError::Hardware`] if the card or reader failed
    pub async fn scan(
        &mut self,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<CardId, ScanError> {
        let protocol = self.protocol;
        let device = &mut *self.lease;

        let id = ScanSession::new(timeout)
            .run(self.interval, cancel, || protocol.read_id(&mut *device))
            .await?;
        info!(card_id = %id, "card detected");
        Ok(id)
    }

    /// Poll until a card is in the field and store `id` on it.
    ///
    /// A card lifted briefly does not fail the write; the session keeps
    /// polling until the deadline.
    ///
    /// # Errors
    ///
    /// As [`scan`](Self::scan). A rejected block write is
    /// [`ScanError::Hardware`].
    pub async fn write_id(
        &mut self,
        id: CardId,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<(), ScanError> {
        let protocol = self.protocol;
        let device = &mut *self.lease;

        ScanSession::new(timeout)
            .run(self.interval, cancel, || protocol.write_id(&mut *device, id))
            .await?;
        info!(card_id = %id, "card written");
        Ok(())
    }

    /// Direct access to the leased device.
    pub fn device(&mut self) -> &mut R {
        &mut self.lease
    }
}
