//! Exclusive ownership of the reader.
//!
//! There is one physical reader per process and at most one hardware session
//! may be in flight on it. The device is therefore only reachable through a
//! [`ReaderLease`]: an owned guard handed out by [`SharedReader`] to one
//! consumer at a time. Dropping the lease hands the reader to the next
//! waiting consumer.
//!
//! ```text
//! SSE stream ──┐                       ┌─► ReaderLease ─► CardProtocol ─► device
//!              ├─► SharedReader::acquire
//! provisioning ┘        (FIFO)
//! ```

use crate::traits::ReaderDevice;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Shareable handle to the single reader of this process.
#[derive(Debug)]
pub struct SharedReader<R> {
    inner: Arc<Mutex<R>>,
}

impl<R> Clone for SharedReader<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: ReaderDevice> SharedReader<R> {
    /// Take ownership of a reader device.
    pub fn new(device: R) -> Self {
        Self {
            inner: Arc::new(Mutex::new(device)),
        }
    }

    /// Wait until the reader is free and check it out.
    ///
    /// Waiters are served in the order they arrived.
    pub async fn acquire(&self) -> ReaderLease<R> {
        let guard = Arc::clone(&self.inner).lock_owned().await;
        debug!("reader lease acquired");
        ReaderLease { guard }
    }

    /// Check the reader out if nobody holds it.
    pub fn try_acquire(&self) -> Option<ReaderLease<R>> {
        Arc::clone(&self.inner)
            .try_lock_owned()
            .ok()
            .map(|guard| ReaderLease { guard })
    }

    /// Wait at most `timeout` for the reader.
    pub async fn acquire_timeout(&self, timeout: Duration) -> Option<ReaderLease<R>> {
        tokio::time::timeout(timeout, self.acquire()).await.ok()
    }

    /// Returns `true` if some consumer currently holds the reader.
    pub fn is_leased(&self) -> bool {
        self.inner.try_lock().is_err()
    }
}

/// Exclusive checkout of the reader. Derefs to the device.
#[derive(Debug)]
pub struct ReaderLease<R> {
    guard: OwnedMutexGuard<R>,
}

impl<R> Deref for ReaderLease<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.guard
    }
}

impl<R> DerefMut for ReaderLease<R> {
    fn deref_mut(&mut self) -> &mut R {
        &mut self.guard
    }
}

impl<R> Drop for ReaderLease<R> {
    fn drop(&mut self) {
        debug!("reader lease released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockReader;

    #[tokio::test]
    async fn test_lease_is_exclusive() {
        let (reader, _handle) = MockReader::new();
        let shared = SharedReader::new(reader);

        let lease = shared.acquire().await;
        assert!(shared.is_leased());
        assert!(shared.try_acquire().is_none());

        drop(lease);
        assert!(!shared.is_leased());
        assert!(shared.try_acquire().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_timeout_while_leased() {
        let (reader, _handle) = MockReader::new();
        let shared = SharedReader::new(reader);

        let _lease = shared.acquire().await;
        assert!(shared.acquire_timeout(Duration::from_secs(1)).await.is_none());
    }

    #[tokio::test]
    async fn test_waiter_gets_reader_after_release() {
        let (reader, _handle) = MockReader::new();
        let shared = SharedReader::new(reader);

        let lease = shared.acquire().await;
        let waiter = {
            let shared = shared.clone();
            tokio::spawn(async move {
                let mut lease = shared.acquire().await;
                lease.reset().is_ok()
            })
        };

        tokio::task::yield_now().await;
        drop(lease);
        assert!(waiter.await.unwrap());
    }
}
