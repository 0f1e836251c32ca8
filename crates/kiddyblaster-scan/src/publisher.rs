//! Continuous card event stream.
//!
//! [`publish`] starts a background task that holds the reader and scans
//! without deadline, one session after another, waiting one poll interval
//! before each. Every detection becomes a [`CardEvent`] on the returned
//! [`CardEvents`] stream. Failed sessions are logged and replaced by a fresh
//! one.
//!
//! The stream is the task's only owner. Dropping it cancels the task, which
//! releases the reader within one tick.

use crate::error::ScanError;
use crate::scanner::{ScanHandle, Scanner};
use futures::Stream;
use kiddyblaster_core::CardEvent;
use kiddyblaster_hardware::ReaderDevice;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

/// Events buffered between the scan task and the consumer.
const EVENT_BUFFER: usize = 1;

/// Stream of card detections. Dropping it stops the scan task.
#[derive(Debug)]
pub struct CardEvents {
    rx: mpsc::Receiver<CardEvent>,
    _stop: DropGuard,
}

impl CardEvents {
    /// Wait for the next detection. `None` once the scan task has stopped.
    pub async fn recv(&mut self) -> Option<CardEvent> {
        self.rx.recv().await
    }
}

impl Stream for CardEvents {
    type Item = CardEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Start streaming card detections from `scanner`.
///
/// Must be called from within a Tokio runtime.
pub fn publish<R>(scanner: Scanner<R>) -> CardEvents
where
    R: ReaderDevice + 'static,
{
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let cancel = CancellationToken::new();

    tokio::spawn(run(scanner, tx, cancel.clone()));

    CardEvents {
        rx,
        _stop: cancel.drop_guard(),
    }
}

async fn run<R: ReaderDevice>(
    scanner: Scanner<R>,
    tx: mpsc::Sender<CardEvent>,
    cancel: CancellationToken,
) {
    let handle = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        handle = scanner.checkout() => handle,
    };
    debug!("event stream started");

    stream_events(handle, scanner.config().poll_interval, &tx, &cancel).await;

    debug!("event stream stopped, reader released");
}

async fn stream_events<R: ReaderDevice>(
    mut handle: ScanHandle<R>,
    interval: std::time::Duration,
    tx: &mpsc::Sender<CardEvent>,
    cancel: &CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = tx.closed() => return,
            _ = tokio::time::sleep(interval) => {}
        }

        match handle.scan(None, cancel).await {
            Ok(card_id) => match tx.try_send(CardEvent::now(card_id)) {
                Ok(()) => info!(card_id = %card_id, "card event published"),
                Err(TrySendError::Full(event)) => {
                    warn!(card_id = %event.card_id, "consumer lagging, card event dropped");
                }
                Err(TrySendError::Closed(_)) => return,
            },
            Err(ScanError::Cancelled) => return,
            Err(e) => warn!(error = %e, "scan failed, starting a new session"),
        }
    }
}
