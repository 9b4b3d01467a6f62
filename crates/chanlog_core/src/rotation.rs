//! Day-boundary detection and the periodic rotation tick.
//!
//! The decision rule only looks at two timestamps: rotate iff `now` falls on
//! a different calendar day than the previous check. The scheduler records
//! every `now` it sees, so a burst of checks within one day signals nothing
//! and a late tick after midnight signals exactly once.

use crate::error::CoreResult;
use crate::event::Timestamp;
use crate::writer::LogWriter;
use chrono::Local;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error};

/// Outcome of a rotation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDecision {
    /// Same day as the last check.
    NoAction,
    /// A day boundary was crossed since the last check.
    Rotate,
}

/// Compares the calendar days of two timestamps.
#[must_use]
pub fn check(now: Timestamp, last_checked: Timestamp) -> RotationDecision {
    if now.date_naive() == last_checked.date_naive() {
        RotationDecision::NoAction
    } else {
        RotationDecision::Rotate
    }
}

/// Remembers the last observed time between checks.
#[derive(Debug, Clone)]
pub struct RotationScheduler {
    last_checked: Timestamp,
}

impl RotationScheduler {
    /// Starts tracking from `start`.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            last_checked: start,
        }
    }

    /// Checks `now` against the last observed time, then records `now`.
    pub fn check(&mut self, now: Timestamp) -> RotationDecision {
        let decision = check(now, self.last_checked);
        self.last_checked = now;
        decision
    }

    /// The most recent time passed to [`check`](Self::check).
    #[must_use]
    pub fn last_checked(&self) -> Timestamp {
        self.last_checked
    }
}

/// Source of "now" for the ticker.
pub trait Clock: Send + Sync {
    /// The current wall-clock time.
    fn now(&self) -> Timestamp;
}

/// The local system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Local::now().fixed_offset()
    }
}

/// Background thread calling [`LogWriter::tick`] at a fixed interval.
///
/// Stops when [`stop`](Self::stop) is called or the ticker is dropped.
#[derive(Debug)]
pub struct RotationTicker {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl RotationTicker {
    /// Spawns the ticker thread.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the thread cannot be spawned.
    pub fn spawn(
        writer: Arc<LogWriter>,
        interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> CoreResult<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let handle = thread::Builder::new()
            .name("chanlog-rotation".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let now = clock.now();
                        match writer.tick(now) {
                            Ok(decision) => debug!(?decision, "rotation tick"),
                            Err(e) => error!(error = %e, "rotation tick failed, retrying next tick"),
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stops the thread and waits for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        drop(self.stop_tx.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("rotation ticker thread panicked");
            }
        }
    }
}

impl Drop for RotationTicker {
    fn drop(&mut self) {
        self.shutdown();
    }
}
