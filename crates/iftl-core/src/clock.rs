//! [`TimeSource`] implementations.
//!
//! [`SystemClock`] reads the wall clock; [`ManualClock`] is a shared handle
//! that tests and the simulator advance explicitly.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::traits::TimeSource;
use crate::types::Timestamp;

/// Wall-clock time in UNIX seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn timestamp(&self) -> Timestamp {
        // Pre-epoch clocks read as zero.
        u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
    }
}

/// A manually driven clock.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// hand another to the farm. The clock never moves backwards: [`set`]
/// ignores earlier timestamps.
///
/// [`set`]: ManualClock::set
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Move the clock to `timestamp` if it is not in the past.
    pub fn set(&self, timestamp: Timestamp) {
        self.now.fetch_max(timestamp, Ordering::SeqCst);
    }

    /// Advance the clock by `secs`, saturating at `u64::MAX`.
    pub fn advance(&self, secs: u64) {
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(secs))
            });
    }
}

impl TimeSource for ManualClock {
    fn timestamp(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
