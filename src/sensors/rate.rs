//! Windowed pulse-rate estimation.
//!
//! Each [`RateWindow`] is a ring of per-bucket pulse counts plus a running
//! sum.  Buckets close on a polled deadline: the main loop calls
//! [`RateWindow::poll`] with the current time and the window pushes its
//! pending count once `bucket_ms` has elapsed since the bucket opened.
//!
//! ```text
//!   PulseCounter ──read_and_reset──▶ RateEstimator
//!                                     ├── fast: 50 × 200 ms  (10 s)
//!                                     └── slow: 12 × 5000 ms (60 s)
//! ```
//!
//! The rate is extrapolated from however many buckets have filled, so the
//! reading is meaningful during warm-up instead of ramping up from zero.
//! Everything here is integer arithmetic.

use heapless::Deque;
use serde::{Deserialize, Serialize};

use super::geiger::PulseCounter;

/// Upper bound on buckets per window (storage is fixed at compile time).
pub const MAX_BUCKETS: usize = 64;

/// Bucket period that switches a window to free-running cumulative mode.
pub const INFINITE_PERIOD_MS: u32 = 65_534;

/// Shape of one averaging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Duration of one bucket (milliseconds).
    pub bucket_ms: u32,
    /// Number of buckets kept (1..=[`MAX_BUCKETS`]).
    pub buckets: u16,
}

/// How the slow window integrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntegrationMode {
    /// Sliding average over the configured window.
    Windowed,
    /// Count forever; report the raw total instead of a rate.
    FreeRunning,
}

/// What a window reports.  Free-running windows have no meaningful rate, so
/// callers have to match on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowReading {
    /// Counts per minute extrapolated from the filled buckets.
    PerMinute(u32),
    /// Total counts since the window was created or reset.
    Cumulative(u32),
}

impl WindowReading {
    pub fn per_minute(self) -> Option<u32> {
        match self {
            Self::PerMinute(cpm) => Some(cpm),
            Self::Cumulative(_) => None,
        }
    }
}

/// Ring buffer of bucket counts with a running sum.
#[derive(Debug, Clone)]
pub struct RateWindow {
    buckets: Deque<u32, MAX_BUCKETS>,
    capacity: usize,
    bucket_ms: u32,
    sum: u64,
    /// Pulses accumulated into the currently open bucket.
    pending: u32,
    /// When the open bucket started.
    bucket_start_ms: u32,
    /// Running total for free-running mode.
    cumulative: u32,
}

impl RateWindow {
    /// Build a window starting at `now_ms`.  A `bucket_ms` of
    /// [`INFINITE_PERIOD_MS`] makes it free-running.  The capacity is
    /// clamped to `1..=MAX_BUCKETS`.
    pub fn new(config: WindowConfig, now_ms: u32) -> Self {
        Self {
            buckets: Deque::new(),
            capacity: (config.buckets as usize).clamp(1, MAX_BUCKETS),
            bucket_ms: config.bucket_ms.max(1),
            sum: 0,
            pending: 0,
            bucket_start_ms: now_ms,
            cumulative: 0,
        }
    }

    /// Free-running window, independent of any bucket shape.
    pub fn free_running(now_ms: u32) -> Self {
        Self::new(
            WindowConfig {
                bucket_ms: INFINITE_PERIOD_MS,
                buckets: 1,
            },
            now_ms,
        )
    }

    pub fn is_free_running(&self) -> bool {
        self.bucket_ms == INFINITE_PERIOD_MS
    }

    /// Add pulses to the open bucket.
    pub fn accumulate(&mut self, pulses: u32) {
        if self.is_free_running() {
            self.cumulative = self.cumulative.saturating_add(pulses);
        } else {
            self.pending = self.pending.saturating_add(pulses);
        }
    }

    /// Close the open bucket if its deadline has passed.  Returns `true` when
    /// a bucket was pushed.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        if self.is_free_running() {
            return false;
        }
        if now_ms.wrapping_sub(self.bucket_start_ms) < self.bucket_ms {
            return false;
        }
        let pulses = core::mem::take(&mut self.pending);
        self.tick(pulses);
        self.bucket_start_ms = now_ms;
        true
    }

    /// Push one bucket, evicting the oldest when full.  Returns the evicted
    /// count, if any.
    pub fn tick(&mut self, delta: u32) -> Option<u32> {
        let evicted = if self.buckets.len() >= self.capacity {
            self.buckets.pop_front()
        } else {
            None
        };
        if let Some(old) = evicted {
            self.sum -= u64::from(old);
        }
        // Cannot fail: len < capacity <= MAX_BUCKETS after the eviction.
        let _ = self.buckets.push_back(delta);
        self.sum += u64::from(delta);
        evicted
    }

    /// `sum * 60000 / (bucket_ms * filled)`, or the raw total when
    /// free-running.
    pub fn current_rate_per_minute(&self) -> WindowReading {
        if self.is_free_running() {
            return WindowReading::Cumulative(self.cumulative);
        }
        let filled = self.buckets.len() as u64;
        if filled == 0 {
            return WindowReading::PerMinute(0);
        }
        let cpm = self.sum * 60_000 / (self.bucket_ms as u64 * filled);
        WindowReading::PerMinute(cpm.min(u32::MAX as u64) as u32)
    }

    /// Sum of the buckets currently held.  Kept wide so a full window of
    /// `u32::MAX` buckets cannot overflow.
    pub fn sum(&self) -> u64 {
        self.sum
    }

    pub fn filled(&self) -> usize {
        self.buckets.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn bucket_ms(&self) -> u32 {
        self.bucket_ms
    }

    /// Buckets oldest first.
    pub fn buckets(&self) -> impl Iterator<Item = &u32> {
        self.buckets.iter()
    }

    /// Drop all history and restart the open bucket at `now_ms`.
    pub fn reset(&mut self, now_ms: u32) {
        self.buckets.clear();
        self.sum = 0;
        self.pending = 0;
        self.cumulative = 0;
        self.bucket_start_ms = now_ms;
    }
}

/// Both horizons as seen after a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rates {
    pub fast: WindowReading,
    pub slow: WindowReading,
}

/// Owns the fast and slow windows and feeds them from a [`PulseCounter`].
pub struct RateEstimator {
    fast: RateWindow,
    slow: RateWindow,
}

impl RateEstimator {
    pub fn new(
        fast: WindowConfig,
        slow: WindowConfig,
        integration: IntegrationMode,
        now_ms: u32,
    ) -> Self {
        let slow = match integration {
            IntegrationMode::Windowed => RateWindow::new(slow, now_ms),
            IntegrationMode::FreeRunning => RateWindow::free_running(now_ms),
        };
        Self {
            fast: RateWindow::new(fast, now_ms),
            slow,
        }
    }

    /// Drain the counter into both windows and close any due buckets.
    /// Returns the number of pulses drained.
    pub fn poll(&mut self, now_ms: u32, counter: &PulseCounter) -> u32 {
        let pulses = counter.read_and_reset();
        self.fast.accumulate(pulses);
        self.slow.accumulate(pulses);
        self.fast.poll(now_ms);
        self.slow.poll(now_ms);
        pulses
    }

    pub fn rates(&self) -> Rates {
        Rates {
            fast: self.fast.current_rate_per_minute(),
            slow: self.slow.current_rate_per_minute(),
        }
    }

    pub fn fast(&self) -> &RateWindow {
        &self.fast
    }

    pub fn slow(&self) -> &RateWindow {
        &self.slow
    }

    pub fn reset(&mut self, now_ms: u32) {
        self.fast.reset(now_ms);
        self.slow.reset(now_ms);
    }
}
