//! # Time source.
//!
//! The dispatch core only needs timestamps: hall-call age ordering, request
//! wait times and the rate limiter's sliding window. Scheduling never reads
//! the clock; ticks are driven externally.
//!
//! - [`SystemClock`] reads [`Instant::now`].
//! - [`ManualClock`] only moves when told to; use it for deterministic tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Source of monotonic timestamps.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// Wall-time monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock frozen at its creation instant until [`advance`](ManualClock::advance)d.
///
/// The offset is a single atomic, so reading the clock never takes a lock.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset_nanos: AtomicU64,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_nanos: AtomicU64::new(0),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let nanos = by.as_nanos().min(u128::from(u64::MAX)) as u64;
        self.offset_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    /// Time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_nanos.load(Ordering::Relaxed))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }
}
