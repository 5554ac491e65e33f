//! # Recovery backoff for the request generator.
//!
//! When a generator iteration fails unexpectedly, the driver logs the failure
//! and waits before its next iteration. [`BackoffPolicy`] computes that wait
//! from the number of consecutive failures:
//!
//! `delay(n) = min(first × factor^n, max)`, then jitter.
//!
//! The base delay depends only on `n`; jitter output never feeds back into the
//! next computation.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use liftsim::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     first: Duration::from_millis(250),
//!     max: Duration::from_secs(2),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//! assert_eq!(backoff.next(0), Duration::from_millis(250));
//! assert_eq!(backoff.next(2), Duration::from_secs(1));
//! assert_eq!(backoff.next(9), Duration::from_secs(2));
//! ```

use std::time::Duration;

use rand::Rng;

/// Randomization applied to a computed delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum JitterPolicy {
    /// Exact delay.
    #[default]
    None,
    /// `delay/2 + random[0, delay/2]`.
    Equal,
}

impl JitterPolicy {
    pub fn apply(self, delay: Duration) -> Duration {
        match self {
            JitterPolicy::None => delay,
            JitterPolicy::Equal => {
                let ms = delay.as_millis().min(u128::from(u64::MAX)) as u64;
                let half = ms / 2;
                if half == 0 {
                    return delay;
                }
                let extra = rand::rng().random_range(0..=ms - half);
                Duration::from_millis(half + extra)
            }
        }
    }
}

/// Delay growth after consecutive failures.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay after the first failure.
    pub first: Duration,
    /// Cap.
    pub max: Duration,
    /// Multiplicative growth per consecutive failure.
    pub factor: f64,
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// `first = 500ms`, `factor = 2.0`, `max = 10s`, equal jitter.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(500),
            max: Duration::from_secs(10),
            factor: 2.0,
            jitter: JitterPolicy::Equal,
        }
    }
}

impl BackoffPolicy {
    /// Delay before the next attempt after `failures` previous consecutive failures (0-indexed).
    pub fn next(&self, failures: u32) -> Duration {
        let exp = failures.min(i32::MAX as u32) as i32;
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);
        let base = if !secs.is_finite() || secs < 0.0 || secs > self.max.as_secs_f64() {
            self.max
        } else {
            Duration::from_secs_f64(secs)
        };
        self.jitter.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(first_ms: u64, max_ms: u64, factor: f64) -> BackoffPolicy {
        BackoffPolicy {
            first: Duration::from_millis(first_ms),
            max: Duration::from_millis(max_ms),
            factor,
            jitter: JitterPolicy::None,
        }
    }

    #[test]
    fn grows_by_factor() {
        let p = exact(100, 30_000, 2.0);
        assert_eq!(p.next(0), Duration::from_millis(100));
        assert_eq!(p.next(1), Duration::from_millis(200));
        assert_eq!(p.next(3), Duration::from_millis(800));
    }

    #[test]
    fn clamps_to_max_including_overflow() {
        let p = exact(100, 1_000, 2.0);
        assert_eq!(p.next(10), Duration::from_secs(1));
        assert_eq!(p.next(u32::MAX), Duration::from_secs(1));
        let p = exact(5_000, 1_000, 1.0);
        assert_eq!(p.next(0), Duration::from_secs(1));
    }

    #[test]
    fn equal_jitter_stays_within_half_and_base() {
        let p = BackoffPolicy {
            jitter: JitterPolicy::Equal,
            ..exact(1_000, 30_000, 1.0)
        };
        for attempt in 0..50 {
            let d = p.next(attempt);
            assert!(d >= Duration::from_millis(500), "{d:?} below half");
            assert!(d <= Duration::from_millis(1_000), "{d:?} above base");
        }
    }
}
