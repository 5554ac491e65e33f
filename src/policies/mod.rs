//! Admission and recovery policies.
//!
//! ## Contents
//! - [`RateLimiter`] sliding-window admission (global + per tag) for journey requests
//! - [`BackoffPolicy`] how long the request generator waits after a failed iteration
//! - [`JitterPolicy`] randomization of that wait
//!
//! ## Quick wiring
//! ```text
//! Building::request_journey ──► RateLimiter::check(tag, now) ──► (lock) HallCallQueue
//! RequestGenerator::run     ──► on failure: sleep(BackoffPolicy::next(failures))
//! ```

mod backoff;
mod rate_limit;

pub use backoff::{BackoffPolicy, JitterPolicy};
pub use rate_limit::{RateLimitScope, RateLimiter};
