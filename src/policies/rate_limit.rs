//! # Sliding-window rate limiter for journey requests.
//!
//! [`RateLimiter`] admits at most `global_limit` requests per window across all
//! callers, and at most `per_tag_limit` per window for one caller tag.
//!
//! ## Rules
//! - A request is recorded only if it passes **both** limits.
//! - Timestamps older than `window` are pruned on every check.
//! - Tags whose window is empty are forgotten (memory stays bounded by active tags).
//! - The limiter has its own lock and is consulted **before** the building lock,
//!   so throttled requests never contend with elevator-state work.
//!
//! ```text
//! check(tag, now)
//!   ├─ prune(global), prune(tags[tag])
//!   ├─ global full?  → Err(Global)
//!   ├─ tag full?     → Err(Tag(tag))
//!   └─ push now into both → Ok
//! ```

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;

/// Which limit rejected a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitScope {
    Global,
    Tag(Arc<str>),
}

impl fmt::Display for RateLimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateLimitScope::Global => f.write_str("global"),
            RateLimitScope::Tag(tag) => write!(f, "tag={tag}"),
        }
    }
}

#[derive(Default)]
struct Windows {
    global: VecDeque<Instant>,
    tags: HashMap<String, VecDeque<Instant>>,
}

/// Global + per-tag sliding-window limiter.
pub struct RateLimiter {
    window: Duration,
    global_limit: Option<u32>,
    per_tag_limit: Option<u32>,
    windows: Mutex<Windows>,
}

impl RateLimiter {
    /// Creates a limiter; `None` limits are unlimited.
    pub fn new(window: Duration, global_limit: Option<u32>, per_tag_limit: Option<u32>) -> Self {
        Self {
            window,
            global_limit,
            per_tag_limit,
            windows: Mutex::new(Windows::default()),
        }
    }

    pub fn from_config(cfg: &RateLimitConfig) -> Self {
        Self::new(cfg.window(), cfg.global(), cfg.per_tag())
    }

    /// A limiter that admits everything.
    pub fn unlimited() -> Self {
        Self::new(Duration::from_secs(60), None, None)
    }

    /// Admits and records one request from `tag` at `now`, or names the limit that rejected it.
    pub fn check(&self, tag: &str, now: Instant) -> Result<(), RateLimitScope> {
        if self.global_limit.is_none() && self.per_tag_limit.is_none() {
            return Ok(());
        }

        let mut w = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let window = self.window;
        prune(&mut w.global, now, window);
        w.tags.retain(|_, q| {
            prune(q, now, window);
            !q.is_empty()
        });

        if let Some(limit) = self.global_limit {
            if w.global.len() >= limit as usize {
                return Err(RateLimitScope::Global);
            }
        }
        if let Some(limit) = self.per_tag_limit {
            let used = w.tags.get(tag).map_or(0, VecDeque::len);
            if used >= limit as usize {
                return Err(RateLimitScope::Tag(Arc::from(tag)));
            }
        }

        w.global.push_back(now);
        w.tags.entry(tag.to_owned()).or_default().push_back(now);
        Ok(())
    }

    /// Number of requests currently counted against `tag`.
    pub fn in_window(&self, tag: &str) -> usize {
        let w = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        w.tags.get(tag).map_or(0, VecDeque::len)
    }
}

fn prune(q: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = q.front() {
        if now.saturating_duration_since(front) >= window {
            q.pop_front();
        } else {
            break;
        }
    }
}
