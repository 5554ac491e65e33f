//! # Driver liveness with sequence-based ordering.
//!
//! ```text
//! Simulation ──► Bus ──► listener ──► AliveTracker::update()
//!                                             │
//!                                             ▼
//!                                 HashMap<name, {last_seq, alive}>
//! ```
//!
//! ## Rules
//! - only `DriverStarted` / `DriverStopped` / `DriverFailed` carrying a `source` count
//! - events with `seq <= last_seq` for that driver are stale and dropped
//! - `snapshot` is eventually consistent with the bus

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::events::{Event, EventKind};

#[derive(Debug, Clone, Copy)]
struct DriverState {
    last_seq: u64,
    alive: bool,
}

/// Which drivers are currently running.
#[derive(Default)]
pub struct AliveTracker {
    state: RwLock<HashMap<String, DriverState>>,
}

impl AliveTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a lifecycle event. Returns `true` if liveness changed state.
    ///
    /// ```text
    /// update(DriverStopped, seq=100) → alive=false, last_seq=100
    /// update(DriverStarted, seq=99)  → rejected (stale)
    /// ```
    pub async fn update(&self, ev: &Event) -> bool {
        let alive = match ev.kind {
            EventKind::DriverStarted => true,
            EventKind::DriverStopped | EventKind::DriverFailed => false,
            _ => return false,
        };
        let Some(name) = ev.source.as_deref() else {
            return false;
        };

        let mut state = self.state.write().await;
        let entry = state.entry(name.to_string()).or_insert(DriverState {
            last_seq: 0,
            alive: false,
        });
        if ev.seq <= entry.last_seq {
            return false;
        }
        entry.last_seq = ev.seq;
        let changed = entry.alive != alive;
        entry.alive = alive;
        changed
    }

    /// Sorted names of drivers still running.
    pub async fn snapshot(&self) -> Vec<String> {
        let state = self.state.read().await;
        let mut alive: Vec<String> = state
            .iter()
            .filter(|(_, s)| s.alive)
            .map(|(name, _)| name.clone())
            .collect();
        alive.sort_unstable();
        alive
    }

    pub async fn is_alive(&self, name: &str) -> bool {
        self.state
            .read()
            .await
            .get(name)
            .is_some_and(|s| s.alive)
    }
}
