//! # Event bus.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`]. Publishing never waits on
//! receivers, so the building can emit from its hot paths.
//!
//! ```text
//!   Building (journeys, ticks) ──┐
//!   RequestGenerator (backoff) ──┼──► Bus ──► Simulation listener ──► SubscriberSet
//!   Simulation (lifecycle)     ──┘              (AliveTracker)        (LogWriter, ...)
//! ```
//!
//! ## Rules
//! - the building collects events under its lock and publishes after releasing it
//! - one ring buffer of `capacity` events is shared by every receiver
//! - a receiver that falls behind gets `RecvError::Lagged(n)` and skips `n` events
//! - with no receiver attached, events are simply discarded

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for simulation events. Clones share one sender.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Sends to every current receiver; returns immediately.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// New independent receiver; sees only events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
