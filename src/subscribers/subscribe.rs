//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers into the
//! simulation. Each subscriber is driven by a dedicated worker loop fed by a bounded
//! queue that is owned by the [`SubscriberSet`](crate::subscribers::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching); they do **not** block the
//!   building, the drivers, nor other subscribers.
//! - Each subscriber **declares** its preferred queue capacity via
//!   [`Subscribe::queue_capacity`]. If a queue overflows, events for that
//!   subscriber are **dropped** (warn).
//!
//! ## Example
//! ```rust
//! use liftsim::{Event, EventKind, Subscribe};
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! #[derive(Default)]
//! struct ForcedCloseCounter(AtomicU64);
//!
//! #[async_trait::async_trait]
//! impl Subscribe for ForcedCloseCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::DoorsForcedClosed {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "forced_close_counter" }
//!     fn queue_capacity(&self) -> usize { 64 }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    ///
    /// On overflow, events for this subscriber are **dropped** (warn).
    fn queue_capacity(&self) -> usize {
        1024
    }
}
