//! Simulation events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the building, the drivers and the
//! simulation.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification, payload metadata and log level
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Building`, `RequestGenerator`, `Simulation`.
//! - **Consumers**: the simulation listener (fans out to `SubscriberSet` and
//!   updates `AliveTracker`), and tests subscribing directly.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
