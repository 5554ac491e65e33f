//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`] for events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Building / drivers ── publish(Event) ──► Bus ──► Simulation listener
//!                                                        │
//!                                                        ├──► SubscriberSet::emit(&Event)
//!                                                        │         │
//!                                                        │    ┌────┴────┬─────────┐
//!                                                        │    ▼         ▼         ▼
//!                                                        │  LogWriter  Custom    ...
//!                                                        │
//!                                                        └──► AliveTracker (driver liveness)
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;

pub(crate) use set::panic_message;
