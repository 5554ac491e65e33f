//! # Elevator selection strategies.
//!
//! A [`Scheduler`] answers one question: given a pending hall call and the
//! current elevators, which car should take it? It is a pure function of its
//! inputs and never mutates anything.
//!
//! The building injects one scheduler at construction and re-checks
//! [`Elevator::can_accept`] on whatever it returns, so a strategy cannot break
//! the sweep invariants even if it ignores them.
//!
//! Any `Fn(&HallCall, &[Elevator]) -> Option<ElevatorId>` closure is a scheduler:
//! ```
//! use liftsim::{Building, Config};
//! use liftsim::dispatch::{Elevator, HallCall};
//!
//! let first_free = |_: &HallCall, cars: &[Elevator]| {
//!     cars.iter().find(|c| c.is_idle()).map(Elevator::id)
//! };
//! let building = Building::builder(Config::default())
//!     .with_scheduler(first_free)
//!     .build()
//!     .unwrap();
//! assert_eq!(building.scheduler_name(), "custom");
//! ```

mod nearest;

pub use nearest::NearestCarScheduler;

use crate::dispatch::{Elevator, HallCall};
use crate::types::ElevatorId;

/// Picks the elevator that should serve a hall call.
pub trait Scheduler: Send + Sync + 'static {
    /// Returns the chosen elevator, or `None` to leave the call pending this tick.
    fn select(&self, call: &HallCall, elevators: &[Elevator]) -> Option<ElevatorId>;

    /// Returns a stable name used in logs.
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<F> Scheduler for F
where
    F: Fn(&HallCall, &[Elevator]) -> Option<ElevatorId> + Send + Sync + 'static,
{
    fn select(&self, call: &HallCall, elevators: &[Elevator]) -> Option<ElevatorId> {
        self(call, elevators)
    }
}
