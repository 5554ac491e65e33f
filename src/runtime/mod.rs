//! # Async runtime: drivers, liveness, shutdown.
//!
//! - [`Driver`]: one cooperative background loop.
//! - [`TickDriver`]: advances the building every tick interval.
//! - [`RequestGenerator`]: submits random journeys, backs off after panics.
//! - [`AliveTracker`]: which drivers are still running.
//! - [`Simulation`]: spawns the drivers, fans events out to subscribers and
//!   enforces the shutdown grace period.

mod alive;
mod driver;
mod generator;
mod shutdown;
mod simulation;
mod tick;

pub use alive::AliveTracker;
pub use driver::Driver;
pub use generator::{JourneyPicker, RequestGenerator, uniform_journey};
pub use shutdown::wait_for_shutdown_signal;
pub use simulation::Simulation;
pub use tick::TickDriver;
