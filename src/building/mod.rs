//! The building aggregate and its reports.
//!
//! ## Contents
//! - [`Building`] owns elevators, hall calls and requests behind one lock
//! - [`BuildingBuilder`] injects the scheduler, metrics sink, clock and bus
//! - [`BuildingSnapshot`] consistent read-only copy for status reporting
//! - [`JourneyTicket`], [`TickReport`] results of the two mutating operations

mod builder;
#[allow(clippy::module_inception)]
mod building;
mod report;
mod snapshot;

pub use builder::BuildingBuilder;
pub use building::Building;
pub use report::{JourneyTicket, TickReport};
pub use snapshot::{BuildingSnapshot, ElevatorSnapshot, HallCallSnapshot};

#[cfg(test)]
mod tests;
