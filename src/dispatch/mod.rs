//! Dispatch domain: destinations, hall calls, the call queue, elevators and journeys.
//!
//! ## Contents
//! - [`DestinationSet`] per-elevator floors still to visit
//! - [`HallCall`], [`HallCallQueue`] deduplicated demand keyed by (floor, direction)
//! - [`Elevator`], [`Transition`] the per-tick car state machine
//! - [`Request`] one passenger journey, for wait-time accounting
//!
//! Nothing here locks or publishes; [`Building`](crate::Building) owns every
//! value behind its single mutex and reports what happened.

mod destinations;
mod elevator;
mod hall_call;
mod queue;
mod request;

pub use destinations::DestinationSet;
pub use elevator::{Elevator, Transition};
pub use hall_call::{CallKey, HallCall};
pub use queue::{Fold, HallCallQueue};
pub use request::Request;
