//! Nearest-car dispatch.
//!
//! ```text
//! survivors = elevators.filter(can_accept(call))
//! same      = survivors.filter(direction == call.direction)
//! pick      = min_by (distance, id) over `same` if non-empty, else over `survivors`
//! ```

use crate::dispatch::{Elevator, HallCall};
use crate::types::ElevatorId;

use super::Scheduler;

/// Default strategy: same-direction cars first, then the nearest, then the lowest id.
#[derive(Debug, Default, Clone, Copy)]
pub struct NearestCarScheduler;

impl Scheduler for NearestCarScheduler {
    fn select(&self, call: &HallCall, elevators: &[Elevator]) -> Option<ElevatorId> {
        let rank = |e: &&Elevator| (e.floor().abs_diff(call.floor()), e.id());

        let survivors: Vec<&Elevator> = elevators.iter().filter(|e| e.can_accept(call)).collect();
        survivors
            .iter()
            .filter(|e| e.direction() == call.direction())
            .min_by_key(|e| rank(e))
            .or_else(|| survivors.iter().min_by_key(|e| rank(e)))
            .map(|e| e.id())
    }

    fn name(&self) -> &'static str {
        "nearest_car"
    }
}
