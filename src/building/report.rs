//! Values returned by building operations.

use serde::Serialize;

use crate::dispatch::HallCall;
use crate::types::{ElevatorId, HallCallId, RequestId};

/// An accepted journey: its request id and the hall call it joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyTicket {
    pub request: RequestId,
    /// Copy of the call right after the journey was folded in.
    pub call: HallCall,
    /// `true` if the journey created the call, `false` if it merged into one.
    pub created: bool,
}

/// What one [`Building::advance_tick`](super::Building::advance_tick) did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// Hall calls matched this tick, oldest first.
    pub assigned: Vec<(HallCallId, ElevatorId)>,
    /// Hall calls served and removed this tick.
    pub completed: Vec<HallCallId>,
    /// Hall calls returned to pending this tick.
    pub released: Vec<HallCallId>,
    /// Elevators whose doors were force-closed this tick.
    pub forced: Vec<ElevatorId>,
    /// Requests completed this tick.
    pub requests_completed: usize,
}

impl TickReport {
    /// True if nothing was assigned, completed, released or forced.
    pub fn is_quiet(&self) -> bool {
        self.assigned.is_empty()
            && self.completed.is_empty()
            && self.released.is_empty()
            && self.forced.is_empty()
    }
}
