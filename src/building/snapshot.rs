//! Point-in-time copies of building state.
//!
//! A [`BuildingSnapshot`] is taken under the same lock as every mutation, so
//! it is always internally consistent. Nothing in it refers back into the
//! building.

use serde::Serialize;

use crate::dispatch::{Elevator, HallCall};
use crate::types::{
    CallDirection, Direction, ElevatorId, ElevatorState, Floor, HallCallId, HallCallStatus,
};

/// One elevator's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElevatorSnapshot {
    pub id: ElevatorId,
    pub floor: Floor,
    pub direction: Direction,
    pub state: ElevatorState,
    /// Destinations, ascending.
    pub destinations: Vec<Floor>,
    /// Accepted hall-call ids, ascending.
    pub accepted: Vec<HallCallId>,
    pub door_timer: u32,
    pub loading_ticks: u32,
}

impl From<&Elevator> for ElevatorSnapshot {
    fn from(e: &Elevator) -> Self {
        Self {
            id: e.id(),
            floor: e.floor(),
            direction: e.direction(),
            state: e.state(),
            destinations: e.destinations().iter().collect(),
            accepted: e.accepted_calls().collect(),
            door_timer: e.door_timer(),
            loading_ticks: e.loading_ticks(),
        }
    }
}

/// One hall call's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HallCallSnapshot {
    pub id: HallCallId,
    pub floor: Floor,
    pub direction: CallDirection,
    pub status: HallCallStatus,
    pub assigned: Option<ElevatorId>,
    /// Requested destinations, ascending.
    pub destinations: Vec<Floor>,
    /// Journeys waiting on this call.
    pub waiting: usize,
}

impl HallCallSnapshot {
    pub(crate) fn new(call: &HallCall, waiting: usize) -> Self {
        Self {
            id: call.id(),
            floor: call.floor(),
            direction: call.direction(),
            status: call.status(),
            assigned: call.assigned_elevator(),
            destinations: call.destinations().collect(),
            waiting,
        }
    }
}

/// Every elevator and live hall call at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildingSnapshot {
    /// Ticks advanced so far.
    pub tick: u64,
    /// Elevators in id order.
    pub elevators: Vec<ElevatorSnapshot>,
    /// Live hall calls, oldest first.
    pub calls: Vec<HallCallSnapshot>,
    /// Journeys submitted so far.
    pub requests: usize,
}

impl BuildingSnapshot {
    /// Calls still waiting for an elevator, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &HallCallSnapshot> + '_ {
        self.calls
            .iter()
            .filter(|c| c.status == HallCallStatus::Pending)
    }

    pub fn elevator(&self, id: ElevatorId) -> Option<&ElevatorSnapshot> {
        self.elevators.iter().find(|e| e.id == id)
    }

    pub fn call(&self, id: HallCallId) -> Option<&HallCallSnapshot> {
        self.calls.iter().find(|c| c.id == id)
    }

    /// True if no call is live and every elevator is idle.
    pub fn is_quiescent(&self) -> bool {
        self.calls.is_empty()
            && self
                .elevators
                .iter()
                .all(|e| e.state == ElevatorState::Idle && e.destinations.is_empty())
    }
}
