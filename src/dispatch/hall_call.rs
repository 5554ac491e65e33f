//! # Hall calls.
//!
//! A [`HallCall`] is the deduplicated unit of demand: one per (floor, direction).
//! Every journey sharing a call folds its destination into the call's set.
//!
//! ## Invariants
//! - `status == Assigned` ⇔ `assigned.is_some()`
//! - every destination is above `floor` for `Up`, below it for `Down`

use std::collections::BTreeSet;
use std::time::Instant;

use crate::types::{CallDirection, ElevatorId, Floor, HallCallId, HallCallStatus};

/// Queue key of a hall call.
pub type CallKey = (Floor, CallDirection);

/// A deduplicated floor + direction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HallCall {
    id: HallCallId,
    floor: Floor,
    direction: CallDirection,
    created_at: Instant,
    status: HallCallStatus,
    assigned: Option<ElevatorId>,
    destinations: BTreeSet<Floor>,
}

impl HallCall {
    pub fn new(id: HallCallId, floor: Floor, direction: CallDirection, created_at: Instant) -> Self {
        Self {
            id,
            floor,
            direction,
            created_at,
            status: HallCallStatus::Pending,
            assigned: None,
            destinations: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> HallCallId {
        self.id
    }

    #[inline]
    pub fn floor(&self) -> Floor {
        self.floor
    }

    #[inline]
    pub fn direction(&self) -> CallDirection {
        self.direction
    }

    #[inline]
    pub fn key(&self) -> CallKey {
        (self.floor, self.direction)
    }

    #[inline]
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    #[inline]
    pub fn status(&self) -> HallCallStatus {
        self.status
    }

    #[inline]
    pub fn assigned_elevator(&self) -> Option<ElevatorId> {
        self.assigned
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == HallCallStatus::Pending
    }

    /// Requested destination floors, ascending.
    pub fn destinations(&self) -> impl Iterator<Item = Floor> + '_ {
        self.destinations.iter().copied()
    }

    pub fn destination_count(&self) -> usize {
        self.destinations.len()
    }

    /// Folds in a destination. Returns `false` if it was already present or
    /// lies on the wrong side of the call floor.
    pub(crate) fn add_destination(&mut self, destination: Floor) -> bool {
        if !self.direction.admits(self.floor, destination) {
            return false;
        }
        self.destinations.insert(destination)
    }

    /// `Pending → Assigned`.
    pub(crate) fn assign(&mut self, elevator: ElevatorId) {
        self.status = HallCallStatus::Assigned;
        self.assigned = Some(elevator);
    }

    /// `Assigned → Pending`: the call goes back to the retry list.
    pub(crate) fn release(&mut self) {
        self.status = HallCallStatus::Pending;
        self.assigned = None;
    }

    /// `Assigned → Completed`. The elevator id is kept for reporting.
    pub(crate) fn complete(&mut self) {
        self.status = HallCallStatus::Completed;
    }
}
