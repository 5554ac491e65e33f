//! Typed identifiers.
//!
//! Ids are opaque, copyable and totally ordered. Elevator ids are dense
//! (`0..elevator_count`) and double as the fixed stepping order; hall-call and
//! request ids are allocated monotonically by their owners and never reused
//! within a run.

use std::fmt;

use serde::Serialize;

/// A floor index, `0 <= floor < floor_count`.
pub type Floor = usize;

/// Identifier of one elevator car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ElevatorId(pub usize);

/// Identifier of one hall call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct HallCallId(pub u64);

/// Identifier of one passenger journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for ElevatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for HallCallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}
