//! Value types shared by every layer.
//!
//! ## Contents
//! - [`Direction`], [`CallDirection`] elevator heading and hall-call direction
//! - [`ElevatorState`] idle / moving / loading
//! - [`HallCallStatus`], [`RequestStatus`] lifecycle statuses
//! - [`ElevatorId`], [`HallCallId`], [`RequestId`], [`Floor`] identifiers

mod direction;
mod ids;
mod state;
mod status;

pub use direction::{CallDirection, Direction};
pub use ids::{ElevatorId, Floor, HallCallId, RequestId};
pub use state::ElevatorState;
pub use status::{HallCallStatus, RequestStatus};
