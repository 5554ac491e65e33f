//! Elevator operating state.

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::ParseError;

/// What an elevator car is doing this tick.
///
/// - `Idle`: doors closed, nothing to do.
/// - `Moving`: travelling toward the next destination (destination set non-empty).
/// - `Loading`: doors open at the current floor (door timer positive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElevatorState {
    #[default]
    Idle,
    Moving,
    Loading,
}

impl ElevatorState {
    pub fn as_str(self) -> &'static str {
        match self {
            ElevatorState::Idle => "idle",
            ElevatorState::Moving => "moving",
            ElevatorState::Loading => "loading",
        }
    }
}

impl FromStr for ElevatorState {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idle" => Ok(ElevatorState::Idle),
            "moving" => Ok(ElevatorState::Moving),
            "loading" => Ok(ElevatorState::Loading),
            _ => Err(ParseError::new("elevator state", s)),
        }
    }
}

impl fmt::Display for ElevatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
