//! # Movement and hall-call directions.
//!
//! Two closed enums instead of one:
//! - [`Direction`] is what an elevator is doing: `Up`, `Down` or `Idle`.
//! - [`CallDirection`] is what a waiting passenger asked for: `Up` or `Down`.
//!   A hall call can never be idle, so the type has no such variant.
//!
//! ```text
//! CallDirection ──From──► Direction
//! Direction ──TryFrom──► CallDirection   (Idle → ParseError)
//! ```

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::ParseError;

use super::ids::Floor;

/// Heading of an elevator car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    #[default]
    Idle,
}

impl Direction {
    /// Direction of travel needed to get from `from` to `to`.
    ///
    /// Equal floors yield [`Direction::Idle`].
    pub fn between(from: Floor, to: Floor) -> Self {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => Direction::Up,
            std::cmp::Ordering::Less => Direction::Down,
            std::cmp::Ordering::Equal => Direction::Idle,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Idle => "idle",
        }
    }
}

/// Direction requested by a hall call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallDirection {
    Up,
    Down,
}

impl CallDirection {
    /// Derives the hall-call direction of a journey.
    ///
    /// Returns `None` when `source == destination`: such a journey has no direction.
    pub fn of_journey(source: Floor, destination: Floor) -> Option<Self> {
        CallDirection::try_from(Direction::between(source, destination)).ok()
    }

    /// True if `destination` lies on the correct side of `floor` for this direction.
    pub fn admits(self, floor: Floor, destination: Floor) -> bool {
        match self {
            CallDirection::Up => destination > floor,
            CallDirection::Down => destination < floor,
        }
    }

    pub fn as_str(self) -> &'static str {
        Direction::from(self).as_str()
    }
}

impl From<CallDirection> for Direction {
    fn from(d: CallDirection) -> Self {
        match d {
            CallDirection::Up => Direction::Up,
            CallDirection::Down => Direction::Down,
        }
    }
}

impl TryFrom<Direction> for CallDirection {
    type Error = ParseError;

    fn try_from(d: Direction) -> Result<Self, Self::Error> {
        match d {
            Direction::Up => Ok(CallDirection::Up),
            Direction::Down => Ok(CallDirection::Down),
            Direction::Idle => Err(ParseError::new("call direction", "idle")),
        }
    }
}

impl PartialEq<CallDirection> for Direction {
    fn eq(&self, other: &CallDirection) -> bool {
        *self == Direction::from(*other)
    }
}

impl FromStr for Direction {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            "idle" => Ok(Direction::Idle),
            _ => Err(ParseError::new("direction", s)),
        }
    }
}

impl FromStr for CallDirection {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(CallDirection::Up),
            "down" => Ok(CallDirection::Down),
            _ => Err(ParseError::new("call direction", s)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CallDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
