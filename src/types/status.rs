//! # Lifecycle statuses.
//!
//! ```text
//! HallCallStatus:  Pending ──assign──► Assigned ──doors close──► Completed
//!                     ▲                   │
//!                     └──── release ──────┘
//!
//! RequestStatus:   Created ──► AssignedToHallCall ──► Completed
//! ```

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::ParseError;

/// Status of a hall call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HallCallStatus {
    #[default]
    Pending,
    Assigned,
    Completed,
}

impl HallCallStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HallCallStatus::Pending => "pending",
            HallCallStatus::Assigned => "assigned",
            HallCallStatus::Completed => "completed",
        }
    }
}

/// Status of a passenger journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Created,
    AssignedToHallCall,
    Completed,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Created => "created",
            RequestStatus::AssignedToHallCall => "assigned_to_hall_call",
            RequestStatus::Completed => "completed",
        }
    }
}

impl FromStr for HallCallStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(HallCallStatus::Pending),
            "assigned" => Ok(HallCallStatus::Assigned),
            "completed" => Ok(HallCallStatus::Completed),
            _ => Err(ParseError::new("hall call status", s)),
        }
    }
}

impl FromStr for RequestStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(RequestStatus::Created),
            "assigned_to_hall_call" => Ok(RequestStatus::AssignedToHallCall),
            "completed" => Ok(RequestStatus::Completed),
            _ => Err(ParseError::new("request status", s)),
        }
    }
}

impl fmt::Display for HallCallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
