//! Error types used by the dispatch core, its configuration and the runtime.
//!
//! - [`RequestError`]: a journey request was rejected (validation, capacity, throttling).
//! - [`DispatchError`]: an internal inconsistency inside the building (logic defect).
//! - [`DestinationError`]: a floor could not be added to a destination set.
//! - [`ConfigError`]: configuration could not be loaded or failed validation.
//! - [`DriverError`]: a background driver failed.
//! - [`RuntimeError`]: the simulation runtime itself failed.
//! - [`ParseError`]: a value type could not be parsed from text.
//!
//! Every enum provides `as_label` (stable snake_case for logs/metrics).

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::policies::RateLimitScope;
use crate::types::{CallDirection, ElevatorId, Floor, HallCallId};

/// A value-type name that is not one of the closed set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {what}: {input:?}")]
pub struct ParseError {
    /// Which type was being parsed.
    pub what: &'static str,
    /// The rejected input.
    pub input: String,
}

impl ParseError {
    pub fn new(what: &'static str, input: impl Into<String>) -> Self {
        Self {
            what,
            input: input.into(),
        }
    }
}

/// # Reasons a journey request is rejected.
///
/// Rejections are synchronous and never mutate building state, except that a
/// throttled or full request has already been counted by the rate limiter.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// A floor outside `0..floor_count`.
    #[error("floor {floor} out of range (building has {floor_count} floors)")]
    InvalidFloor { floor: Floor, floor_count: usize },

    /// Source and destination are the same floor.
    #[error("source and destination are both floor {floor}")]
    SameFloor { floor: Floor },

    /// A sliding-window limit was hit.
    #[error("rate limited ({scope})")]
    RateLimited { scope: RateLimitScope },

    /// The destination lies behind the call floor for the call's direction.
    #[error("destination {destination} is not {direction} from floor {floor}")]
    Misdirected {
        floor: Floor,
        destination: Floor,
        direction: CallDirection,
    },

    /// Every (floor, direction) slot of the hall-call queue is occupied.
    #[error("hall call queue full (capacity {capacity})")]
    QueueFull { capacity: usize },
}

impl RequestError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use liftsim::RequestError;
    ///
    /// let err = RequestError::SameFloor { floor: 0 };
    /// assert_eq!(err.as_label(), "request_same_floor");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RequestError::InvalidFloor { .. } => "request_invalid_floor",
            RequestError::SameFloor { .. } => "request_same_floor",
            RequestError::RateLimited { .. } => "request_rate_limited",
            RequestError::Misdirected { .. } => "request_misdirected",
            RequestError::QueueFull { .. } => "request_queue_full",
        }
    }

    /// True for rejections that may succeed if the caller retries later.
    ///
    /// # Example
    /// ```
    /// use liftsim::RequestError;
    ///
    /// assert!(RequestError::QueueFull { capacity: 18 }.is_retryable());
    /// assert!(!RequestError::SameFloor { floor: 2 }.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RequestError::RateLimited { .. } | RequestError::QueueFull { .. }
        )
    }
}

/// A floor rejected by a destination set.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DestinationError {
    #[error("floor {floor} out of range (building has {floor_count} floors)")]
    OutOfRange { floor: Floor, floor_count: usize },

    #[error("floor {floor} is behind floor {anchor} for heading {heading}")]
    WrongDirection {
        floor: Floor,
        anchor: Floor,
        heading: crate::types::Direction,
    },
}

impl DestinationError {
    pub fn as_label(&self) -> &'static str {
        match self {
            DestinationError::OutOfRange { .. } => "destination_out_of_range",
            DestinationError::WrongDirection { .. } => "destination_wrong_direction",
        }
    }
}

/// # Internal inconsistencies inside the building.
///
/// These indicate a logic defect, not a bad request; the tick driver treats
/// them as fatal.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unknown hall call {0}")]
    UnknownCall(HallCallId),

    #[error("unknown elevator {0}")]
    UnknownElevator(ElevatorId),

    #[error("elevator {elevator}: {source}")]
    Destination {
        elevator: ElevatorId,
        #[source]
        source: DestinationError,
    },
}

impl DispatchError {
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::UnknownCall(_) => "dispatch_unknown_call",
            DispatchError::UnknownElevator(_) => "dispatch_unknown_elevator",
            DispatchError::Destination { .. } => "dispatch_destination",
        }
    }
}

/// Configuration loading and validation failures.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A numeric field outside its allowed range.
    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    /// A field that violates a cross-field rule.
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The config file could not be read.
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config text is not valid JSON for [`Config`](crate::Config).
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::OutOfRange { .. } => "config_out_of_range",
            ConfigError::Invalid { .. } => "config_invalid",
            ConfigError::Io { .. } => "config_io",
            ConfigError::Parse(_) => "config_parse",
        }
    }
}

/// # Errors produced by a background driver.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DriverError {
    /// Non-recoverable: ends the simulation.
    #[error("fatal error (no retry): {error}")]
    Fatal { error: String },

    /// Recoverable: the driver may continue after a delay.
    #[error("execution failed: {error}")]
    Fail { error: String },
}

impl DriverError {
    pub fn as_label(&self) -> &'static str {
        match self {
            DriverError::Fatal { .. } => "driver_fatal",
            DriverError::Fail { .. } => "driver_failed",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, DriverError::Fatal { .. })
    }
}

impl From<DispatchError> for DriverError {
    fn from(e: DispatchError) -> Self {
        DriverError::Fatal {
            error: e.to_string(),
        }
    }
}

/// # Errors produced by the simulation runtime.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some drivers had to be force-terminated.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}; forcing termination")]
    GraceExceeded {
        grace: Duration,
        stuck: Vec<String>,
    },

    /// A driver ended the run with a fatal error or a panic.
    #[error("driver {driver:?} failed: {error}")]
    DriverFailed { driver: String, error: String },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use liftsim::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::DriverFailed { .. } => "runtime_driver_failed",
        }
    }
}
