//! # Events emitted by the building and the runtime.
//!
//! The [`EventKind`] enum classifies events across three categories:
//! - **Dispatch events**: journeys, hall calls and elevator movement
//! - **Driver events**: tick driver and request generator lifecycle
//! - **Shutdown events**: signal observed, grace result
//!
//! The [`Event`] struct carries optional metadata (elevator, call, floor, ...)
//! set depending on the kind, and [`Event::level`] maps each kind to the
//! `tracing` level it is logged at.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use liftsim::{ElevatorId, Event, EventKind};
//!
//! let ev = Event::new(EventKind::DoorsForcedClosed)
//!     .with_elevator(ElevatorId(1))
//!     .with_floor(4)
//!     .with_reason("loading for 31 ticks");
//!
//! assert_eq!(ev.kind, EventKind::DoorsForcedClosed);
//! assert_eq!(ev.level(), tracing::Level::ERROR);
//! assert_eq!(ev.floor, Some(4));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use tracing::Level;

use crate::types::{Direction, ElevatorId, Floor, HallCallId, RequestId};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    // === Shutdown events ===
    /// Shutdown requested (OS signal or caller future).
    ShutdownRequested,

    /// All drivers stopped within the configured grace period.
    AllStoppedWithin,

    /// Grace period exceeded; some drivers did not stop in time.
    ///
    /// Sets:
    /// - `reason`: names of the stuck drivers
    GraceExceeded,

    // === Driver events ===
    /// A driver loop started.
    ///
    /// Sets:
    /// - `source`: driver name
    DriverStarted,

    /// A driver loop returned cleanly.
    ///
    /// Sets:
    /// - `source`: driver name
    DriverStopped,

    /// A driver ended with a fatal error or panicked.
    ///
    /// Sets:
    /// - `source`: driver name
    /// - `reason`: error message
    DriverFailed,

    /// The request generator will retry after a failed iteration.
    ///
    /// Sets:
    /// - `source`: driver name
    /// - `attempt`: consecutive failures so far
    /// - `delay_ms`: wait before the next iteration
    /// - `reason`: last failure message
    BackoffScheduled,

    // === Dispatch events ===
    /// One building tick completed.
    ///
    /// Sets:
    /// - `tick`: tick number (1-based)
    TickAdvanced,

    /// A journey was accepted and folded into a hall call.
    ///
    /// Sets:
    /// - `request`, `call`, `floor` (source), `destination`, `direction`
    /// - `source`: request tag
    RequestAccepted,

    /// A journey was rejected.
    ///
    /// Sets:
    /// - `floor` (source), `destination`
    /// - `source`: request tag
    /// - `reason`: `RequestError` label
    RequestRejected,

    /// A journey's hall call was served; wait time recorded.
    ///
    /// Sets:
    /// - `request`, `call`, `elevator`
    /// - `delay_ms`: wait time
    RequestCompleted,

    /// A new hall call entered the queue.
    ///
    /// Sets:
    /// - `call`, `floor`, `direction`
    HallCallCreated,

    /// The scheduler matched a pending hall call to an elevator.
    ///
    /// Sets:
    /// - `call`, `elevator`, `floor`, `direction`, `tick`
    HallCallAssigned,

    /// An assigned hall call went back to pending.
    ///
    /// Sets:
    /// - `call`, `elevator`, `floor`, `direction`
    HallCallReleased,

    /// A hall call was served and removed from the queue.
    ///
    /// Sets:
    /// - `call`, `elevator`, `floor`, `direction`
    HallCallCompleted,

    /// An elevator moved one floor.
    ///
    /// Sets:
    /// - `elevator`, `floor` (new floor), `direction`
    ElevatorMoved,

    /// An elevator opened its doors.
    ///
    /// Sets:
    /// - `elevator`, `floor`
    DoorsOpened,

    /// An elevator closed its doors.
    ///
    /// Sets:
    /// - `elevator`, `floor`
    DoorsClosed,

    /// An elevator stayed in loading past the stuck threshold and was forced closed.
    ///
    /// Sets:
    /// - `elevator`, `floor`
    /// - `reason`: how long it was held
    DoorsForcedClosed,
}

impl EventKind {
    /// Stable snake_case name for logs.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::ShutdownRequested => "shutdown_requested",
            EventKind::AllStoppedWithin => "all_stopped_within",
            EventKind::GraceExceeded => "grace_exceeded",
            EventKind::DriverStarted => "driver_started",
            EventKind::DriverStopped => "driver_stopped",
            EventKind::DriverFailed => "driver_failed",
            EventKind::BackoffScheduled => "backoff_scheduled",
            EventKind::TickAdvanced => "tick_advanced",
            EventKind::RequestAccepted => "request_accepted",
            EventKind::RequestRejected => "request_rejected",
            EventKind::RequestCompleted => "request_completed",
            EventKind::HallCallCreated => "hall_call_created",
            EventKind::HallCallAssigned => "hall_call_assigned",
            EventKind::HallCallReleased => "hall_call_released",
            EventKind::HallCallCompleted => "hall_call_completed",
            EventKind::ElevatorMoved => "elevator_moved",
            EventKind::DoorsOpened => "doors_opened",
            EventKind::DoorsClosed => "doors_closed",
            EventKind::DoorsForcedClosed => "doors_forced_closed",
        }
    }
}

/// Event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    pub tick: Option<u64>,
    pub elevator: Option<ElevatorId>,
    pub call: Option<HallCallId>,
    pub request: Option<RequestId>,
    pub floor: Option<Floor>,
    pub destination: Option<Floor>,
    pub direction: Option<Direction>,
    /// Delay or wait in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Attempt / failure count.
    pub attempt: Option<u32>,
    /// Human-readable reason: error message or rejection label.
    pub reason: Option<Arc<str>>,
    /// Driver or request-tag name, if applicable.
    pub source: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed) + 1,
            at: SystemTime::now(),
            kind,
            tick: None,
            elevator: None,
            call: None,
            request: None,
            floor: None,
            destination: None,
            direction: None,
            delay_ms: None,
            attempt: None,
            reason: None,
            source: None,
        }
    }

    #[inline]
    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }

    #[inline]
    pub fn with_elevator(mut self, id: ElevatorId) -> Self {
        self.elevator = Some(id);
        self
    }

    #[inline]
    pub fn with_call(mut self, id: HallCallId) -> Self {
        self.call = Some(id);
        self
    }

    #[inline]
    pub fn with_request(mut self, id: RequestId) -> Self {
        self.request = Some(id);
        self
    }

    #[inline]
    pub fn with_floor(mut self, floor: Floor) -> Self {
        self.floor = Some(floor);
        self
    }

    #[inline]
    pub fn with_destination(mut self, floor: Floor) -> Self {
        self.destination = Some(floor);
        self
    }

    #[inline]
    pub fn with_direction(mut self, direction: impl Into<Direction>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a driver or tag name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The `tracing` level this event is logged at.
    pub fn level(&self) -> Level {
        match self.kind {
            EventKind::DoorsForcedClosed
            | EventKind::DriverFailed
            | EventKind::GraceExceeded => Level::ERROR,

            EventKind::RequestRejected
            | EventKind::HallCallReleased
            | EventKind::BackoffScheduled => Level::WARN,

            EventKind::HallCallAssigned
            | EventKind::HallCallCompleted
            | EventKind::RequestCompleted
            | EventKind::ShutdownRequested
            | EventKind::AllStoppedWithin
            | EventKind::DriverStarted
            | EventKind::DriverStopped => Level::INFO,

            EventKind::RequestAccepted
            | EventKind::HallCallCreated
            | EventKind::ElevatorMoved
            | EventKind::DoorsOpened
            | EventKind::DoorsClosed => Level::DEBUG,

            EventKind::TickAdvanced => Level::TRACE,
        }
    }
}
