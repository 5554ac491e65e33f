//! # liftsim
//!
//! **liftsim** simulates a bank of elevators serving hall calls in one
//! building, one discrete tick at a time.
//!
//! Passengers ask for journeys (`source → destination`). Journeys that share
//! a floor and direction fold into one hall call; a pluggable [`Scheduler`]
//! assigns pending calls to cars; each car sweeps in one direction until it
//! has nothing ahead, opening its doors at every stop.
//!
//! ## Architecture
//! ```text
//!       RequestGenerator                      TickDriver
//!     (every request_interval)              (every tick_interval)
//!               │ request_journey                   │ advance_tick
//!               ▼                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Building (one std::sync::Mutex)                                  │
//! │  - validation + RateLimiter        (before the lock)              │
//! │  - HallCallQueue: one call per (floor, direction)                 │
//! │  - Scheduler::select ─► Elevator::can_accept ─► Elevator::assign  │
//! │  - Elevator::step (move / doors open / doors close)               │
//! │  - MetricsSink counters and gauges                                │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   │ publish (after unlock)
//!                                   ▼
//!                     Bus (tokio::sync::broadcast)
//!                                   │
//!                       Simulation listener
//!                           ┌───────┴────────┐
//!                           ▼                ▼
//!                     AliveTracker     SubscriberSet
//!                                    ┌───────┼───────┐
//!                                    ▼       ▼       ▼
//!                                LogWriter  ...    custom
//! ```
//!
//! ### One tick
//! ```text
//! advance_tick:
//!   1. pending calls, oldest first: scheduler pick, re-checked with can_accept
//!   2. every elevator, by id:
//!        Idle    + destinations ─► pick heading, move one floor
//!        Moving  ─► at a destination: open doors, drop it from the set
//!        Loading ─► count down; at zero (or stuck past the threshold) close:
//!                     matching calls complete and fold in their destinations,
//!                     mismatched calls go back to pending
//!   3. gauges, TickAdvanced
//! ```
//!
//! ## Modules
//! | Area            | Description                                          | Key types                                  |
//! |-----------------|------------------------------------------------------|--------------------------------------------|
//! | **Building**    | The aggregate and its two mutating operations.       | [`Building`], [`BuildingSnapshot`]         |
//! | **Dispatch**    | Cars, hall calls, the call queue, journeys.          | [`dispatch::Elevator`], [`dispatch::HallCall`] |
//! | **Scheduling**  | Which car takes a call.                              | [`Scheduler`], [`NearestCarScheduler`]     |
//! | **Runtime**     | Background drivers and graceful shutdown.            | [`Simulation`], [`Driver`]                 |
//! | **Events**      | Everything observable, with a log level.             | [`Event`], [`EventKind`], [`Bus`]          |
//! | **Subscribers** | Event consumers.                                     | [`Subscribe`], [`LogWriter`]               |
//! | **Policies**    | Admission throttling and generator backoff.          | [`RateLimiter`], [`BackoffPolicy`]         |
//! | **Errors**      | Typed errors with stable labels.                     | [`RequestError`], [`RuntimeError`]         |
//!
//! ## Example
//! ```rust
//! use liftsim::{Building, Config, ElevatorState};
//!
//! let cfg = Config { floor_count: 10, elevator_count: 1, ..Config::default() };
//! let building = Building::new(cfg).unwrap();
//!
//! let ticket = building.request_journey(5, 8, "lobby").unwrap();
//! assert_eq!(ticket.call.floor(), 5);
//!
//! while !building.snapshot().is_quiescent() {
//!     building.advance_tick().unwrap();
//! }
//! let car = &building.snapshot().elevators[0];
//! assert_eq!(car.floor, 8);
//! assert_eq!(car.state, ElevatorState::Idle);
//! ```

mod building;
mod clock;
mod config;
mod error;
mod events;
mod metrics;
mod policies;
mod runtime;
mod scheduler;
mod subscribers;
mod types;

pub mod dispatch;

// ---- Public re-exports ----

pub use building::{
    Building, BuildingBuilder, BuildingSnapshot, ElevatorSnapshot, HallCallSnapshot,
    JourneyTicket, TickReport,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{Config, RateLimitConfig};
pub use error::{
    ConfigError, DestinationError, DispatchError, DriverError, ParseError, RequestError,
    RuntimeError,
};
pub use events::{Bus, Event, EventKind};
pub use metrics::{Counter, Gauge, InMemoryMetrics, MetricsSink, MetricsSnapshot, NoopMetrics};
pub use policies::{BackoffPolicy, JitterPolicy, RateLimitScope, RateLimiter};
pub use runtime::{
    AliveTracker, Driver, JourneyPicker, RequestGenerator, Simulation, TickDriver,
    uniform_journey, wait_for_shutdown_signal,
};
pub use scheduler::{NearestCarScheduler, Scheduler};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use types::{
    CallDirection, Direction, ElevatorId, ElevatorState, Floor, HallCallId, HallCallStatus,
    RequestId, RequestStatus,
};
