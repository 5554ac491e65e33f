//! # Building: the single consistency boundary.
//!
//! [`Building`] owns every elevator, the hall-call queue and the request
//! history behind one `std::sync::Mutex`. Every operation that reads or writes
//! them takes that lock exactly once and never awaits while holding it.
//!
//! ## Architecture
//! ```text
//! request_journey(src, dst, tag)            advance_tick()
//!   ├─ validate floors     (no lock)          └─ lock ─┬─ 1. pending calls oldest-first
//!   ├─ RateLimiter::check  (limiter lock)              │     → Scheduler::select → can_accept → assign
//!   └─ lock ─┬─ HallCallQueue::get_or_create           ├─ 2. Elevator::step for E0..En
//!            ├─ record Request                         ├─ 3. finalize completed calls + requests
//!            └─ hold doors if the call is loading      └─ 4. gauges
//!   publish events (after unlock)                   publish events (after unlock)
//! ```
//!
//! ## Rules
//! - Validation and throttling rejections never touch the building lock.
//! - The limiter lock and the building lock are never held together.
//! - A poisoned lock is recovered: state is consistent between steps.
//! - Events are collected under the lock and published after it is released.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::clock::Clock;
use crate::config::Config;
use crate::dispatch::{Elevator, HallCallQueue, Request, Transition};
use crate::error::{DispatchError, RequestError};
use crate::events::{Bus, Event, EventKind};
use crate::metrics::{Counter, Gauge, MetricsSink};
use crate::policies::RateLimiter;
use crate::scheduler::Scheduler;
use crate::types::{CallDirection, ElevatorId, Floor, HallCallId, RequestId};

use super::builder::BuildingBuilder;
use super::report::{JourneyTicket, TickReport};
use super::snapshot::{BuildingSnapshot, ElevatorSnapshot, HallCallSnapshot};

struct State {
    elevators: Vec<Elevator>,
    calls: HallCallQueue,
    requests: BTreeMap<RequestId, Request>,
    /// Requests riding on each live hall call.
    waiting: HashMap<HallCallId, Vec<RequestId>>,
    next_request: u64,
    tick: u64,
}

/// The simulated building.
pub struct Building {
    cfg: Config,
    state: Mutex<State>,
    limiter: RateLimiter,
    scheduler: Box<dyn Scheduler>,
    metrics: Arc<dyn MetricsSink>,
    clock: Arc<dyn Clock>,
    bus: Bus,
}

impl Building {
    /// Validates `cfg` and builds a building with default collaborators.
    pub fn new(cfg: Config) -> Result<Self, crate::error::ConfigError> {
        Self::builder(cfg).build()
    }

    pub fn builder(cfg: Config) -> BuildingBuilder {
        BuildingBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: Config,
        scheduler: Box<dyn Scheduler>,
        metrics: Arc<dyn MetricsSink>,
        clock: Arc<dyn Clock>,
        bus: Bus,
    ) -> Self {
        let elevators = (0..cfg.elevator_count)
            .map(|i| {
                Elevator::new(
                    ElevatorId(i),
                    cfg.floor_count,
                    cfg.door_open_ticks,
                    cfg.max_loading_ticks,
                )
            })
            .collect();
        let state = State {
            elevators,
            calls: HallCallQueue::new(cfg.queue_capacity()),
            requests: BTreeMap::new(),
            waiting: HashMap::new(),
            next_request: 1,
            tick: 0,
        };
        Self {
            limiter: RateLimiter::from_config(&cfg.rate_limit),
            cfg,
            state: Mutex::new(state),
            scheduler,
            metrics,
            clock,
            bus,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    #[inline]
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    #[inline]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn scheduler_name(&self) -> &'static str {
        self.scheduler.name()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Submits one passenger journey.
    ///
    /// The journey is folded into the hall call for (`source`, its direction),
    /// creating the call if needed. Nothing is mutated on rejection.
    pub fn request_journey(
        &self,
        source: Floor,
        destination: Floor,
        tag: &str,
    ) -> Result<JourneyTicket, RequestError> {
        self.metrics.increment(Counter::RequestsTotal);
        match self.admit(source, destination, tag) {
            Ok((ticket, events)) => {
                self.metrics.increment(Counter::RequestsAccepted);
                events.into_iter().for_each(|ev| self.bus.publish(ev));
                Ok(ticket)
            }
            Err(err) => {
                self.metrics.increment(Counter::RequestsRejected);
                match err {
                    RequestError::RateLimited { .. } => self.metrics.increment(Counter::RateLimitHits),
                    RequestError::QueueFull { .. } => {
                        self.metrics.increment(Counter::QueueFullRejections)
                    }
                    _ => {}
                }
                self.bus.publish(
                    Event::new(EventKind::RequestRejected)
                        .with_floor(source)
                        .with_destination(destination)
                        .with_source(tag)
                        .with_reason(err.as_label()),
                );
                Err(err)
            }
        }
    }

    fn admit(
        &self,
        source: Floor,
        destination: Floor,
        tag: &str,
    ) -> Result<(JourneyTicket, Vec<Event>), RequestError> {
        let floor_count = self.cfg.floor_count;
        for floor in [source, destination] {
            if floor >= floor_count {
                return Err(RequestError::InvalidFloor { floor, floor_count });
            }
        }
        let direction = CallDirection::of_journey(source, destination)
            .ok_or(RequestError::SameFloor { floor: source })?;

        let now = self.clock.now();
        self.limiter
            .check(tag, now)
            .map_err(|scope| RequestError::RateLimited { scope })?;

        let mut events = Vec::with_capacity(2);
        let mut guard = self.lock();
        let st = &mut *guard;

        let fold = st.calls.get_or_create(source, direction, destination, now)?;
        let request_id = RequestId(st.next_request);
        st.next_request += 1;

        let mut request = Request::new(request_id, source, destination, tag, now);
        request.attach(fold.id);
        st.requests.insert(request_id, request);
        st.waiting.entry(fold.id).or_default().push(request_id);

        let call = fold.call;
        if !fold.created {
            if let Some(car) = call
                .assigned_elevator()
                .and_then(|id| st.elevators.get_mut(id.0))
            {
                if car.serves_on_close(&call, &st.calls) {
                    car.hold_doors();
                }
            }
        }
        drop(guard);

        if fold.created {
            events.push(
                Event::new(EventKind::HallCallCreated)
                    .with_call(fold.id)
                    .with_floor(source)
                    .with_direction(direction),
            );
        }
        events.push(
            Event::new(EventKind::RequestAccepted)
                .with_request(request_id)
                .with_call(fold.id)
                .with_floor(source)
                .with_destination(destination)
                .with_direction(direction)
                .with_source(tag),
        );

        Ok((
            JourneyTicket {
                request: request_id,
                call,
                created: fold.created,
            },
            events,
        ))
    }

    /// Advances the whole building by one tick.
    ///
    /// Errors are internal inconsistencies; the tick driver treats them as fatal.
    pub fn advance_tick(&self) -> Result<TickReport, DispatchError> {
        let now = self.clock.now();
        let mut events = Vec::new();

        let report = {
            let mut guard = self.lock();
            let st = &mut *guard;
            st.tick += 1;
            let mut report = TickReport {
                tick: st.tick,
                ..TickReport::default()
            };

            self.assign_pending(st, &mut report, &mut events)?;
            let completed = self.step_elevators(st, &mut report, &mut events)?;
            self.finalize(st, completed, now, &mut report, &mut events)?;

            self.metrics
                .set_gauge(Gauge::PendingCalls, st.calls.pending_count() as u64);
            let active = st.elevators.iter().filter(|e| !e.is_idle()).count();
            self.metrics.set_gauge(Gauge::ActiveElevators, active as u64);
            report
        };

        events.push(Event::new(EventKind::TickAdvanced).with_tick(report.tick));
        events.into_iter().for_each(|ev| self.bus.publish(ev));
        Ok(report)
    }

    fn assign_pending(
        &self,
        st: &mut State,
        report: &mut TickReport,
        events: &mut Vec<Event>,
    ) -> Result<(), DispatchError> {
        for id in st.calls.pending_ordered_by_age() {
            let call = st.calls.get(id).ok_or(DispatchError::UnknownCall(id))?;
            let Some(elevator) = self.scheduler.select(call, &st.elevators) else {
                continue;
            };
            let car = st
                .elevators
                .get_mut(elevator.0)
                .ok_or(DispatchError::UnknownElevator(elevator))?;
            if !car.can_accept(call) {
                continue;
            }
            car.assign(call)?;
            let (floor, direction) = call.key();

            st.calls
                .get_mut(id)
                .ok_or(DispatchError::UnknownCall(id))?
                .assign(elevator);
            report.assigned.push((id, elevator));
            events.push(
                Event::new(EventKind::HallCallAssigned)
                    .with_call(id)
                    .with_elevator(elevator)
                    .with_floor(floor)
                    .with_direction(direction)
                    .with_tick(report.tick),
            );
        }
        Ok(())
    }

    fn step_elevators(
        &self,
        st: &mut State,
        report: &mut TickReport,
        events: &mut Vec<Event>,
    ) -> Result<Vec<(HallCallId, ElevatorId)>, DispatchError> {
        let mut completed = Vec::new();
        for car in st.elevators.iter_mut() {
            let id = car.id();
            match car.step(&mut st.calls)? {
                Transition::Idle | Transition::DoorsHeld { .. } => {}
                Transition::Moved { to, direction, .. } => events.push(
                    Event::new(EventKind::ElevatorMoved)
                        .with_elevator(id)
                        .with_floor(to)
                        .with_direction(direction),
                ),
                Transition::DoorsOpened { floor } => events.push(
                    Event::new(EventKind::DoorsOpened)
                        .with_elevator(id)
                        .with_floor(floor),
                ),
                Transition::DoorsClosed {
                    floor,
                    forced,
                    completed: served,
                    released,
                } => {
                    if forced {
                        self.metrics.increment(Counter::StuckTransitions);
                        report.forced.push(id);
                        events.push(
                            Event::new(EventKind::DoorsForcedClosed)
                                .with_elevator(id)
                                .with_floor(floor)
                                .with_reason(format!(
                                    "loading for more than {} ticks",
                                    self.cfg.max_loading_ticks
                                )),
                        );
                    }
                    events.push(
                        Event::new(EventKind::DoorsClosed)
                            .with_elevator(id)
                            .with_floor(floor),
                    );
                    for call in released {
                        report.released.push(call);
                        let direction = st.calls.get(call).map(|c| c.direction());
                        let mut ev = Event::new(EventKind::HallCallReleased)
                            .with_call(call)
                            .with_elevator(id)
                            .with_floor(floor);
                        if let Some(direction) = direction {
                            ev = ev.with_direction(direction);
                        }
                        events.push(ev);
                    }
                    completed.extend(served.into_iter().map(|call| (call, id)));
                }
            }
        }
        Ok(completed)
    }

    fn finalize(
        &self,
        st: &mut State,
        completed: Vec<(HallCallId, ElevatorId)>,
        now: Instant,
        report: &mut TickReport,
        events: &mut Vec<Event>,
    ) -> Result<(), DispatchError> {
        for (id, elevator) in completed {
            let call = st.calls.remove(id).ok_or(DispatchError::UnknownCall(id))?;
            self.metrics.increment(Counter::CallsCompleted);
            report.completed.push(id);
            events.push(
                Event::new(EventKind::HallCallCompleted)
                    .with_call(id)
                    .with_elevator(elevator)
                    .with_floor(call.floor())
                    .with_direction(call.direction()),
            );

            for request_id in st.waiting.remove(&id).unwrap_or_default() {
                let Some(request) = st.requests.get_mut(&request_id) else {
                    continue;
                };
                request.complete(now);
                report.requests_completed += 1;
                let mut ev = Event::new(EventKind::RequestCompleted)
                    .with_request(request_id)
                    .with_call(id)
                    .with_elevator(elevator);
                if let Some(wait) = request.wait_time() {
                    self.metrics.observe_wait(wait);
                    ev = ev.with_delay(wait);
                }
                events.push(ev);
            }
        }
        Ok(())
    }

    /// Consistent copy of every elevator and live hall call.
    pub fn snapshot(&self) -> BuildingSnapshot {
        let st = self.lock();
        BuildingSnapshot {
            tick: st.tick,
            elevators: st.elevators.iter().map(ElevatorSnapshot::from).collect(),
            calls: st
                .calls
                .iter_by_age()
                .into_iter()
                .map(|c| {
                    let waiting = st.waiting.get(&c.id()).map_or(0, Vec::len);
                    HallCallSnapshot::new(c, waiting)
                })
                .collect(),
            requests: st.requests.len(),
        }
    }

    /// Copy of one journey's record.
    pub fn request(&self, id: RequestId) -> Option<Request> {
        self.lock().requests.get(&id).cloned()
    }
}
