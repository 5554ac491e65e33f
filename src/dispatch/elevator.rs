//! # Elevator car: acceptance predicate and per-tick state machine.
//!
//! An [`Elevator`] owns its [`DestinationSet`], its position, its operating
//! state, the door countdown and the ids of the hall calls it accepted.
//! The building calls [`Elevator::step`] exactly once per tick.
//!
//! ## State machine
//! ```text
//!             assign()                      current floor is a destination
//!   Idle ───────────────► (active) ──────────────────────────────────────► Loading
//!    ▲                      │  ▲                                             │
//!    │                      │  └── next_destination(): move one floor ──┐    │ door timer hits 0
//!    │                      └───────────────────────────────────────────┘    │ (or stuck threshold:
//!    │                                                                       │  forced close)
//!    └───────────── destinations empty ◄──── close doors ◄───────────────────┘
//!                                             ├─ complete accepted calls here (heading matches)
//!                                             ├─ fold their destinations in
//!                                             └─ release mismatched calls → Pending
//! ```
//!
//! ## Rules
//! - The destination is removed when the doors **open**; hall calls complete
//!   when the doors **close**, so a journey merged into a call during loading
//!   is still picked up at this stop.
//! - A call at the floor whose direction differs from the heading is served by
//!   reversing only if no destinations remain ahead; otherwise it is released.
//! - The stuck counter counts loading ticks and resets on every close; crossing
//!   the threshold forces exactly one close per episode.
//! - A merge holds the doors only for a call the coming close completes
//!   ([`Elevator::serves_on_close`]).
//! - Acceptance invariants are checked in [`Elevator::can_accept`] only.

use std::collections::BTreeSet;

use crate::error::DispatchError;
use crate::types::{CallDirection, Direction, ElevatorId, ElevatorState, Floor, HallCallId};

use super::destinations::DestinationSet;
use super::hall_call::HallCall;
use super::queue::HallCallQueue;

/// What one call to [`Elevator::step`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Nothing to do.
    Idle,
    /// Moved one floor.
    Moved {
        from: Floor,
        to: Floor,
        direction: Direction,
    },
    /// Arrived at a destination and opened the doors.
    DoorsOpened { floor: Floor },
    /// Doors still open.
    DoorsHeld { floor: Floor, remaining: u32 },
    /// Doors closed; lists the hall calls completed and released at this floor.
    DoorsClosed {
        floor: Floor,
        forced: bool,
        completed: Vec<HallCallId>,
        released: Vec<HallCallId>,
    },
}

/// One elevator car.
#[derive(Debug, Clone)]
pub struct Elevator {
    id: ElevatorId,
    floor: Floor,
    state: ElevatorState,
    destinations: DestinationSet,
    accepted: BTreeSet<HallCallId>,
    door_timer: u32,
    loading_ticks: u32,
    door_open_ticks: u32,
    max_loading_ticks: u32,
}

impl Elevator {
    /// An idle car at floor 0.
    pub fn new(
        id: ElevatorId,
        floor_count: usize,
        door_open_ticks: u32,
        max_loading_ticks: u32,
    ) -> Self {
        Self {
            id,
            floor: 0,
            state: ElevatorState::Idle,
            destinations: DestinationSet::new(floor_count),
            accepted: BTreeSet::new(),
            door_timer: 0,
            loading_ticks: 0,
            door_open_ticks: door_open_ticks.max(1),
            max_loading_ticks,
        }
    }

    #[inline]
    pub fn id(&self) -> ElevatorId {
        self.id
    }

    #[inline]
    pub fn floor(&self) -> Floor {
        self.floor
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.destinations.heading()
    }

    #[inline]
    pub fn state(&self) -> ElevatorState {
        self.state
    }

    #[inline]
    pub fn destinations(&self) -> &DestinationSet {
        &self.destinations
    }

    /// Accepted hall-call ids, ascending.
    pub fn accepted_calls(&self) -> impl Iterator<Item = HallCallId> + '_ {
        self.accepted.iter().copied()
    }

    #[inline]
    pub fn door_timer(&self) -> u32 {
        self.door_timer
    }

    /// Consecutive ticks spent loading in the current episode.
    #[inline]
    pub fn loading_ticks(&self) -> u32 {
        self.loading_ticks
    }

    #[inline]
    pub fn doors_open(&self) -> bool {
        self.state == ElevatorState::Loading
    }

    /// Idle with nothing to do. A car assigned earlier in the same tick is not idle.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == ElevatorState::Idle && self.destinations.is_empty()
    }

    /// True if this car may take `call` without breaking its sweep.
    pub fn can_accept(&self, call: &HallCall) -> bool {
        if self.doors_open() && self.floor == call.floor() && self.direction() == call.direction() {
            return false;
        }
        if self.is_idle() {
            return true;
        }
        if self.direction() != call.direction() {
            return false;
        }
        let Some(furthest) = self.destinations.furthest_destination() else {
            return false;
        };
        match self.direction() {
            Direction::Up => call.floor() > self.floor && call.floor() <= furthest,
            Direction::Down => call.floor() < self.floor && call.floor() >= furthest,
            Direction::Idle => false,
        }
    }

    /// Takes responsibility for `call`: records it and adds its floor as a destination.
    ///
    /// An idle car first turns toward the call (or, if already there, to the
    /// call's own direction).
    pub fn assign(&mut self, call: &HallCall) -> Result<(), DispatchError> {
        if self.is_idle() {
            let heading = match Direction::between(self.floor, call.floor()) {
                Direction::Idle => call.direction().into(),
                toward => toward,
            };
            self.destinations.set_heading(heading, self.floor);
        }
        self.destinations
            .add(call.floor())
            .map_err(|source| DispatchError::Destination {
                elevator: self.id,
                source,
            })?;
        self.accepted.insert(call.id());
        Ok(())
    }

    /// True if `call` is accepted here with the doors open and the coming
    /// close will complete it rather than release it.
    pub fn serves_on_close(&self, call: &HallCall, calls: &HallCallQueue) -> bool {
        if !self.doors_open() || self.floor != call.floor() || !self.accepted.contains(&call.id()) {
            return false;
        }
        let here: Vec<CallDirection> = self
            .accepted
            .iter()
            .filter_map(|&id| calls.get(id))
            .filter(|c| c.floor() == self.floor)
            .map(HallCall::direction)
            .collect();
        self.closing_heading(&here) == call.direction()
    }

    /// Keeps the doors open for another full door cycle. Returns `false` if closed.
    pub fn hold_doors(&mut self) -> bool {
        if self.doors_open() {
            self.door_timer = self.door_open_ticks;
            true
        } else {
            false
        }
    }

    /// Advances this car by one tick.
    ///
    /// Calls completed or released at a door close are updated in `calls`
    /// directly; the caller finalizes them.
    pub fn step(&mut self, calls: &mut HallCallQueue) -> Result<Transition, DispatchError> {
        match self.state {
            ElevatorState::Loading => self.step_loading(calls),
            ElevatorState::Idle if self.destinations.is_empty() => Ok(Transition::Idle),
            _ => Ok(self.step_active()),
        }
    }

    fn step_loading(&mut self, calls: &mut HallCallQueue) -> Result<Transition, DispatchError> {
        self.loading_ticks += 1;
        self.door_timer = self.door_timer.saturating_sub(1);

        let forced = self.loading_ticks > self.max_loading_ticks;
        if forced {
            self.door_timer = 0;
        }
        if self.door_timer > 0 {
            return Ok(Transition::DoorsHeld {
                floor: self.floor,
                remaining: self.door_timer,
            });
        }
        self.close_doors(calls, forced)
    }

    fn step_active(&mut self) -> Transition {
        if self.destinations.remove(self.floor) {
            self.state = ElevatorState::Loading;
            self.door_timer = self.door_open_ticks;
            self.loading_ticks = 0;
            return Transition::DoorsOpened { floor: self.floor };
        }

        let Some(target) = self.destinations.next_destination(self.floor) else {
            self.go_idle();
            return Transition::Idle;
        };
        let from = self.floor;
        let direction = Direction::between(from, target);
        self.floor = match direction {
            Direction::Up => from + 1,
            Direction::Down => from - 1,
            Direction::Idle => from,
        };
        self.destinations.set_heading(direction, self.floor);
        self.state = ElevatorState::Moving;
        Transition::Moved {
            from,
            to: self.floor,
            direction,
        }
    }

    fn close_doors(
        &mut self,
        calls: &mut HallCallQueue,
        forced: bool,
    ) -> Result<Transition, DispatchError> {
        let floor = self.floor;
        self.door_timer = 0;
        self.loading_ticks = 0;

        let mut here = Vec::new();
        for &id in &self.accepted {
            let call = calls.get(id).ok_or(DispatchError::UnknownCall(id))?;
            if call.floor() == floor {
                here.push((id, call.direction()));
            }
        }

        let dirs: Vec<CallDirection> = here.iter().map(|&(_, dir)| dir).collect();
        let heading = self.closing_heading(&dirs);
        if heading != self.direction() {
            self.destinations.set_heading(heading, floor);
        }

        let mut completed = Vec::new();
        let mut released = Vec::new();
        for (id, dir) in here {
            self.accepted.remove(&id);
            let call = calls.get_mut(id).ok_or(DispatchError::UnknownCall(id))?;
            if self.direction() == dir {
                call.complete();
                let boarding: Vec<Floor> = call.destinations().collect();
                for destination in boarding {
                    self.destinations
                        .add(destination)
                        .map_err(|source| DispatchError::Destination {
                            elevator: self.id,
                            source,
                        })?;
                }
                completed.push(id);
            } else {
                call.release();
                released.push(id);
            }
        }

        if self.destinations.is_empty() {
            self.go_idle();
        } else {
            self.state = ElevatorState::Moving;
        }
        Ok(Transition::DoorsClosed {
            floor,
            forced,
            completed,
            released,
        })
    }

    /// Heading the car leaves with, given the directions of the accepted calls
    /// at this floor (ascending call id). It reverses only when no call matches
    /// the current heading and nothing is left ahead.
    fn closing_heading(&self, here: &[CallDirection]) -> Direction {
        let heading = self.direction();
        if here.iter().any(|&dir| heading == dir) || self.destinations.has_ahead(self.floor) {
            return heading;
        }
        here.first().map_or(heading, |&dir| dir.into())
    }

    fn go_idle(&mut self) {
        self.state = ElevatorState::Idle;
        self.destinations.set_heading(Direction::Idle, self.floor);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::types::HallCallStatus;

    const DOOR_TICKS: u32 = 2;

    fn car() -> Elevator {
        Elevator::new(ElevatorId(0), 10, DOOR_TICKS, 6)
    }

    fn call(q: &mut HallCallQueue, floor: Floor, destination: Floor) -> HallCallId {
        let dir = CallDirection::of_journey(floor, destination).expect("distinct floors");
        q.get_or_create(floor, dir, destination, Instant::now())
            .expect("room")
            .id
    }

    fn assign(car: &mut Elevator, q: &mut HallCallQueue, id: HallCallId) {
        let c = q.get(id).expect("present").clone();
        assert!(car.can_accept(&c), "car should accept {c:?}");
        car.assign(&c).expect("assign");
        q.get_mut(id).expect("present").assign(car.id());
    }

    fn run_until_idle(car: &mut Elevator, q: &mut HallCallQueue) -> Vec<Transition> {
        let mut trace = Vec::new();
        for _ in 0..100 {
            let t = car.step(q).expect("step");
            if t == Transition::Idle {
                return trace;
            }
            trace.push(t);
        }
        panic!("car never went idle: {trace:?}");
    }

    #[test]
    fn idle_without_destinations_stays_idle() {
        let mut c = car();
        let mut q = HallCallQueue::for_floors(10);
        assert_eq!(c.step(&mut q), Ok(Transition::Idle));
        assert_eq!(c.state(), ElevatorState::Idle);
        assert_eq!(c.direction(), Direction::Idle);
    }

    #[test]
    fn idle_car_accepts_any_call_then_commits_to_its_direction() {
        let mut c = car();
        let mut q = HallCallQueue::for_floors(10);
        let first = call(&mut q, 5, 8);
        assign(&mut c, &mut q, first);
        assert_eq!(c.direction(), Direction::Up);
        assert!(!c.is_idle());

        let down = call(&mut q, 3, 1);
        assert!(!c.can_accept(q.get(down).expect("present")));

        let on_the_way = call(&mut q, 4, 9);
        assert!(c.can_accept(q.get(on_the_way).expect("present")));

        let beyond = call(&mut q, 6, 9);
        assert!(!c.can_accept(q.get(beyond).expect("present")));
    }

    #[test]
    fn picks_up_and_delivers() {
        let mut c = car();
        let mut q = HallCallQueue::for_floors(10);
        let id = call(&mut q, 3, 5);
        assign(&mut c, &mut q, id);

        let trace = run_until_idle(&mut c, &mut q);
        let moves: Vec<Floor> = trace
            .iter()
            .filter_map(|t| match t {
                Transition::Moved { to, .. } => Some(*to),
                _ => None,
            })
            .collect();
        assert_eq!(moves, vec![1, 2, 3, 4, 5]);

        let closes: Vec<&Transition> = trace
            .iter()
            .filter(|t| matches!(t, Transition::DoorsClosed { .. }))
            .collect();
        assert_eq!(
            closes[0],
            &Transition::DoorsClosed {
                floor: 3,
                forced: false,
                completed: vec![id],
                released: vec![],
            }
        );
        assert_eq!(q.get(id).map(HallCall::status), Some(HallCallStatus::Completed));
        assert_eq!(c.floor(), 5);
        assert!(c.destinations().is_empty());
        assert_eq!(c.accepted_calls().count(), 0);
    }

    #[test]
    fn doors_stay_open_for_configured_ticks() {
        let mut c = car();
        let mut q = HallCallQueue::for_floors(10);
        let id = call(&mut q, 0, 2);
        assign(&mut c, &mut q, id);

        assert_eq!(c.step(&mut q), Ok(Transition::DoorsOpened { floor: 0 }));
        assert_eq!(c.door_timer(), DOOR_TICKS);
        assert_eq!(
            c.step(&mut q),
            Ok(Transition::DoorsHeld { floor: 0, remaining: 1 })
        );
        assert!(matches!(
            c.step(&mut q),
            Ok(Transition::DoorsClosed { floor: 0, forced: false, .. })
        ));
        assert_eq!(c.state(), ElevatorState::Moving);
        assert!(c.destinations().contains(2));
    }

    #[test]
    fn doors_open_guard_rejects_same_floor_same_direction() {
        let mut c = car();
        let mut q = HallCallQueue::for_floors(10);
        let id = call(&mut q, 0, 4);
        assign(&mut c, &mut q, id);
        c.step(&mut q).expect("open");
        assert!(c.doors_open());

        let same = HallCall::new(HallCallId(99), 0, CallDirection::Up, Instant::now());
        assert!(!c.can_accept(&same));
    }

    #[test]
    fn held_doors_force_close_once_past_threshold() {
        let mut c = car();
        let mut q = HallCallQueue::for_floors(10);
        let id = call(&mut q, 0, 3);
        assign(&mut c, &mut q, id);
        c.step(&mut q).expect("open");

        let mut forced = 0;
        let mut closed_at = None;
        for tick in 1..=20 {
            c.hold_doors();
            match c.step(&mut q).expect("step") {
                Transition::DoorsClosed { forced: true, .. } => {
                    forced += 1;
                    closed_at = Some(tick);
                    break;
                }
                Transition::DoorsClosed { forced: false, .. } => panic!("closed unforced"),
                _ => {}
            }
        }
        assert_eq!(forced, 1);
        assert_eq!(closed_at, Some(7));
        assert_eq!(c.loading_ticks(), 0);
        assert_eq!(q.get(id).map(HallCall::status), Some(HallCallStatus::Completed));
        assert!(!c.hold_doors());
    }

    #[test]
    fn reverses_for_opposite_call_when_nothing_ahead() {
        let mut c = car();
        let mut q = HallCallQueue::for_floors(10);
        let id = call(&mut q, 5, 2);
        assign(&mut c, &mut q, id);
        assert_eq!(c.direction(), Direction::Up);

        let trace = run_until_idle(&mut c, &mut q);
        assert!(trace.contains(&Transition::DoorsClosed {
            floor: 5,
            forced: false,
            completed: vec![id],
            released: vec![],
        }));
        assert_eq!(c.floor(), 2);
    }

    #[test]
    fn releases_opposite_call_when_destinations_remain_ahead() {
        let mut c = car();
        let mut q = HallCallQueue::for_floors(10);
        let down = call(&mut q, 5, 2);
        assign(&mut c, &mut q, down);
        c.step(&mut q).expect("move to 1");

        let up = call(&mut q, 3, 8);
        assign(&mut c, &mut q, up);

        let mut released = Vec::new();
        for _ in 0..40 {
            if let Transition::DoorsClosed { floor: 5, released: r, .. } = c.step(&mut q).expect("step") {
                released = r;
                break;
            }
        }
        assert_eq!(released, vec![down]);
        let call = q.get(down).expect("present");
        assert!(call.is_pending());
        assert_eq!(call.assigned_elevator(), None);
        assert_eq!(c.state(), ElevatorState::Moving);
        assert!(c.destinations().contains(8));
    }

    fn step_until_open_at(car: &mut Elevator, q: &mut HallCallQueue, floor: Floor) {
        for _ in 0..40 {
            if car.step(q).expect("step") == (Transition::DoorsOpened { floor }) {
                return;
            }
        }
        panic!("doors never opened at {floor}");
    }

    #[test]
    fn serves_on_close_follows_the_release_rule() {
        let mut c = car();
        let mut q = HallCallQueue::for_floors(10);
        let down = call(&mut q, 5, 2);
        assign(&mut c, &mut q, down);
        c.step(&mut q).expect("move to 1");
        let up = call(&mut q, 3, 8);
        assign(&mut c, &mut q, up);

        step_until_open_at(&mut c, &mut q, 5);
        let waiting = q.get(down).expect("present").clone();
        assert!(c.destinations().has_ahead(5));
        assert!(!c.serves_on_close(&waiting, &q));

        let mut lone = car();
        let mut q = HallCallQueue::for_floors(10);
        let id = call(&mut q, 5, 2);
        assign(&mut lone, &mut q, id);
        assert!(!lone.serves_on_close(q.get(id).expect("present"), &q));
        step_until_open_at(&mut lone, &mut q, 5);
        assert!(lone.serves_on_close(q.get(id).expect("present"), &q));
    }

    #[test]
    fn call_at_current_floor_opens_immediately_in_call_direction() {
        let mut c = car();
        let mut q = HallCallQueue::for_floors(10);
        let id = call(&mut q, 0, 6);
        assign(&mut c, &mut q, id);
        assert_eq!(c.direction(), Direction::Up);
        assert_eq!(c.step(&mut q), Ok(Transition::DoorsOpened { floor: 0 }));
    }

    #[test]
    fn unknown_accepted_call_is_a_dispatch_error() {
        let mut c = car();
        let mut q = HallCallQueue::for_floors(10);
        let id = call(&mut q, 0, 6);
        assign(&mut c, &mut q, id);
        c.step(&mut q).expect("open");
        q.remove(id);
        c.step(&mut q).expect("held");
        assert_eq!(c.step(&mut q), Err(DispatchError::UnknownCall(id)));
    }
}
