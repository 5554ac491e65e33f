use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use super::*;
use crate::clock::ManualClock;
use crate::config::{Config, RateLimitConfig};
use crate::dispatch::{Elevator, HallCall};
use crate::error::{DispatchError, RequestError};
use crate::events::EventKind;
use crate::metrics::InMemoryMetrics;
use crate::policies::RateLimitScope;
use crate::types::{ElevatorId, ElevatorState, Floor, HallCallStatus, RequestStatus};

const TICK: Duration = Duration::from_secs(1);

fn cfg(floors: usize, elevators: usize) -> Config {
    Config {
        floor_count: floors,
        elevator_count: elevators,
        rate_limit: RateLimitConfig {
            window_secs: 60,
            global_limit: 0,
            per_tag_limit: 0,
        },
        ..Config::default()
    }
}

struct Rig {
    building: Building,
    clock: Arc<ManualClock>,
    metrics: Arc<InMemoryMetrics>,
}

impl Rig {
    fn new(cfg: Config) -> Self {
        Self::with(Building::builder(cfg))
    }

    fn with(builder: BuildingBuilder) -> Self {
        let clock = Arc::new(ManualClock::new());
        let metrics = Arc::new(InMemoryMetrics::new());
        let building = builder
            .with_clock(Arc::clone(&clock))
            .with_metrics(Arc::clone(&metrics))
            .build()
            .expect("valid config");
        Self {
            building,
            clock,
            metrics,
        }
    }

    fn tick(&self) -> TickReport {
        self.clock.advance(TICK);
        self.building.advance_tick().expect("tick")
    }

    fn run_until_quiescent(&self, max_ticks: usize) -> Vec<TickReport> {
        let mut reports = Vec::new();
        for _ in 0..max_ticks {
            reports.push(self.tick());
            if self.building.snapshot().is_quiescent() {
                return reports;
            }
        }
        panic!("building did not settle within {max_ticks} ticks");
    }
}

#[test]
fn single_journey_moves_loads_and_delivers() {
    let rig = Rig::new(cfg(10, 1));
    let ticket = rig.building.request_journey(5, 8, "lobby").expect("accepted");

    let mut trace = Vec::new();
    for _ in 0..30 {
        rig.tick();
        let snap = rig.building.snapshot();
        let car = &snap.elevators[0];
        trace.push((car.state, car.floor));
        if snap.is_quiescent() {
            break;
        }
    }

    use ElevatorState::{Idle, Loading, Moving};
    assert_eq!(
        trace,
        vec![
            (Moving, 1),
            (Moving, 2),
            (Moving, 3),
            (Moving, 4),
            (Moving, 5),
            (Loading, 5),
            (Loading, 5),
            (Loading, 5),
            (Moving, 5),
            (Moving, 6),
            (Moving, 7),
            (Moving, 8),
            (Loading, 8),
            (Loading, 8),
            (Loading, 8),
            (Idle, 8),
        ]
    );

    let snap = rig.building.snapshot();
    assert!(snap.elevators[0].destinations.is_empty());
    let request = rig.building.request(ticket.request).expect("recorded");
    assert_eq!(request.status(), RequestStatus::Completed);
    assert!(request.wait_time().expect("completed") > Duration::ZERO);
    assert_eq!(request.wait_time(), Some(TICK * 9));

    let m = rig.metrics.snapshot();
    assert_eq!(m.calls_completed, 1);
    assert_eq!(m.requests_accepted, 1);
    assert_eq!(m.waits_observed, 1);
    assert_eq!(m.pending_calls, 0);
    assert_eq!(m.active_elevators, 0);
}

#[test]
fn journeys_from_one_floor_share_a_hall_call() {
    let rig = Rig::new(cfg(10, 1));
    let first = rig.building.request_journey(3, 8, "a").expect("accepted");
    let second = rig.building.request_journey(3, 9, "b").expect("accepted");

    assert!(first.created);
    assert!(!second.created);
    assert_eq!(first.call.id(), second.call.id());
    assert_eq!(second.call.destinations().collect::<Vec<_>>(), vec![8, 9]);

    let snap = rig.building.snapshot();
    assert_eq!(snap.calls.len(), 1);
    assert_eq!(snap.calls[0].waiting, 2);

    let report = rig.tick();
    assert_eq!(report.assigned, vec![(first.call.id(), ElevatorId(0))]);

    let reports = rig.run_until_quiescent(40);
    let pickup = reports
        .iter()
        .find(|r| !r.completed.is_empty())
        .expect("call served");
    assert_eq!(pickup.completed, vec![first.call.id()]);
    assert_eq!(pickup.requests_completed, 2);
    assert!(reports.iter().all(|r| r.assigned.is_empty()));

    for id in [first.request, second.request] {
        let r = rig.building.request(id).expect("recorded");
        assert_eq!(r.status(), RequestStatus::Completed);
    }
    assert_eq!(rig.building.snapshot().elevators[0].floor, 9);
}

#[test]
fn global_rate_limit_rejects_the_third_request() {
    let mut c = cfg(10, 1);
    c.rate_limit.global_limit = 2;
    let rig = Rig::new(c);
    let mut rx = rig.building.bus().subscribe();

    assert!(rig.building.request_journey(0, 1, "t").is_ok());
    assert!(rig.building.request_journey(2, 3, "t").is_ok());
    let third = rig.building.request_journey(4, 5, "t");
    assert_eq!(
        third,
        Err(RequestError::RateLimited {
            scope: RateLimitScope::Global
        })
    );
    assert!(third.as_ref().is_err_and(RequestError::is_retryable));

    let m = rig.metrics.snapshot();
    assert_eq!(m.requests_total, 3);
    assert_eq!(m.requests_rejected, 1);
    assert_eq!(m.rate_limit_hits, 1);
    assert_eq!(rig.building.snapshot().calls.len(), 2);

    let mut rejected = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        if ev.kind == EventKind::RequestRejected {
            rejected.push(ev);
        }
    }
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0].reason.as_deref(), Some("request_rate_limited"));
}

#[test]
fn per_tag_limit_only_throttles_that_tag() {
    let mut c = cfg(10, 1);
    c.rate_limit.per_tag_limit = 1;
    let rig = Rig::new(c);

    assert!(rig.building.request_journey(0, 1, "noisy").is_ok());
    assert!(matches!(
        rig.building.request_journey(2, 3, "noisy"),
        Err(RequestError::RateLimited {
            scope: RateLimitScope::Tag(_)
        })
    ));
    assert!(rig.building.request_journey(2, 3, "quiet").is_ok());
}

#[test]
fn invalid_requests_are_rejected_without_mutation() {
    let rig = Rig::new(cfg(10, 1));
    assert_eq!(
        rig.building.request_journey(10, 2, "t"),
        Err(RequestError::InvalidFloor {
            floor: 10,
            floor_count: 10
        })
    );
    assert_eq!(
        rig.building.request_journey(2, 12, "t"),
        Err(RequestError::InvalidFloor {
            floor: 12,
            floor_count: 10
        })
    );
    assert_eq!(
        rig.building.request_journey(4, 4, "t"),
        Err(RequestError::SameFloor { floor: 4 })
    );

    let snap = rig.building.snapshot();
    assert_eq!(snap.requests, 0);
    assert!(snap.calls.is_empty());
    assert_eq!(rig.metrics.snapshot().requests_rejected, 3);
}

#[test]
fn floor_zero_is_a_destination() {
    let rig = Rig::new(cfg(6, 1));
    let ticket = rig.building.request_journey(4, 0, "t").expect("accepted");
    rig.run_until_quiescent(40);
    assert_eq!(rig.building.snapshot().elevators[0].floor, 0);
    let request = rig.building.request(ticket.request).expect("recorded");
    assert_eq!(request.status(), RequestStatus::Completed);
}

#[test]
fn queue_never_exceeds_its_capacity() {
    let rig = Rig::new(cfg(4, 1));
    let capacity = rig.building.config().queue_capacity();
    assert_eq!(capacity, 6);

    for source in 0..4 {
        for destination in 0..4 {
            if source != destination {
                rig.building
                    .request_journey(source, destination, "t")
                    .expect("every journey maps to an existing slot");
            }
        }
    }
    let snap = rig.building.snapshot();
    assert_eq!(snap.calls.len(), capacity);
    assert_eq!(snap.requests, 12);
}

#[test]
fn oldest_assignable_call_wins() {
    let rig = Rig::new(cfg(10, 1));
    let older = rig.building.request_journey(7, 5, "t").expect("accepted");
    let newer = rig.building.request_journey(3, 1, "t").expect("accepted");

    let report = rig.tick();
    assert_eq!(report.assigned, vec![(older.call.id(), ElevatorId(0))]);

    let snap = rig.building.snapshot();
    let pending: Vec<_> = snap.pending().map(|c| c.id).collect();
    assert_eq!(pending, vec![newer.call.id()]);
}

#[test]
fn call_waiting_for_a_busy_car_is_eventually_assigned() {
    let rig = Rig::new(cfg(10, 1));
    rig.building.request_journey(0, 9, "t").expect("accepted");
    rig.tick();
    rig.tick();
    let waiting = rig.building.request_journey(1, 0, "t").expect("accepted");

    let mut assigned_at = None;
    for _ in 0..40 {
        let report = rig.tick();
        if report.assigned.iter().any(|(id, _)| *id == waiting.call.id()) {
            assigned_at = Some(report.tick);
            break;
        }
    }
    assert!(assigned_at.is_some(), "call was never assigned");
    rig.run_until_quiescent(60);
    let r = rig.building.request(waiting.request).expect("recorded");
    assert_eq!(r.status(), RequestStatus::Completed);
}

#[test]
fn held_doors_force_close_exactly_once() {
    let mut c = cfg(10, 1);
    c.door_open_ticks = 2;
    c.max_loading_ticks = 3;
    let rig = Rig::new(c);
    let mut rx = rig.building.bus().subscribe();

    rig.building.request_journey(0, 5, "a").expect("accepted");
    let first = rig.tick();
    assert_eq!(first.assigned.len(), 1);
    assert_eq!(rig.building.snapshot().elevators[0].state, ElevatorState::Loading);

    let mut forced_at = Vec::new();
    for _ in 0..10 {
        rig.building.request_journey(0, 6, "b").expect("merged");
        let report = rig.tick();
        if !report.forced.is_empty() {
            forced_at.push(report.tick);
        }
        if !report.completed.is_empty() {
            break;
        }
    }
    assert_eq!(forced_at, vec![5]);

    let rest = rig.run_until_quiescent(40);
    assert!(rest.iter().all(|r| r.forced.is_empty()));
    assert_eq!(rig.metrics.snapshot().stuck_transitions, 1);

    let mut forced_events = 0;
    while let Ok(ev) = rx.try_recv() {
        if ev.kind == EventKind::DoorsForcedClosed {
            assert_eq!(ev.level(), tracing::Level::ERROR);
            assert_eq!(ev.elevator, Some(ElevatorId(0)));
            forced_events += 1;
        }
    }
    assert_eq!(forced_events, 1);
}

#[test]
fn journey_merged_while_loading_boards_at_this_stop() {
    let mut c = cfg(10, 1);
    c.door_open_ticks = 3;
    c.max_loading_ticks = 10;
    let rig = Rig::new(c);

    let first = rig.building.request_journey(4, 6, "a").expect("accepted");
    let mut opened = false;
    for _ in 0..10 {
        rig.tick();
        let car = &rig.building.snapshot().elevators[0];
        if car.state == ElevatorState::Loading && car.floor == 4 {
            opened = true;
            break;
        }
    }
    assert!(opened, "car never opened at 4");
    rig.tick();
    assert_eq!(rig.building.snapshot().elevators[0].door_timer, 2);

    let late = rig.building.request_journey(4, 9, "b").expect("merged");
    assert!(!late.created);
    assert_eq!(late.call.id(), first.call.id());
    assert_eq!(rig.building.snapshot().elevators[0].door_timer, 3);

    let mut reports = Vec::new();
    loop {
        let report = rig.tick();
        let done = !report.completed.is_empty();
        reports.push(report);
        if done || reports.len() > 10 {
            break;
        }
    }
    let pickup = reports.last().expect("ticked");
    assert_eq!(pickup.completed, vec![first.call.id()]);
    assert_eq!(pickup.requests_completed, 2);
    assert!(pickup.forced.is_empty());

    let car = &rig.building.snapshot().elevators[0];
    assert_eq!(car.floor, 4);
    assert_eq!(car.destinations, vec![6, 9]);

    reports.extend(rig.run_until_quiescent(40));
    assert!(reports.iter().all(|r| r.assigned.is_empty()));
    let r = rig.building.request(late.request).expect("recorded");
    assert_eq!(r.status(), RequestStatus::Completed);
    assert_eq!(rig.building.snapshot().elevators[0].floor, 9);
}

#[test]
fn merges_into_a_call_due_for_release_do_not_hold_doors() {
    let mut c = cfg(10, 1);
    c.door_open_ticks = 2;
    c.max_loading_ticks = 4;
    let rig = Rig::new(c);

    let down = rig.building.request_journey(5, 2, "a").expect("accepted");
    rig.tick();
    rig.building.request_journey(3, 8, "b").expect("accepted");

    let mut released = false;
    let mut loading_at_five = 0;
    for _ in 0..30 {
        let car = rig.building.snapshot().elevators[0].clone();
        if car.state == ElevatorState::Loading && car.floor == 5 {
            loading_at_five += 1;
            rig.building.request_journey(5, 1, "c").expect("merged");
            assert_eq!(rig.building.snapshot().elevators[0].door_timer, car.door_timer);
        }
        let report = rig.tick();
        assert!(report.forced.is_empty(), "doors forced at tick {}", report.tick);
        if report.released.contains(&down.call.id()) {
            released = true;
            break;
        }
    }
    assert!(released, "down call was never released");
    assert_eq!(loading_at_five, 2);
    assert_eq!(rig.metrics.snapshot().stuck_transitions, 0);

    rig.run_until_quiescent(80);
    let r = rig.building.request(down.request).expect("recorded");
    assert_eq!(r.status(), RequestStatus::Completed);
}

#[test]
fn scheduler_choice_is_rechecked() {
    let always_first = |_: &HallCall, cars: &[Elevator]| cars.first().map(Elevator::id);
    let rig = Rig::with(Building::builder(cfg(10, 2)).with_scheduler(always_first));

    rig.building.request_journey(0, 9, "t").expect("accepted");
    rig.tick();
    rig.tick();
    let down = rig.building.request_journey(4, 2, "t").expect("accepted");

    let report = rig.tick();
    assert!(report.assigned.is_empty());
    let snap = rig.building.snapshot();
    assert_eq!(
        snap.call(down.call.id()).map(|c| c.status),
        Some(HallCallStatus::Pending)
    );
    assert!(snap.elevator(ElevatorId(1)).expect("car").accepted.is_empty());
}

#[test]
fn unknown_elevator_from_scheduler_is_a_dispatch_error() {
    let bogus = |_: &HallCall, _: &[Elevator]| Some(ElevatorId(9));
    let rig = Rig::with(Building::builder(cfg(10, 2)).with_scheduler(bogus));
    rig.building.request_journey(0, 3, "t").expect("accepted");
    assert_eq!(
        rig.building.advance_tick(),
        Err(DispatchError::UnknownElevator(ElevatorId(9)))
    );
}

fn arb_traffic() -> impl Strategy<Value = (usize, usize, Vec<(Floor, Floor)>)> {
    (2usize..=12, 1usize..=4).prop_flat_map(|(floors, cars)| {
        let journey =
            (0..floors, 1..floors).prop_map(move |(source, hop)| (source, (source + hop) % floors));
        (Just(floors), Just(cars), prop::collection::vec(journey, 1..60))
    })
}

fn assert_exclusive(snap: &BuildingSnapshot) -> Result<(), TestCaseError> {
    for call in &snap.calls {
        let holders: Vec<ElevatorId> = snap
            .elevators
            .iter()
            .filter(|e| e.accepted.contains(&call.id))
            .map(|e| e.id)
            .collect();
        match call.status {
            HallCallStatus::Assigned => {
                prop_assert_eq!(holders, call.assigned.into_iter().collect::<Vec<_>>());
            }
            _ => prop_assert!(holders.is_empty(), "{:?} held by {:?}", call, holders),
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn calls_are_held_by_at_most_one_car_and_all_journeys_finish(
        (floors, cars, journeys) in arb_traffic()
    ) {
        let rig = Rig::new(cfg(floors, cars));
        let mut tickets = Vec::with_capacity(journeys.len());

        for &(source, destination) in &journeys {
            let ticket = rig
                .building
                .request_journey(source, destination, "sim")
                .expect("unlimited config accepts every valid journey");
            tickets.push(ticket.request);
            rig.tick();
            assert_exclusive(&rig.building.snapshot())?;
        }

        let mut settled = false;
        for _ in 0..5_000 {
            rig.tick();
            let snap = rig.building.snapshot();
            assert_exclusive(&snap)?;
            if snap.is_quiescent() {
                settled = true;
                break;
            }
        }
        prop_assert!(settled, "building never settled");

        for id in tickets {
            let r = rig.building.request(id).expect("recorded");
            prop_assert_eq!(r.status(), RequestStatus::Completed, "{:?}", r);
        }
    }
}

#[test]
fn snapshot_serializes_with_snake_case_names() {
    let rig = Rig::new(cfg(10, 2));
    rig.building.request_journey(2, 6, "t").expect("accepted");
    let value = serde_json::to_value(rig.building.snapshot()).expect("serializable");
    assert_eq!(value["elevators"][0]["state"], "idle");
    assert_eq!(value["calls"][0]["direction"], "up");
    assert_eq!(value["calls"][0]["status"], "pending");
}

#[test]
fn invalid_config_is_rejected_at_build() {
    let mut c = cfg(10, 1);
    c.floor_count = 1;
    assert!(Building::new(c).is_err());
}
