//! # Simulation: runs the drivers, fans out events, shuts down gracefully.
//!
//! ```text
//! run_until(shutdown):
//!   Bus.subscribe() ─► listener ─► AliveTracker::update + SubscriberSet::emit
//!
//!   drivers: [tick, generator, extra...]
//!       └─► JoinSet.spawn(supervised(driver, token.child_token()))
//!               publish DriverStarted
//!               run (panics caught → DriverError::Fatal)
//!               publish DriverStopped | DriverFailed
//!
//!   select {
//!     shutdown          → publish ShutdownRequested
//!     first driver exit → remember its error, if any
//!   }
//!   token.cancel() ─► wait remaining within cfg.grace
//!       ├─ joined   → publish AllStoppedWithin
//!       └─ timeout  → publish GraceExceeded, abort stragglers
//!   drain listener, shut the subscriber set down
//! ```
//!
//! ## Outcome
//! - any driver error or panic ⇒ [`RuntimeError::DriverFailed`] (first one wins)
//! - otherwise a missed grace ⇒ [`RuntimeError::GraceExceeded`] with the
//!   sorted names of drivers still alive
//! - otherwise `Ok(())`

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::building::Building;
use crate::error::{DriverError, RuntimeError};
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet, panic_message};

use super::alive::AliveTracker;
use super::driver::Driver;
use super::generator::RequestGenerator;
use super::shutdown;
use super::tick::TickDriver;

type Exit = (&'static str, Result<(), DriverError>);

/// Owns one run of the building's background drivers.
pub struct Simulation {
    building: Arc<Building>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    extra: Vec<Arc<dyn Driver>>,
    max_ticks: Option<u64>,
    generator: bool,
}

impl Simulation {
    pub fn new(building: Arc<Building>) -> Self {
        Self {
            building,
            subscribers: Vec::new(),
            extra: Vec::new(),
            max_ticks: None,
            generator: true,
        }
    }

    /// Event consumers fed for the lifetime of the run.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Ends the run once the tick driver has advanced `n` ticks.
    pub fn with_max_ticks(mut self, n: u64) -> Self {
        self.max_ticks = Some(n);
        self
    }

    /// Adds a driver alongside the built-in ones.
    pub fn with_driver(mut self, driver: Arc<dyn Driver>) -> Self {
        self.extra.push(driver);
        self
    }

    /// Skips the random request generator.
    pub fn without_generator(mut self) -> Self {
        self.generator = false;
        self
    }

    pub fn building(&self) -> &Arc<Building> {
        &self.building
    }

    /// Runs until an OS termination signal or until a driver exits.
    pub async fn run(self) -> Result<(), RuntimeError> {
        self.run_until(async {
            if let Err(e) = shutdown::wait_for_shutdown_signal().await {
                tracing::error!(error = %e, "cannot install signal handlers; run ends only when a driver exits");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Runs until `shutdown` completes or until a driver exits.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), RuntimeError>
    where
        F: Future<Output = ()> + Send,
    {
        let bus = self.building.bus().clone();
        let alive = Arc::new(AliveTracker::new());
        let stop_listener = CancellationToken::new();
        let listener = spawn_listener(
            &bus,
            Arc::clone(&alive),
            SubscriberSet::new(self.subscribers.clone()),
            stop_listener.clone(),
        );

        let token = CancellationToken::new();
        let mut set: JoinSet<Exit> = JoinSet::new();
        for driver in self.drivers() {
            set.spawn(supervised(driver, bus.clone(), token.child_token()));
        }

        let mut failure = None;
        tokio::select! {
            _ = shutdown => {
                bus.publish(Event::new(EventKind::ShutdownRequested));
            }
            joined = set.join_next() => {
                if let Some(exit) = joined {
                    record(&mut failure, exit);
                }
            }
        }
        token.cancel();

        let grace = self.building.config().grace();
        let remaining = async {
            while let Some(exit) = set.join_next().await {
                record(&mut failure, exit);
            }
        };
        let outcome = match tokio::time::timeout(grace, remaining).await {
            Ok(()) => {
                bus.publish(Event::new(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                let stuck = alive.snapshot().await;
                bus.publish(
                    Event::new(EventKind::GraceExceeded)
                        .with_delay(grace)
                        .with_reason(stuck.join(", ")),
                );
                set.abort_all();
                Err(RuntimeError::GraceExceeded { grace, stuck })
            }
        };

        stop_listener.cancel();
        if let Ok(subs) = listener.await {
            subs.shutdown().await;
        }

        match failure {
            Some(err) => Err(err),
            None => outcome,
        }
    }

    fn drivers(&self) -> Vec<Arc<dyn Driver>> {
        let mut tick = TickDriver::new(Arc::clone(&self.building));
        if let Some(n) = self.max_ticks {
            tick = tick.with_max_ticks(n);
        }
        let mut drivers: Vec<Arc<dyn Driver>> = vec![Arc::new(tick)];
        if self.generator {
            drivers.push(Arc::new(RequestGenerator::new(Arc::clone(&self.building))));
        }
        drivers.extend(self.extra.iter().cloned());
        drivers
    }
}

/// Keeps the first driver error.
fn record(failure: &mut Option<RuntimeError>, joined: Result<Exit, tokio::task::JoinError>) {
    let err = match joined {
        Ok((_, Ok(()))) => return,
        Ok((driver, Err(e))) => RuntimeError::DriverFailed {
            driver: driver.to_string(),
            error: e.to_string(),
        },
        Err(e) if e.is_cancelled() => return,
        Err(e) => RuntimeError::DriverFailed {
            driver: "unknown".to_string(),
            error: e.to_string(),
        },
    };
    failure.get_or_insert(err);
}

async fn supervised(driver: Arc<dyn Driver>, bus: Bus, token: CancellationToken) -> Exit {
    let name = driver.name();
    bus.publish(Event::new(EventKind::DriverStarted).with_source(name));

    let result = match std::panic::AssertUnwindSafe(driver.run(token))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(panic) => Err(DriverError::Fatal {
            error: format!("panicked: {}", panic_message(&*panic)),
        }),
    };

    match &result {
        Ok(()) => bus.publish(Event::new(EventKind::DriverStopped).with_source(name)),
        Err(e) => bus.publish(
            Event::new(EventKind::DriverFailed)
                .with_source(name)
                .with_reason(e.to_string()),
        ),
    }
    (name, result)
}

/// Forwards bus events to the tracker and subscribers until stopped, then
/// drains whatever is still buffered.
fn spawn_listener(
    bus: &Bus,
    alive: Arc<AliveTracker>,
    subs: SubscriberSet,
    stop: CancellationToken,
) -> JoinHandle<SubscriberSet> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                received = rx.recv() => match received {
                    Ok(ev) => {
                        alive.update(&ev).await;
                        subs.emit(&ev);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "event listener lagged behind the bus");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = stop.cancelled() => {
                    while let Ok(ev) = rx.try_recv() {
                        alive.update(&ev).await;
                        subs.emit(&ev);
                    }
                    break;
                }
            }
        }
        subs
    })
}
