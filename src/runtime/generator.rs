//! # Random request generator.
//!
//! [`RequestGenerator`] submits one random journey every
//! `request_interval`. Rejections (throttling, full queue) are ordinary
//! outcomes: the building already published them. A **panic** inside an
//! iteration is caught, published as [`EventKind::BackoffScheduled`] and the
//! loop continues after [`BackoffPolicy::next`].
//!
//! ```text
//! loop {
//!   wait = interval            (after success)
//!        | backoff(failures-1) (after a panic)
//!   select { cancelled → return, sleep(wait) → iterate }
//! }
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio_util::sync::CancellationToken;

use crate::building::Building;
use crate::error::DriverError;
use crate::events::{Event, EventKind};
use crate::policies::BackoffPolicy;
use crate::subscribers::panic_message;
use crate::types::Floor;

use super::driver::Driver;

/// Chooses a (source, destination) pair for a building of `floor_count` floors.
pub type JourneyPicker = dyn Fn(&mut StdRng, usize) -> (Floor, Floor) + Send + Sync;

/// Uniform random source and a different uniform random destination.
pub fn uniform_journey(rng: &mut StdRng, floor_count: usize) -> (Floor, Floor) {
    let source = rng.random_range(0..floor_count);
    let mut destination = rng.random_range(0..floor_count - 1);
    if destination >= source {
        destination += 1;
    }
    (source, destination)
}

/// Periodic random journey submitter.
pub struct RequestGenerator {
    building: Arc<Building>,
    interval: Duration,
    backoff: BackoffPolicy,
    rng: Mutex<StdRng>,
    picker: Arc<JourneyPicker>,
}

impl RequestGenerator {
    /// Tag attached to generated journeys.
    pub const TAG: &'static str = "generator";

    /// Seeds from `config.generator_seed`, or from the OS if unset.
    pub fn new(building: Arc<Building>) -> Self {
        let cfg = building.config();
        let rng = match cfg.generator_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            interval: cfg.request_interval(),
            building,
            backoff: BackoffPolicy::default(),
            rng: Mutex::new(rng),
            picker: Arc::new(uniform_journey),
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Replaces the journey distribution.
    pub fn with_picker<F>(mut self, picker: F) -> Self
    where
        F: Fn(&mut StdRng, usize) -> (Floor, Floor) + Send + Sync + 'static,
    {
        self.picker = Arc::new(picker);
        self
    }

    fn iterate(&self) {
        let floor_count = self.building.config().floor_count;
        let (source, destination) = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            (self.picker)(&mut rng, floor_count)
        };
        // rejections are published by the building itself
        let _ = self
            .building
            .request_journey(source, destination, Self::TAG);
    }
}

#[async_trait]
impl Driver for RequestGenerator {
    fn name(&self) -> &'static str {
        "generator"
    }

    async fn run(&self, token: CancellationToken) -> Result<(), DriverError> {
        let mut failures = 0u32;
        let mut wait = self.interval;
        loop {
            if token.is_cancelled() {
                return Ok(());
            }
            tokio::select! {
                _ = token.cancelled() => return Ok(()),
                _ = tokio::time::sleep(wait) => {}
            }

            let outcome = std::panic::AssertUnwindSafe(async { self.iterate() })
                .catch_unwind()
                .await;
            match outcome {
                Ok(()) => {
                    failures = 0;
                    wait = self.interval;
                }
                Err(panic) => {
                    failures = failures.saturating_add(1);
                    let delay = self.backoff.next(failures - 1);
                    self.building.bus().publish(
                        Event::new(EventKind::BackoffScheduled)
                            .with_source(self.name())
                            .with_attempt(failures)
                            .with_delay(delay)
                            .with_reason(panic_message(&*panic)),
                    );
                    wait = delay;
                }
            }
        }
    }
}
