//! Tick driver: advances the building once per configured interval.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::building::Building;
use crate::error::DriverError;

use super::driver::Driver;

/// Calls [`Building::advance_tick`] every `interval`.
///
/// Any `DispatchError` is fatal: the building is no longer trustworthy.
pub struct TickDriver {
    building: Arc<Building>,
    interval: Duration,
    max_ticks: Option<u64>,
}

impl TickDriver {
    pub fn new(building: Arc<Building>) -> Self {
        let interval = building.config().tick_interval();
        Self {
            building,
            interval,
            max_ticks: None,
        }
    }

    /// Stops on its own after `n` ticks.
    pub fn with_max_ticks(mut self, n: u64) -> Self {
        self.max_ticks = Some(n);
        self
    }
}

#[async_trait]
impl Driver for TickDriver {
    fn name(&self) -> &'static str {
        "tick"
    }

    async fn run(&self, token: CancellationToken) -> Result<(), DriverError> {
        let mut ticks = 0u64;
        loop {
            if token.is_cancelled() || self.max_ticks.is_some_and(|max| ticks >= max) {
                return Ok(());
            }
            tokio::select! {
                _ = token.cancelled() => return Ok(()),
                _ = tokio::time::sleep(self.interval) => {}
            }
            let report = self.building.advance_tick()?;
            ticks = report.tick;
        }
    }
}
