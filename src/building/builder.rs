use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::ConfigError;
use crate::events::Bus;
use crate::metrics::{MetricsSink, NoopMetrics};
use crate::scheduler::{NearestCarScheduler, Scheduler};

use super::building::Building;

/// Builder for a [`Building`] with optional collaborators.
///
/// Anything not set falls back to: [`NearestCarScheduler`], [`NoopMetrics`],
/// [`SystemClock`] and a fresh [`Bus`] of `config.bus_capacity`.
pub struct BuildingBuilder {
    cfg: Config,
    scheduler: Option<Box<dyn Scheduler>>,
    metrics: Option<Arc<dyn MetricsSink>>,
    clock: Option<Arc<dyn Clock>>,
    bus: Option<Bus>,
}

impl BuildingBuilder {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            scheduler: None,
            metrics: None,
            clock: None,
            bus: None,
        }
    }

    /// Sets the elevator-selection strategy (struct or closure).
    pub fn with_scheduler(mut self, scheduler: impl Scheduler) -> Self {
        self.scheduler = Some(Box::new(scheduler));
        self
    }

    pub fn with_metrics<M: MetricsSink>(mut self, metrics: Arc<M>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_clock<C: Clock>(mut self, clock: Arc<C>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Publishes onto an existing bus instead of creating one.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Validates the configuration and builds the building.
    pub fn build(self) -> Result<Building, ConfigError> {
        self.cfg.validate()?;
        let bus = self.bus.unwrap_or_else(|| Bus::new(self.cfg.bus_capacity));
        Ok(Building::new_internal(
            self.cfg,
            self.scheduler
                .unwrap_or_else(|| Box::new(NearestCarScheduler)),
            self.metrics.unwrap_or_else(|| Arc::new(NoopMetrics)),
            self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            bus,
        ))
    }
}
