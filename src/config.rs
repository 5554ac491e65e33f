//! # Simulation configuration.
//!
//! Provides [`Config`], the validated settings every component is built from.
//! A config is fixed at construction: the building never re-reads it.
//!
//! Config is used in three ways:
//! 1. **Building creation**: `Building::builder(config).build()` validates it;
//! 2. **Drivers**: tick and request intervals;
//! 3. **CLI**: loaded from a JSON file with [`Config::load`], then overridden by flags.
//!
//! ## Ranges
//! | field                   | range                      |
//! |-------------------------|----------------------------|
//! | `floor_count`           | 2..=100                    |
//! | `elevator_count`        | 1..=10                     |
//! | `tick_interval_ms`      | 10..=10000                 |
//! | `door_open_ticks`       | 1..=10                     |
//! | `request_interval_secs` | 1..=60                     |
//! | `max_loading_ticks`     | `door_open_ticks`+1..=1000 |
//!
//! ## Sentinel values
//! - `rate_limit.global_limit = 0` → no global limit
//! - `rate_limit.per_tag_limit = 0` → no per-tag limit
//!
//! ## Example
//! ```rust
//! use liftsim::Config;
//!
//! let cfg = Config::from_json_str(r#"{ "floor_count": 12, "elevator_count": 2 }"#).unwrap();
//! assert_eq!(cfg.floor_count, 12);
//! assert_eq!(cfg.door_open_ticks, 3); // default
//! ```

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Global configuration for one simulation run.
///
/// All fields are public; every constructor path ends in [`Config::validate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Number of floors, numbered `0..floor_count`.
    pub floor_count: usize,
    /// Number of elevator cars, all starting idle at floor 0.
    pub elevator_count: usize,
    /// Period of the tick driver, in milliseconds.
    pub tick_interval_ms: u64,
    /// Ticks the doors stay open at a stop.
    pub door_open_ticks: u32,
    /// Period of the random request generator, in seconds.
    pub request_interval_secs: u64,
    /// Consecutive loading ticks after which the doors are force-closed.
    pub max_loading_ticks: u32,
    /// Journey admission limits.
    pub rate_limit: RateLimitConfig,
    /// Maximum wait for drivers to stop on shutdown, in milliseconds.
    pub grace_ms: u64,
    /// Capacity of the event bus ring buffer (min 1).
    pub bus_capacity: usize,
    /// Seed for the request generator; `None` seeds from the OS.
    pub generator_seed: Option<u64>,
}

/// Sliding-window limits applied to journey requests before they reach the building.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Window length in seconds.
    pub window_secs: u64,
    /// Requests admitted per window across all tags (`0` = unlimited).
    pub global_limit: u32,
    /// Requests admitted per window for one tag (`0` = unlimited).
    pub per_tag_limit: u32,
}

impl Default for RateLimitConfig {
    /// `60s` window, 120 global, 60 per tag.
    fn default() -> Self {
        Self {
            window_secs: 60,
            global_limit: 120,
            per_tag_limit: 60,
        }
    }
}

impl RateLimitConfig {
    #[inline]
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Returns the global limit as an `Option` (`None` = unlimited).
    #[inline]
    pub fn global(&self) -> Option<u32> {
        (self.global_limit > 0).then_some(self.global_limit)
    }

    /// Returns the per-tag limit as an `Option` (`None` = unlimited).
    #[inline]
    pub fn per_tag(&self) -> Option<u32> {
        (self.per_tag_limit > 0).then_some(self.per_tag_limit)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - 10 floors, 3 elevators
    /// - `tick_interval = 1000ms`, `door_open_ticks = 3`
    /// - `request_interval = 5s`
    /// - `max_loading_ticks = 30`
    /// - `grace = 5s`, `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            floor_count: 10,
            elevator_count: 3,
            tick_interval_ms: 1000,
            door_open_ticks: 3,
            request_interval_secs: 5,
            max_loading_ticks: 30,
            rate_limit: RateLimitConfig::default(),
            grace_ms: 5000,
            bus_capacity: 1024,
            generator_seed: None,
        }
    }
}

impl Config {
    /// Parses a JSON document and validates it. Missing fields take defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Config = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks every range and cross-field rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("floor_count", self.floor_count as u64, 2, 100)?;
        check_range("elevator_count", self.elevator_count as u64, 1, 10)?;
        check_range("tick_interval_ms", self.tick_interval_ms, 10, 10_000)?;
        check_range("door_open_ticks", u64::from(self.door_open_ticks), 1, 10)?;
        check_range("request_interval_secs", self.request_interval_secs, 1, 60)?;
        check_range(
            "max_loading_ticks",
            u64::from(self.max_loading_ticks),
            u64::from(self.door_open_ticks) + 1,
            1000,
        )?;
        check_range("rate_limit.window_secs", self.rate_limit.window_secs, 1, 3600)?;
        if self.bus_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "bus_capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Maximum number of distinct (floor, direction) hall calls: `2 × (floors − 2) + 2`.
    ///
    /// The top floor has no "up" call and the ground floor no "down" call.
    #[inline]
    pub fn queue_capacity(&self) -> usize {
        2 * self.floor_count.saturating_sub(2) + 2
    }

    #[inline]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    #[inline]
    pub fn request_interval(&self) -> Duration {
        Duration::from_secs(self.request_interval_secs)
    }

    #[inline]
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

fn check_range(field: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
