//! # Global runtime configuration.
//!
//! Provides [`Config`], centralized settings for the supervisor runtime,
//! plus the pool's hard limits ([`MAX_WORKERS`], [`UNIT_SIZE_CAP`]).
//!
//! Config is used in two ways:
//! 1. **Supervisor creation**: `Supervisor::new(config, subscribers)`
//! 2. **Worker spawning**: poll/step timings are handed to each worker actor
//!
//! ## Sentinel values
//! - `step_delay = 0s` → workers yield between point draws instead of sleeping
//! - `bus_capacity` is clamped to a minimum of 1 by the Bus

use std::time::Duration;

use crate::error::ConfigError;

/// Hard ceiling on the number of workers a supervisor may spawn.
pub const MAX_WORKERS: usize = 5;

/// Hard cap on a single work unit (exclusive). An assignment of this size
/// or larger is a configuration failure: the supervisor needs to
/// repartition the work, not hand it to one worker.
pub const UNIT_SIZE_CAP: u32 = 100;

/// Global configuration for the supervisor runtime.
///
/// Defines:
/// - **Failure model**: per-point failure probability of the generators
/// - **Polling**: bounded wait applied to every worker status read
/// - **Pacing**: optional per-point delay inside workers
/// - **Snapshots**: whether in-progress data is mirrored into results
/// - **Event system**: bus capacity for event delivery
///
/// ## Field semantics
/// - `fail_probability`: chance each point draw aborts the unit (`[0, 1)`)
/// - `poll_timeout`: max wait per status read; on expiry the worker is
///   treated as still in progress, never as failed
/// - `step_delay`: pause between point draws (`0s` = yield only)
/// - `snapshot_progress`: record non-terminal workers' partial data into
///   the results map on every poll (overwritten by later polls)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct Config {
    /// Probability that a single point draw fails the whole unit.
    ///
    /// Must be in `[0, 1)`; `1.0` would make every unit fail and the
    /// respawn loop would never terminate.
    pub fail_probability: f64,

    /// Bounded wait for each worker status/data read.
    ///
    /// An unresponsive worker never stalls the polling loop beyond this.
    pub poll_timeout: Duration,

    /// Delay between individual point draws inside a worker.
    ///
    /// - `Duration::ZERO` = no sleep, the worker only yields
    /// - `> 0` = simulated per-point work, useful to observe `InProgress`
    pub step_delay: Duration,

    /// Mirror partial data of non-terminal workers into the results map.
    ///
    /// Useful for live-progress reporting; set to `false` to keep the
    /// results map terminal-only.
    pub snapshot_progress: bool,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages
    /// will receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl Config {
    /// Validates field ranges that the type system cannot express.
    ///
    /// Only `fail_probability` needs a runtime check; worker count and
    /// unit size are validated at their call sites against
    /// [`MAX_WORKERS`] and [`UNIT_SIZE_CAP`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..1.0).contains(&self.fail_probability) {
            return Err(ConfigError::FailProbability {
                p: self.fail_probability,
            });
        }
        Ok(())
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `fail_probability = 0.1`
    /// - `poll_timeout = 100ms`
    /// - `step_delay = 0s` (yield only)
    /// - `snapshot_progress = true`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            fail_probability: 0.1,
            poll_timeout: Duration::from_millis(100),
            step_delay: Duration::ZERO,
            snapshot_progress: true,
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_probability_one_rejected() {
        let cfg = Config {
            fail_probability: 1.0,
            ..Config::default()
        };
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.as_label(), "config_fail_probability");
    }

    #[test]
    fn test_negative_probability_rejected() {
        let cfg = Config {
            fail_probability: -0.2,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_probability_allowed() {
        let cfg = Config {
            fail_probability: 0.0,
            ..Config::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_bus_capacity_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
