//! Error types used by the workvisor runtime.
//!
//! This module defines two main error enums:
//!
//! - [`ConfigError`] — invalid configuration at the supervisor boundary.
//! - [`WorkerError`] — failures observed while talking to a worker actor.
//!
//! Both types provide `as_label` helpers for logging/metrics, and
//! [`WorkerError::is_transient`] distinguishes a bounded-wait timeout
//! ("still running") from a genuinely dead worker.
//!
//! A worker's internal failure draw during generation is **not** an error
//! value: it surfaces as [`WorkerState::Error`](crate::WorkerState) and is
//! absorbed by the supervisor's retire-and-respawn policy.

use std::time::Duration;
use thiserror::Error;

/// # Configuration errors at the supervisor boundary.
///
/// These are always local: the offending action becomes a no-op and the
/// supervisor keeps running.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Requested more workers than the pool allows.
    #[error("worker count {requested} exceeds the limit of {max}")]
    WorkerLimit {
        /// Number of workers that was requested.
        requested: usize,
        /// Hard ceiling on pool size.
        max: usize,
    },

    /// Work unit reaches the per-worker cap; the work must be repartitioned.
    #[error("unit size {size} reaches the per-worker cap of {cap}")]
    UnitSize {
        /// Requested number of points.
        size: u32,
        /// Hard cap a single worker will accept (exclusive).
        cap: u32,
    },

    /// Failure probability outside `[0, 1)`.
    #[error("failure probability {p} is outside [0, 1)")]
    FailProbability {
        /// The rejected value.
        p: f64,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use workvisor::ConfigError;
    ///
    /// let err = ConfigError::WorkerLimit { requested: 6, max: 5 };
    /// assert_eq!(err.as_label(), "config_worker_limit");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::WorkerLimit { .. } => "config_worker_limit",
            ConfigError::UnitSize { .. } => "config_unit_size",
            ConfigError::FailProbability { .. } => "config_fail_probability",
        }
    }
}

/// # Errors observed while interacting with a worker actor.
///
/// Produced by [`WorkerHandle`](crate::WorkerHandle) operations. Only
/// [`WorkerError::PollTimeout`] is transient; the supervisor treats it as
/// "still running". [`WorkerError::Unreachable`] means the actor is gone
/// (mailbox closed) and triggers retire-and-respawn.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WorkerError {
    /// A bounded-wait status read did not return within the bound.
    #[error("status read timed out after {timeout:?}")]
    PollTimeout {
        /// The bound that was exceeded.
        timeout: Duration,
    },

    /// The worker's mailbox is closed: its execution context died or was
    /// torn down. Unexpected while the worker is still tracked as live.
    #[error("worker is unreachable (mailbox closed)")]
    Unreachable,

    /// The worker refused an assignment (configuration problem).
    #[error(transparent)]
    Rejected(#[from] ConfigError),
}

impl WorkerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            WorkerError::PollTimeout { .. } => "worker_poll_timeout",
            WorkerError::Unreachable => "worker_unreachable",
            WorkerError::Rejected(_) => "worker_assign_rejected",
        }
    }

    /// Indicates whether the error means "try again on the next poll".
    ///
    /// Returns `true` only for [`WorkerError::PollTimeout`]: the worker is
    /// assumed to still be making progress.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use workvisor::WorkerError;
    ///
    /// let slow = WorkerError::PollTimeout { timeout: Duration::from_millis(100) };
    /// assert!(slow.is_transient());
    ///
    /// let dead = WorkerError::Unreachable;
    /// assert!(!dead.is_transient());
    /// ```
    pub fn is_transient(&self) -> bool {
        matches!(self, WorkerError::PollTimeout { .. })
    }
}
