//! # Worker identity and state machine.
//!
//! [`WorkerState`] standardizes worker status for processing by the
//! supervisor. Transitions are forward-only:
//!
//! ```text
//! NotStarted ──► InProgress ──► Completed
//!                           └─► Error
//! ```
//!
//! `Completed` and `Error` are absorbing: a worker never re-enters
//! `InProgress`, and its data is frozen once a terminal state is reached.
//!
//! [`WorkerId`] is an opaque unique id allocated from a global monotonic
//! counter; ids are never reused within a process.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Global allocator for worker ids.
static WORKER_SEQ: AtomicU64 = AtomicU64::new(0);

/// Opaque unique identifier of a worker actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(u64);

impl WorkerId {
    /// Allocates the next id (process-wide monotonic).
    pub fn next() -> Self {
        Self(WORKER_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Status of a worker, as observed by the supervisor's polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Spawned, no work unit assigned yet.
    NotStarted,
    /// Generating points; `data` is append-only in this state.
    InProgress,
    /// Produced the full unit; data is frozen. Terminal.
    Completed,
    /// Drew a failure mid-unit and abandoned it; partial data remains
    /// visible but does not count as complete. Terminal.
    Error,
}

impl WorkerState {
    /// Returns true for the absorbing states (`Completed`, `Error`).
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerState::Completed | WorkerState::Error)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerState::NotStarted => "not-started",
            WorkerState::InProgress => "in-progress",
            WorkerState::Completed => "completed",
            WorkerState::Error => "error",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let a = WorkerId::next();
        let b = WorkerId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_display_form() {
        let id = WorkerId::next();
        assert!(id.to_string().starts_with("worker-"));
    }

    #[test]
    fn test_terminal_states() {
        assert!(!WorkerState::NotStarted.is_terminal());
        assert!(!WorkerState::InProgress.is_terminal());
        assert!(WorkerState::Completed.is_terminal());
        assert!(WorkerState::Error.is_terminal());
    }
}
