//! # Runtime events emitted by the supervisor and worker actors.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Pool events**: spawning, assignment, replacement, retirement
//! - **Worker lifecycle events**: completion, failure, poll timeouts
//! - **Subscriber events**: overflow/panic reports from the fan-out layer
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! worker ids, reasons, and point counts.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore the exact order when events are
//! delivered out of order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Pool events ===
    /// A worker actor was spawned and admitted to the liveness set.
    ///
    /// Sets: `worker`, `at`, `seq`
    WorkerSpawned,

    /// A worker spawn was skipped (source factory refused); the batch
    /// continues with the remaining count.
    ///
    /// Sets: `reason`, `at`, `seq`
    SpawnSkipped,

    /// A work unit was assigned to a worker.
    ///
    /// Sets: `worker`, `size`, `at`, `seq`
    WorkAssigned,

    /// An assignment was refused (oversized unit or unreachable worker).
    ///
    /// Sets: `worker` (absent for the up-front unit-size check), `reason`,
    /// `at`, `seq`
    AssignRejected,

    /// A completed worker's data was harvested and the worker retired.
    ///
    /// Sets: `worker`, `produced`, `at`, `seq`
    WorkerRetired,

    /// A failed worker was discarded and replaced; the replacement was
    /// assigned the same unit size.
    ///
    /// Sets: `worker` (replacement id), `reason` (failed id and cause),
    /// `size` (reassigned unit, when one was given), `at`, `seq`
    WorkerReplaced,

    /// All workers were told to start their units.
    ///
    /// Sets: `size`, `at`, `seq`
    WorkDayStarted,

    /// Remaining live workers were force-stopped (cleanup).
    ///
    /// Sets: `at`, `seq`
    WorkDayStopped,

    // === Worker lifecycle events ===
    /// A worker finished its unit with the full point count.
    ///
    /// Sets: `worker`, `produced`, `at`, `seq`
    WorkerCompleted,

    /// A worker drew a failure and abandoned its unit.
    ///
    /// Sets: `worker`, `produced` (points before the failure), `at`, `seq`
    WorkerFailed,

    /// A status read hit the poll bound; the worker is treated as still
    /// in progress.
    ///
    /// Sets: `worker`, `at`, `seq`
    PollTimedOut,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `worker` (subscriber name), `reason`, `at`, `seq`
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `worker` (subscriber name), `reason`, `at`, `seq`
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Worker id (or subscriber name for subscriber events).
    pub worker: Option<Arc<str>>,
    /// Human-readable reason (errors, skip details, replaced ids).
    pub reason: Option<Arc<str>>,
    /// Number of points produced so far, if applicable.
    pub produced: Option<u32>,
    /// Assigned unit size, if applicable.
    pub size: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp
    /// and next sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            worker: None,
            reason: None,
            produced: None,
            size: None,
        }
    }

    /// Attaches a worker id (or subscriber name).
    #[inline]
    pub fn with_worker(mut self, worker: impl Into<Arc<str>>) -> Self {
        self.worker = Some(worker.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a produced point count.
    #[inline]
    pub fn with_produced(mut self, n: u32) -> Self {
        self.produced = Some(n);
        self
    }

    /// Attaches an assigned unit size.
    #[inline]
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::now(EventKind::SubscriberOverflow)
            .with_worker(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::now(EventKind::SubscriberPanicked)
            .with_worker(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::now(EventKind::WorkerSpawned);
        let b = Event::now(EventKind::WorkerSpawned);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builder_sets_fields() {
        let ev = Event::now(EventKind::WorkerFailed)
            .with_worker("worker-3")
            .with_reason("failure draw")
            .with_produced(4)
            .with_size(10);
        assert_eq!(ev.kind, EventKind::WorkerFailed);
        assert_eq!(ev.worker.as_deref(), Some("worker-3"));
        assert_eq!(ev.reason.as_deref(), Some("failure draw"));
        assert_eq!(ev.produced, Some(4));
        assert_eq!(ev.size, Some(10));
    }
}
