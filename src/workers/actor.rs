//! # Worker actor: one isolated unit of generative work.
//!
//! A [`Worker`] owns its state and data privately and is reachable only
//! through its mailbox (commands with oneshot replies) and a
//! [`CancellationToken`]. Nothing outside the actor ever mutates its
//! fields; readers get copies committed at a draw boundary, so there are
//! no torn reads.
//!
//! ## Loop shape
//! ```text
//! loop {
//!   ├─► cancelled? → exit
//!   ├─► unit in progress:
//!   │     ├─► drain queued commands (stay responsive mid-unit)
//!   │     ├─► one draw: Point → append, count down, maybe Completed
//!   │     │             Fault → Error, abandon unit
//!   │     └─► yield (or sleep step_delay, cancellable)
//!   └─► otherwise: wait on mailbox / cancellation
//! }
//! ```
//!
//! ## Rules
//! - State transitions are forward-only: `NotStarted → InProgress →
//!   {Completed | Error}`; terminal states are absorbing.
//! - One draw per loop iteration; queries are answered between draws.
//! - Cancellation is honored at safe points (between draws, during the
//!   step sleep) and never waits on the unit's own progress.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::core::config::UNIT_SIZE_CAP;
use crate::error::ConfigError;
use crate::events::{Bus, Event, EventKind};
use crate::workers::handle::WorkerHandle;
use crate::workers::source::{Draw, PointSource};
use crate::workers::state::{WorkerId, WorkerState};

/// Mailbox depth per worker. Commands are tiny and drained every draw, so
/// a small buffer is plenty.
const MAILBOX_CAPACITY: usize = 32;

/// Messages accepted by a worker actor.
pub(crate) enum Command {
    /// Begin generating `size` points; replies with the admission result.
    Assign {
        size: u32,
        reply: oneshot::Sender<Result<(), ConfigError>>,
    },
    /// Non-blocking state read (from the actor's perspective).
    GetState { reply: oneshot::Sender<WorkerState> },
    /// Copy-on-read snapshot of the data gathered so far.
    GetData { reply: oneshot::Sender<Vec<u32>> },
}

/// An isolated, independently scheduled generative worker.
///
/// Constructed and spawned via [`Worker::spawn`], which returns the
/// [`WorkerHandle`] used for all further interaction.
pub struct Worker {
    id: WorkerId,
    state: WorkerState,
    data: Vec<u32>,
    /// Points left in the current unit; meaningful only while `InProgress`.
    remaining: u32,
    source: Box<dyn PointSource>,
    step_delay: Duration,
    bus: Bus,
    rx: mpsc::Receiver<Command>,
}

impl Worker {
    /// Spawns a worker actor onto the runtime and returns its handle.
    ///
    /// The worker starts in [`WorkerState::NotStarted`] with an empty data
    /// buffer and waits for an assignment.
    pub fn spawn(
        id: WorkerId,
        source: Box<dyn PointSource>,
        step_delay: Duration,
        bus: Bus,
    ) -> WorkerHandle {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        let cancel = CancellationToken::new();

        let worker = Worker {
            id,
            state: WorkerState::NotStarted,
            data: Vec::new(),
            remaining: 0,
            source,
            step_delay,
            bus,
            rx,
        };
        tokio::spawn(worker.run(cancel.clone()));

        WorkerHandle::new(id, tx, cancel)
    }

    /// Actor loop: alternates between serving the mailbox and advancing
    /// the current unit one draw at a time.
    async fn run(mut self, cancel: CancellationToken) {
        loop {
            if cancel.is_cancelled() {
                break;
            }

            if self.state == WorkerState::InProgress {
                // Serve queued queries first so bounded-wait reads are
                // answered even mid-unit.
                while let Ok(cmd) = self.rx.try_recv() {
                    self.handle(cmd);
                }
                self.step();

                if self.step_delay.is_zero() {
                    tokio::task::yield_now().await;
                } else {
                    select! {
                        _ = time::sleep(self.step_delay) => {}
                        _ = cancel.cancelled() => break,
                    }
                }
            } else {
                select! {
                    _ = cancel.cancelled() => break,
                    cmd = self.rx.recv() => match cmd {
                        Some(cmd) => self.handle(cmd),
                        None => break,
                    },
                }
            }
        }
    }

    /// Serves one mailbox command. Replies are best-effort: a dropped
    /// requester (e.g. a timed-out poll) is not an actor error.
    fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Assign { size, reply } => {
                let _ = reply.send(self.accept(size));
            }
            Command::GetState { reply } => {
                let _ = reply.send(self.state);
            }
            Command::GetData { reply } => {
                let _ = reply.send(self.data.clone());
            }
        }
    }

    /// Admission check for a work unit.
    ///
    /// Oversized units are rejected and leave the state at `NotStarted`.
    /// Re-assignment of a worker that already left `NotStarted` is a
    /// no-op: the state machine is forward-only.
    fn accept(&mut self, size: u32) -> Result<(), ConfigError> {
        if size >= UNIT_SIZE_CAP {
            return Err(ConfigError::UnitSize {
                size,
                cap: UNIT_SIZE_CAP,
            });
        }
        if self.state != WorkerState::NotStarted {
            return Ok(());
        }
        if size == 0 {
            // Empty unit: nothing to draw.
            self.state = WorkerState::Completed;
            self.publish_terminal(EventKind::WorkerCompleted);
        } else {
            self.state = WorkerState::InProgress;
            self.remaining = size;
        }
        Ok(())
    }

    /// Advances the unit by exactly one draw.
    fn step(&mut self) {
        match self.source.next_point() {
            Draw::Point(v) => {
                self.data.push(v);
                self.remaining -= 1;
                if self.remaining == 0 {
                    self.state = WorkerState::Completed;
                    self.publish_terminal(EventKind::WorkerCompleted);
                }
            }
            Draw::Fault => {
                self.state = WorkerState::Error;
                self.remaining = 0;
                self.publish_terminal(EventKind::WorkerFailed);
            }
        }
    }

    fn publish_terminal(&self, kind: EventKind) {
        self.bus.publish(
            Event::now(kind)
                .with_worker(self.id.to_string())
                .with_produced(self.data.len() as u32),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workers::source::ScriptedSource;

    fn spawn_scripted(script: ScriptedSource) -> WorkerHandle {
        Worker::spawn(
            WorkerId::next(),
            Box::new(script),
            Duration::ZERO,
            Bus::new(64),
        )
    }

    const POLL: Duration = Duration::from_millis(500);

    #[tokio::test]
    async fn test_starts_not_started_with_empty_data() {
        let h = spawn_scripted(ScriptedSource::counting(3));
        assert_eq!(h.state(POLL).await.unwrap(), WorkerState::NotStarted);
        assert!(h.data(POLL).await.unwrap().is_empty());
        h.stop();
    }

    #[tokio::test]
    async fn test_completes_full_unit() {
        let h = spawn_scripted(ScriptedSource::counting(5));
        h.assign(5).await.unwrap();

        let mut state = h.state(POLL).await.unwrap();
        while !state.is_terminal() {
            tokio::task::yield_now().await;
            state = h.state(POLL).await.unwrap();
        }
        assert_eq!(state, WorkerState::Completed);
        assert_eq!(h.data(POLL).await.unwrap(), vec![1, 2, 3, 4, 5]);
        h.stop();
    }

    #[tokio::test]
    async fn test_fault_mid_unit_keeps_partial_data() {
        let h = spawn_scripted(ScriptedSource::new([
            Draw::Point(7),
            Draw::Point(8),
            Draw::Fault,
        ]));
        h.assign(10).await.unwrap();

        let mut state = h.state(POLL).await.unwrap();
        while !state.is_terminal() {
            tokio::task::yield_now().await;
            state = h.state(POLL).await.unwrap();
        }
        assert_eq!(state, WorkerState::Error);
        assert_eq!(h.data(POLL).await.unwrap(), vec![7, 8]);
        h.stop();
    }

    #[tokio::test]
    async fn test_oversized_assign_rejected_state_unchanged() {
        let h = spawn_scripted(ScriptedSource::counting(3));
        let err = h.assign(UNIT_SIZE_CAP).await.unwrap_err();
        assert_eq!(err.as_label(), "worker_assign_rejected");
        assert_eq!(h.state(POLL).await.unwrap(), WorkerState::NotStarted);
        h.stop();
    }

    #[tokio::test]
    async fn test_empty_unit_completes_immediately() {
        let h = spawn_scripted(ScriptedSource::counting(0));
        h.assign(0).await.unwrap();
        assert_eq!(h.state(POLL).await.unwrap(), WorkerState::Completed);
        assert!(h.data(POLL).await.unwrap().is_empty());
        h.stop();
    }

    #[tokio::test]
    async fn test_reassignment_is_noop() {
        let h = spawn_scripted(ScriptedSource::counting(2));
        h.assign(2).await.unwrap();
        // Second assignment must not restart or extend the unit.
        h.assign(50).await.unwrap();

        let mut state = h.state(POLL).await.unwrap();
        while !state.is_terminal() {
            tokio::task::yield_now().await;
            state = h.state(POLL).await.unwrap();
        }
        assert_eq!(h.data(POLL).await.unwrap(), vec![1, 2]);
        h.stop();
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_cancels_work() {
        let h = Worker::spawn(
            WorkerId::next(),
            Box::new(ScriptedSource::counting(90)),
            Duration::from_millis(50),
            Bus::new(64),
        );
        h.assign(90).await.unwrap();
        h.stop();
        h.stop();

        // The actor exits at the next safe point; afterwards the mailbox
        // is closed and reads report the worker as unreachable.
        tokio::time::sleep(Duration::from_millis(200)).await;
        let err = h.state(POLL).await.unwrap_err();
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_terminal_events_published() {
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let h = Worker::spawn(
            WorkerId::next(),
            Box::new(ScriptedSource::counting(2)),
            Duration::ZERO,
            bus,
        );
        h.assign(2).await.unwrap();

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::WorkerCompleted);
        assert_eq!(ev.produced, Some(2));
        h.stop();
    }
}
