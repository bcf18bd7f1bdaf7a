//! # Supervisor: owns the registry and drives the pool to completion.
//!
//! The [`Supervisor`] spawns a bounded set of worker actors, assigns each
//! a unit of generative work, polls their status with a bounded wait,
//! harvests completed results, and replaces workers that fail. It runs in
//! its own control context and never executes worker logic directly.
//!
//! ## Control flow
//! ```text
//! create_workers(n) ──► Registry (liveness set)
//! start_work_day(size) ──► assign(size) to every live worker
//! run_to_completion():
//!   loop {
//!     poll_once():
//!       per live worker, state(poll_timeout):
//!         ├─ Completed  → harvest data, retire, stop()
//!         ├─ Error      → discard, stop(), spawn replacement,
//!         │               reassign the same unit size
//!         ├─ InProgress / NotStarted → best-effort snapshot, keep live
//!         ├─ timeout    → still running, keep live
//!         └─ unreachable → treated like Error (unexpected death)
//!   } until liveness set is empty
//! stop_work_day() ──► cancel every remaining live worker (cleanup)
//! ```
//!
//! ## Failure semantics
//! Configuration errors are local no-ops; a worker's failure draw is
//! absorbed by retire-and-respawn; a poll timeout is "still running".
//! No single misbehaving worker can abort the batch or stall the loop
//! beyond the poll bound.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::core::config::{Config, MAX_WORKERS, UNIT_SIZE_CAP};
use crate::core::registry::Registry;
use crate::error::ConfigError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::workers::{PointSource, RandomSource, Worker, WorkerId, WorkerState};

/// Injectable factory building one [`PointSource`] per spawned worker.
///
/// Keeps the generation routine an external collaborator: tests inject
/// scripted sources, and a factory refusal exercises the partial-success
/// path of [`Supervisor::create_workers`].
pub type SourceFactory =
    Arc<dyn Fn(WorkerId) -> Result<Box<dyn PointSource>, ConfigError> + Send + Sync>;

/// Coordinates worker actors: spawn, assign, poll, replace, harvest.
///
/// Must be created inside a Tokio runtime (it spawns the subscriber
/// listener and worker actors).
pub struct Supervisor {
    cfg: Config,
    bus: Bus,
    registry: Registry,
    sources: SourceFactory,
}

impl Supervisor {
    /// Creates a supervisor with the given config and subscribers.
    ///
    /// Validates the config, wires the event bus to a
    /// [`SubscriberSet`] fan-out, and installs the default
    /// [`RandomSource`] factory using `cfg.fail_probability`.
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Result<Self, ConfigError> {
        cfg.validate()?;

        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self::spawn_subscriber_listener(&bus, SubscriberSet::new(subscribers, bus.clone()));

        let p = cfg.fail_probability;
        let sources: SourceFactory =
            Arc::new(move |_id| Ok(Box::new(RandomSource::new(p)) as Box<dyn PointSource>));

        Ok(Self {
            cfg,
            bus,
            registry: Registry::new(),
            sources,
        })
    }

    /// Replaces the point-source factory (deterministic sources in tests,
    /// alternative generators in embedders).
    pub fn with_source_factory(mut self, sources: SourceFactory) -> Self {
        self.sources = sources;
        self
    }

    /// Returns the event bus (subscribe for assertions or ad-hoc taps).
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Number of workers currently tracked as live.
    pub fn live_count(&self) -> usize {
        self.registry.live_count()
    }

    /// The harvested-results mapping gathered so far.
    pub fn results(&self) -> &HashMap<WorkerId, Vec<u32>> {
        self.registry.results()
    }

    /// Spawns `n` workers and admits them to the liveness set.
    ///
    /// `n` must not exceed [`MAX_WORKERS`]; violating that is a
    /// [`ConfigError`] and creates zero workers. `n = 0` is a legal no-op
    /// (the pool is immediately complete). A per-worker factory refusal is
    /// reported and skipped: partial success is acceptable, not fatal.
    pub fn create_workers(&mut self, n: usize) -> Result<(), ConfigError> {
        if n > MAX_WORKERS {
            let err = ConfigError::WorkerLimit {
                requested: n,
                max: MAX_WORKERS,
            };
            self.bus
                .publish(Event::now(EventKind::SpawnSkipped).with_reason(err.to_string()));
            return Err(err);
        }

        for _ in 0..n {
            self.spawn_worker();
        }
        Ok(())
    }

    /// Sends an assignment of `unit_size` points to every live worker.
    ///
    /// Fire-and-forget: confirms admission, never waits for completion.
    /// An oversized unit is rejected up front as a no-op (handing it to
    /// the workers would leave them all `NotStarted` and the polling loop
    /// without a termination path). Per-worker rejections are reported and
    /// skipped.
    pub async fn start_work_day(&mut self, unit_size: u32) -> Result<(), ConfigError> {
        if unit_size >= UNIT_SIZE_CAP {
            let err = ConfigError::UnitSize {
                size: unit_size,
                cap: UNIT_SIZE_CAP,
            };
            self.bus
                .publish(Event::now(EventKind::AssignRejected).with_reason(err.to_string()));
            return Err(err);
        }

        self.bus
            .publish(Event::now(EventKind::WorkDayStarted).with_size(unit_size));

        for id in self.registry.live_ids() {
            let Some(handle) = self.registry.get(id).map(|w| w.handle.clone()) else {
                continue;
            };
            match handle.assign(unit_size).await {
                Ok(()) => {
                    self.registry.record_assignment(id, unit_size);
                    self.bus.publish(
                        Event::now(EventKind::WorkAssigned)
                            .with_worker(id.to_string())
                            .with_size(unit_size),
                    );
                }
                Err(e) => {
                    self.bus.publish(
                        Event::now(EventKind::AssignRejected)
                            .with_worker(id.to_string())
                            .with_reason(e.to_string()),
                    );
                }
            }
        }
        Ok(())
    }

    /// Polls every live worker once and applies the decision table.
    ///
    /// Each status read waits at most `cfg.poll_timeout`; an unresponsive
    /// worker is treated as still in progress, never as failed.
    pub async fn poll_once(&mut self) {
        let timeout = self.cfg.poll_timeout;

        for id in self.registry.live_ids() {
            let Some(w) = self.registry.get(id) else {
                continue;
            };
            let handle = w.handle.clone();
            let assigned = w.assigned;

            match handle.state(timeout).await {
                Ok(WorkerState::Completed) => match handle.data(timeout).await {
                    Ok(data) => {
                        let produced = data.len() as u32;
                        if let Some(w) = self.registry.harvest(id, data) {
                            w.handle.stop();
                        }
                        self.bus.publish(
                            Event::now(EventKind::WorkerRetired)
                                .with_worker(id.to_string())
                                .with_produced(produced),
                        );
                    }
                    // Data still unread within the bound: harvest on the
                    // next poll, the worker stays live.
                    Err(e) if e.is_transient() => {}
                    Err(_) => self.replace(id, assigned, "completed but unreachable").await,
                },
                Ok(WorkerState::Error) => self.replace(id, assigned, "failure draw").await,
                Ok(_) => {
                    if self.cfg.snapshot_progress {
                        if let Ok(data) = handle.data(timeout).await {
                            self.registry.record_snapshot(id, data);
                        }
                    }
                }
                Err(e) if e.is_transient() => {
                    self.bus
                        .publish(Event::now(EventKind::PollTimedOut).with_worker(id.to_string()));
                }
                Err(_) => self.replace(id, assigned, "unreachable").await,
            }
        }
    }

    /// True exactly when the liveness set is empty.
    ///
    /// A pool that never spawned a worker is vacuously complete.
    pub fn is_complete(&self) -> bool {
        self.registry.is_empty()
    }

    /// Polls until the liveness set drains, then returns the results.
    ///
    /// Every iteration makes progress: each worker contributes at least
    /// one state transition or one timeout-bounded observation, so the
    /// loop cannot livelock as long as every live worker has an
    /// assignment and `fail_probability < 1`.
    pub async fn run_to_completion(&mut self) -> HashMap<WorkerId, Vec<u32>> {
        while !self.is_complete() {
            self.poll_once().await;
        }
        self.registry.results().clone()
    }

    /// Forcibly stops every remaining live worker (cleanup on shutdown,
    /// including abnormal shutdown). Idempotent.
    pub fn stop_work_day(&mut self) {
        for w in self.registry.drain_live() {
            w.handle.stop();
        }
        self.bus.publish(Event::now(EventKind::WorkDayStopped));
    }

    /// Spawns one worker and admits it; a factory refusal is reported and
    /// the worker skipped.
    fn spawn_worker(&mut self) -> Option<WorkerId> {
        let id = WorkerId::next();
        match (self.sources)(id) {
            Ok(source) => {
                let handle = Worker::spawn(id, source, self.cfg.step_delay, self.bus.clone());
                self.registry.admit(handle);
                self.bus
                    .publish(Event::now(EventKind::WorkerSpawned).with_worker(id.to_string()));
                Some(id)
            }
            Err(e) => {
                self.bus.publish(
                    Event::now(EventKind::SpawnSkipped)
                        .with_reason(format!("{id}: {e}")),
                );
                None
            }
        }
    }

    /// Retires a failed worker without harvesting and spawns exactly one
    /// replacement, assigned the same unit size the failed worker had.
    async fn replace(&mut self, failed: WorkerId, assigned: Option<u32>, cause: &str) {
        if let Some(w) = self.registry.discard(failed) {
            w.handle.stop();
        }

        let Some(id) = self.spawn_worker() else {
            // Factory refused a replacement: the pool shrinks by one, the
            // remaining workers keep the loop terminating.
            return;
        };

        if let Some(size) = assigned {
            let Some(handle) = self.registry.get(id).map(|w| w.handle.clone()) else {
                return;
            };
            match handle.assign(size).await {
                Ok(()) => self.registry.record_assignment(id, size),
                Err(e) => {
                    self.bus.publish(
                        Event::now(EventKind::AssignRejected)
                            .with_worker(id.to_string())
                            .with_reason(e.to_string()),
                    );
                }
            }
        }

        let mut ev = Event::now(EventKind::WorkerReplaced)
            .with_worker(id.to_string())
            .with_reason(format!("{failed}: {cause}"));
        if let Some(size) = assigned {
            ev = ev.with_size(size);
        }
        self.bus.publish(ev);
    }

    /// Forwards bus events into the subscriber fan-out. Overflow reports
    /// are delivered directly to the remaining subscribers (never looped
    /// back through the bus).
    fn spawn_subscriber_listener(bus: &Bus, set: SubscriberSet) {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        for drop_ev in set.emit(&ev) {
                            set.emit(&drop_ev);
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            set.shutdown().await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workers::{Draw, ScriptedSource};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn supervisor(cfg: Config) -> Supervisor {
        Supervisor::new(cfg, Vec::new()).unwrap()
    }

    /// Factory handing every worker a seeded never-failing random source.
    fn reliable_sources() -> SourceFactory {
        let n = AtomicUsize::new(0);
        Arc::new(move |_id| {
            let seed = n.fetch_add(1, Ordering::SeqCst) as u64;
            Ok(Box::new(RandomSource::seeded(0.0, seed)) as Box<dyn PointSource>)
        })
    }

    #[tokio::test]
    async fn test_create_workers_within_limit() {
        for n in 1..=MAX_WORKERS {
            let mut sup = supervisor(Config::default()).with_source_factory(reliable_sources());
            sup.create_workers(n).unwrap();
            assert_eq!(sup.live_count(), n);
            sup.stop_work_day();
        }
    }

    #[tokio::test]
    async fn test_scenario_d_oversized_pool_rejected() {
        let mut sup = supervisor(Config::default());
        let err = sup.create_workers(MAX_WORKERS + 1).unwrap_err();
        assert_eq!(err.as_label(), "config_worker_limit");
        assert_eq!(sup.live_count(), 0);
    }

    #[tokio::test]
    async fn test_partial_spawn_success() {
        let calls = AtomicUsize::new(0);
        let flaky: SourceFactory = Arc::new(move |_id| {
            if calls.fetch_add(1, Ordering::SeqCst) == 1 {
                Err(ConfigError::FailProbability { p: 2.0 })
            } else {
                Ok(Box::new(ScriptedSource::counting(1)) as Box<dyn PointSource>)
            }
        });
        let mut sup = supervisor(Config::default()).with_source_factory(flaky);
        sup.create_workers(3).unwrap();
        assert_eq!(sup.live_count(), 2);
        sup.stop_work_day();
    }

    #[tokio::test]
    async fn test_oversized_unit_is_a_noop() {
        let mut sup = supervisor(Config::default()).with_source_factory(reliable_sources());
        sup.create_workers(2).unwrap();
        let err = sup.start_work_day(UNIT_SIZE_CAP + 5).await.unwrap_err();
        assert_eq!(err.as_label(), "config_unit_size");
        assert_eq!(sup.live_count(), 2);
        assert!(sup.results().is_empty());
        sup.stop_work_day();
    }

    #[tokio::test]
    async fn test_scenario_a_single_reliable_worker() {
        let mut sup = supervisor(Config::default()).with_source_factory(reliable_sources());
        sup.create_workers(1).unwrap();
        sup.start_work_day(10).await.unwrap();

        let results = sup.run_to_completion().await;
        assert_eq!(results.len(), 1);
        let data = results.values().next().unwrap();
        assert_eq!(data.len(), 10);
        assert!(data.iter().all(|v| (1..=101).contains(v)));
    }

    #[tokio::test]
    async fn test_scenario_b_failed_worker_replaced_once() {
        let spawned: Arc<Mutex<Vec<WorkerId>>> = Arc::new(Mutex::new(Vec::new()));
        let seen = spawned.clone();
        let calls = AtomicUsize::new(0);
        // First worker faults on its very first draw; the replacement
        // completes the full unit.
        let sources: SourceFactory = Arc::new(move |id| {
            seen.lock().unwrap().push(id);
            let script = if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                ScriptedSource::new([Draw::Fault])
            } else {
                ScriptedSource::counting(10)
            };
            Ok(Box::new(script) as Box<dyn PointSource>)
        });

        let mut sup = supervisor(Config::default()).with_source_factory(sources);
        let mut events = sup.bus().subscribe();
        sup.create_workers(1).unwrap();
        sup.start_work_day(10).await.unwrap();

        let results = sup.run_to_completion().await;

        let ids = spawned.lock().unwrap().clone();
        assert_eq!(ids.len(), 2, "exactly one replacement spawned");
        assert_eq!(results.len(), 1);
        assert!(!results.contains_key(&ids[0]), "failed worker left no entry");
        assert_eq!(results[&ids[1]].len(), 10);

        let mut replacements = 0;
        while let Ok(ev) = events.try_recv() {
            if ev.kind == EventKind::WorkerReplaced {
                replacements += 1;
                assert_eq!(ev.size, Some(10));
            }
        }
        assert_eq!(replacements, 1);
    }

    #[tokio::test]
    async fn test_scenario_c_zero_workers_complete_immediately() {
        let mut sup = supervisor(Config::default());
        sup.create_workers(0).unwrap();
        assert!(sup.is_complete());
        let results = sup.run_to_completion().await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_liveness_never_exceeds_requested_count() {
        let calls = AtomicUsize::new(0);
        let sources: SourceFactory = Arc::new(move |_id| {
            // Every third worker faults immediately.
            let script = if calls.fetch_add(1, Ordering::SeqCst) % 3 == 0 {
                ScriptedSource::new([Draw::Fault])
            } else {
                ScriptedSource::counting(5)
            };
            Ok(Box::new(script) as Box<dyn PointSource>)
        });

        let mut sup = supervisor(Config::default()).with_source_factory(sources);
        sup.create_workers(3).unwrap();
        sup.start_work_day(5).await.unwrap();

        while !sup.is_complete() {
            sup.poll_once().await;
            assert!(sup.live_count() <= 3);
        }
        assert_eq!(sup.results().len(), 3);
    }

    #[tokio::test]
    async fn test_termination_with_random_failures() {
        let n = AtomicUsize::new(0);
        let sources: SourceFactory = Arc::new(move |_id| {
            let seed = 1000 + n.fetch_add(1, Ordering::SeqCst) as u64;
            Ok(Box::new(RandomSource::seeded(0.2, seed)) as Box<dyn PointSource>)
        });
        let mut sup = supervisor(Config::default()).with_source_factory(sources);
        sup.create_workers(4).unwrap();
        sup.start_work_day(10).await.unwrap();

        let results = tokio::time::timeout(Duration::from_secs(30), sup.run_to_completion())
            .await
            .expect("pool must drain with p_fail < 1");
        assert_eq!(results.len(), 4);
        assert!(results.values().all(|d| d.len() == 10));
    }

    #[tokio::test]
    async fn test_progress_snapshots_recorded_and_overwritten() {
        let cfg = Config {
            step_delay: Duration::from_millis(50),
            ..Config::default()
        };
        let mut sup = supervisor(cfg).with_source_factory(reliable_sources());
        sup.create_workers(1).unwrap();
        sup.start_work_day(5).await.unwrap();

        sup.poll_once().await;
        if !sup.is_complete() {
            let id = *sup.results().keys().next().expect("snapshot recorded");
            assert!(sup.results()[&id].len() < 5);
        }

        let results = sup.run_to_completion().await;
        assert_eq!(results.values().next().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_snapshots_disabled_keeps_results_terminal_only() {
        let cfg = Config {
            step_delay: Duration::from_millis(50),
            snapshot_progress: false,
            ..Config::default()
        };
        let mut sup = supervisor(cfg).with_source_factory(reliable_sources());
        sup.create_workers(1).unwrap();
        sup.start_work_day(5).await.unwrap();

        sup.poll_once().await;
        if !sup.is_complete() {
            assert!(sup.results().is_empty());
        }

        let results = sup.run_to_completion().await;
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_stop_work_day_drains_the_pool() {
        let mut sup = supervisor(Config::default()).with_source_factory(reliable_sources());
        let mut events = sup.bus().subscribe();
        sup.create_workers(3).unwrap();
        sup.stop_work_day();

        assert!(sup.is_complete());
        assert_eq!(sup.live_count(), 0);

        let mut stopped = false;
        while let Ok(ev) = events.try_recv() {
            stopped |= ev.kind == EventKind::WorkDayStopped;
        }
        assert!(stopped);
    }

    #[tokio::test]
    async fn test_invalid_probability_rejected_at_construction() {
        let cfg = Config {
            fail_probability: 1.0,
            ..Config::default()
        };
        assert!(Supervisor::new(cfg, Vec::new()).is_err());
    }
}
