//! # Worker registry: the supervisor's bookkeeping.
//!
//! Tracks the liveness set (id → handle + assigned unit size) and the
//! results map (id → collected points). Pure data structure: it is owned
//! exclusively by the [`Supervisor`](crate::Supervisor) and mutated only
//! from its control context, so no interior locking is needed.
//!
//! ## Rules
//! - A retired id never re-enters the liveness set (ids are never reused).
//! - `results` holds final harvests of retired workers and, when progress
//!   snapshots are enabled, best-effort partial data of live workers
//!   (overwritten on later polls).
//! - Discarding a failed worker removes both its handle and any snapshot,
//!   so the final mapping only carries workers that completed.

use std::collections::HashMap;

use crate::workers::{WorkerHandle, WorkerId};

/// A live worker plus the unit size it was given (needed to reassign the
/// same amount to a replacement).
pub(crate) struct LiveWorker {
    pub(crate) handle: WorkerHandle,
    pub(crate) assigned: Option<u32>,
}

/// Liveness set and results map, owned by the supervisor.
#[derive(Default)]
pub(crate) struct Registry {
    live: HashMap<WorkerId, LiveWorker>,
    results: HashMap<WorkerId, Vec<u32>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Admits a freshly spawned worker to the liveness set.
    pub(crate) fn admit(&mut self, handle: WorkerHandle) {
        let id = handle.id();
        self.live.insert(
            id,
            LiveWorker {
                handle,
                assigned: None,
            },
        );
    }

    /// Records the unit size a live worker was assigned.
    pub(crate) fn record_assignment(&mut self, id: WorkerId, size: u32) {
        if let Some(w) = self.live.get_mut(&id) {
            w.assigned = Some(size);
        }
    }

    /// Snapshot of the current liveness set, for iteration while mutating.
    pub(crate) fn live_ids(&self) -> Vec<WorkerId> {
        self.live.keys().copied().collect()
    }

    pub(crate) fn get(&self, id: WorkerId) -> Option<&LiveWorker> {
        self.live.get(&id)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub(crate) fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Best-effort snapshot of a live worker's partial data.
    pub(crate) fn record_snapshot(&mut self, id: WorkerId, data: Vec<u32>) {
        self.results.insert(id, data);
    }

    /// Retires a completed worker: removes it from the liveness set and
    /// stores its final data.
    pub(crate) fn harvest(&mut self, id: WorkerId, data: Vec<u32>) -> Option<LiveWorker> {
        let removed = self.live.remove(&id);
        if removed.is_some() {
            self.results.insert(id, data);
        }
        removed
    }

    /// Retires a failed worker without harvesting, dropping any snapshot
    /// it may have left behind.
    pub(crate) fn discard(&mut self, id: WorkerId) -> Option<LiveWorker> {
        self.results.remove(&id);
        self.live.remove(&id)
    }

    /// Drains the liveness set (shutdown cleanup).
    pub(crate) fn drain_live(&mut self) -> Vec<LiveWorker> {
        self.live.drain().map(|(_, w)| w).collect()
    }

    pub(crate) fn results(&self) -> &HashMap<WorkerId, Vec<u32>> {
        &self.results
    }
}
