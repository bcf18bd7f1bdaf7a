//! # workvisor
//!
//! **Workvisor** is a small supervised worker pool for Rust.
//!
//! A [`Supervisor`] spawns a bounded set of independent worker actors,
//! assigns each a unit of generative work, polls their status with a
//! bounded wait, harvests completed results, and replaces workers that
//! fail — without ever blocking indefinitely on a misbehaving worker.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!               ┌───────────────────────────────────────────────┐
//!               │  Supervisor (control context)                 │
//!               │  - Registry (liveness set + results map)      │
//!               │  - Bus (broadcast events)                     │
//!               │  - SubscriberSet (fans out to subscribers)    │
//!               │  - SourceFactory (injectable generators)      │
//!               └──────┬──────────────┬──────────────┬──────────┘
//!                      ▼              ▼              ▼
//!               ┌────────────┐ ┌────────────┐ ┌────────────┐
//!               │   Worker   │ │   Worker   │ │   Worker   │
//!               │ (actor +   │ │ (actor +   │ │ (actor +   │
//!               │  mailbox)  │ │  mailbox)  │ │  mailbox)  │
//!               └─────┬──────┘ └─────┬──────┘ └─────┬──────┘
//!                     │ publishes    │ publishes    │
//!                     ▼              ▼              ▼
//!               ┌───────────────────────────────────────────────┐
//!               │              Bus (broadcast channel)          │
//!               └──────────────────────┬────────────────────────┘
//!                                      ▼
//!                            subscriber listener
//!                                      ▼
//!                        LogWriter / custom Subscribe impls
//! ```
//!
//! ### Lifecycle
//! ```text
//! create_workers(n) ──► n Worker actors in the liveness set
//! start_work_day(size) ──► assign(size) to each (fire-and-forget)
//!
//! run_to_completion():
//!   loop poll_once():
//!     per worker, state read bounded by poll_timeout:
//!       ├─ Completed → harvest data, retire, stop()
//!       ├─ Error     → discard, stop(), respawn + reassign same size
//!       ├─ running   → best-effort snapshot, keep polling
//!       └─ timeout   → still running, keep polling
//!   until the liveness set is empty ──► results mapping
//!
//! stop_work_day() ──► cancel every remaining worker (also on Ctrl-C)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                  |
//! |-------------------|--------------------------------------------------------------|-------------------------------------|
//! | **Supervision**   | Bounded pool, bounded-wait polling, retire-and-respawn.      | [`Supervisor`], [`Config`]          |
//! | **Workers**       | Isolated actors reachable only via messages and cancellation.| [`Worker`], [`WorkerHandle`]        |
//! | **Generation**    | Opaque, injectable point sources (random or scripted).       | [`PointSource`], [`SourceFactory`]  |
//! | **Subscriber API**| Hook into pool lifecycle events (logging, metrics).          | [`Subscribe`], [`SubscriberSet`]    |
//! | **Errors**        | Typed, non-fatal configuration and worker errors.            | [`ConfigError`], [`WorkerError`]    |
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use workvisor::{Config, LogWriter, Subscribe, Supervisor};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
//!     let mut sup = Supervisor::new(Config::default(), subs)?;
//!
//!     sup.create_workers(5)?;
//!     sup.start_work_day(10).await?;
//!     let results = sup.run_to_completion().await;
//!     sup.stop_work_day();
//!
//!     for (id, data) in &results {
//!         println!("{id}: {data:?}");
//!     }
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod subscribers;
mod workers;

// ---- Public re-exports ----

pub use crate::core::shutdown::wait_for_shutdown_signal;
pub use crate::core::{Config, SourceFactory, Supervisor, MAX_WORKERS, UNIT_SIZE_CAP};
pub use crate::error::{ConfigError, WorkerError};
pub use crate::events::{Bus, Event, EventKind};
pub use crate::subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use crate::workers::{
    Draw, PointSource, RandomSource, ScriptedSource, Worker, WorkerHandle, WorkerId, WorkerState,
};
