//! # Worker actors and their collaborators.
//!
//! This module provides the pool's execution side:
//! - [`Worker`] - actor executing one assigned work unit in isolation
//! - [`WorkerHandle`] - message-based handle (assign / bounded-wait reads / stop)
//! - [`WorkerState`] / [`WorkerId`] - state machine and identity
//! - [`PointSource`] / [`Draw`] - the opaque generation seam, with
//!   [`RandomSource`] and [`ScriptedSource`] implementations

mod actor;
mod handle;
mod source;
mod state;

pub use actor::Worker;
pub use handle::WorkerHandle;
pub use source::{Draw, PointSource, RandomSource, ScriptedSource};
pub use state::{WorkerId, WorkerState};
