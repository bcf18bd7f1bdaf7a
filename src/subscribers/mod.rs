//! # Event subscribers for the workvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`]
//! fan-out, and a built-in stdout [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Worker/Supervisor ── publish(Event) ──► Bus ──► supervisor listener
//!                                                      │
//!                                                SubscriberSet::emit
//!                                              ┌───────┼───────┐
//!                                              ▼       ▼       ▼
//!                                          LogWriter Metrics Custom
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
