//! # Runtime events and the broadcast bus.
//!
//! This module provides the event vocabulary of the pool:
//! - [`Event`] / [`EventKind`] - what happened, with builder-style metadata
//! - [`Bus`] - broadcast channel distributing events to listeners
//!
//! Workers and the supervisor publish; the supervisor's listener forwards
//! to the [`SubscriberSet`](crate::subscribers::SubscriberSet) for fan-out.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
