//! # Supervisor runtime: configuration, registry, polling loop, shutdown.

pub mod config;
pub(crate) mod registry;
pub mod shutdown;
pub mod supervisor;

pub use config::{Config, MAX_WORKERS, UNIT_SIZE_CAP};
pub use supervisor::{SourceFactory, Supervisor};
