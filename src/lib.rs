//! Local Cache - An in-process expiring cache
//!
//! Provides key-addressed storage with per-entry TTL and a periodic
//! background sweep that reclaims expired entries without blocking callers.

pub mod cache;
pub mod config;
pub mod error;
pub mod local_cache;
pub mod tasks;

pub use cache::{CacheStore, SweepReport, SweepStats};
pub use config::Config;
pub use error::{CacheError, Result};
pub use local_cache::{global, LocalCache};
pub use tasks::{spawn_dedicated_sweeper, spawn_sweeper, SweeperHandle};
