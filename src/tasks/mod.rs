//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the life of a cache.
//!
//! # Tasks
//! - Sweep: Rebuilds the store without expired entries at a fixed interval

mod sweeper;

pub use sweeper::{spawn_dedicated_sweeper, spawn_sweeper, SweeperHandle, SWEEPER_THREAD_NAME};
