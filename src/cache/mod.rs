//! Cache Module
//!
//! Provides in-memory caching with per-entry TTL and generational sweeping.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use stats::{SweepReport, SweepStats};
pub use store::CacheStore;
