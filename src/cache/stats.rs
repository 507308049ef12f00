//! Sweep Statistics Module
//!
//! Tracks store-level sweep metrics: cycles run, entries reclaimed, failures.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Sweep Report ==
/// Outcome of a single sweep cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries copied into the new generation
    pub retained: usize,
    /// Expired entries left behind in the old generation
    pub reclaimed: usize,
    /// Time spent building and installing the new generation
    pub elapsed: Duration,
}

// == Sweep Stats ==
/// Aggregate sweep metrics for one cache instance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepStats {
    /// Number of completed sweep cycles
    pub sweeps: u64,
    /// Number of sweep cycles that panicked before installing a new generation
    pub failed_sweeps: u64,
    /// Total expired entries reclaimed across all cycles
    pub reclaimed_total: u64,
    /// Entries retained by the most recent cycle
    pub last_retained: usize,
    /// Entries reclaimed by the most recent cycle
    pub last_reclaimed: usize,
    /// Completion time of the most recent cycle
    pub last_sweep_at: Option<DateTime<Utc>>,
}

impl SweepStats {
    // == Constructor ==
    /// Creates a new SweepStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Sweep ==
    /// Folds a completed cycle into the totals.
    pub fn record_sweep(&mut self, report: &SweepReport) {
        self.sweeps += 1;
        self.reclaimed_total += report.reclaimed as u64;
        self.last_retained = report.retained;
        self.last_reclaimed = report.reclaimed;
        self.last_sweep_at = Some(Utc::now());
    }

    // == Record Failure ==
    /// Increments the failed cycle counter.
    pub fn record_failure(&mut self) {
        self.failed_sweeps += 1;
    }
}
