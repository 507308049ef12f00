//! Sweep Task
//!
//! Background task that periodically rebuilds the store without expired entries.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::cache::{CacheStore, SweepReport};
use crate::error::{CacheError, Result};

/// Name given to the dedicated sweeper thread.
pub const SWEEPER_THREAD_NAME: &str = "local-cache-sweeper";

// == Sweeper Handle ==
/// Controls a running sweeper. Dropping the handle stops the sweeper.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    worker: Worker,
}

#[derive(Debug)]
enum Worker {
    Task(JoinHandle<()>),
    Thread(thread::JoinHandle<()>),
}

impl SweeperHandle {
    /// Signals the sweeper to stop after any in-progress cycle.
    pub fn stop(&self) {
        // Receiver already gone means the loop has exited
        let _ = self.shutdown.send(true);
    }

    /// Returns true once the sweeper loop has exited.
    pub fn is_finished(&self) -> bool {
        match &self.worker {
            Worker::Task(handle) => handle.is_finished(),
            Worker::Thread(handle) => handle.is_finished(),
        }
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawns the sweeper as a task on the current tokio runtime.
///
/// Cycles run at a fixed rate; the first one fires immediately. A cycle that
/// overruns its period delays the next tick rather than overlapping it.
///
/// # Errors
/// `CacheError::InvalidConfig` if `interval` is zero.
///
/// # Panics
/// Panics if called outside a tokio runtime.
///
/// # Example
/// ```ignore
/// let store = Arc::new(CacheStore::new());
/// let sweeper = spawn_sweeper(store.clone(), Duration::from_secs(300))?;
/// // Later, during shutdown:
/// sweeper.stop();
/// ```
pub fn spawn_sweeper(store: Arc<CacheStore>, interval: Duration) -> Result<SweeperHandle> {
    check_interval(interval)?;

    let (shutdown, signal) = watch::channel(false);
    let handle = tokio::spawn(sweep_loop(store, interval, signal));

    Ok(SweeperHandle {
        shutdown,
        worker: Worker::Task(handle),
    })
}

/// Spawns the sweeper on its own thread with a single-threaded runtime.
///
/// Used when the cache is created outside any tokio runtime.
///
/// # Errors
/// `CacheError::InvalidConfig` if `interval` is zero, or
/// `CacheError::Runtime` if the thread or its runtime cannot be created.
pub fn spawn_dedicated_sweeper(
    store: Arc<CacheStore>,
    interval: Duration,
) -> Result<SweeperHandle> {
    check_interval(interval)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    let (shutdown, signal) = watch::channel(false);

    let handle = thread::Builder::new()
        .name(SWEEPER_THREAD_NAME.to_string())
        .spawn(move || runtime.block_on(sweep_loop(store, interval, signal)))?;

    Ok(SweeperHandle {
        shutdown,
        worker: Worker::Thread(handle),
    })
}

/// Rejects periods `tokio::time::interval` cannot accept.
fn check_interval(interval: Duration) -> Result<()> {
    if interval.is_zero() {
        return Err(CacheError::InvalidConfig(
            "sweep interval must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

async fn sweep_loop(
    store: Arc<CacheStore>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Starting cache sweeper with interval of {:?}", period);

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_cycle(&store, || store.sweep());
            }
            changed = shutdown.changed() => {
                // Sender dropped or stop requested
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Cache sweeper stopped");
}

/// Runs one sweep cycle, containing any panic so the schedule survives.
fn run_cycle<F>(store: &CacheStore, sweep: F) -> Option<SweepReport>
where
    F: FnOnce() -> SweepReport,
{
    match panic::catch_unwind(AssertUnwindSafe(sweep)) {
        Ok(report) => {
            if report.reclaimed > 0 {
                info!(
                    "Cache sweep: reclaimed {} expired entries, retained {} in {:?}",
                    report.reclaimed, report.retained, report.elapsed
                );
            } else {
                debug!("Cache sweep: no expired entries found");
            }
            Some(report)
        }
        Err(_) => {
            store.record_failed_sweep();
            error!("Cache sweep panicked; current store left unchanged");
            None
        }
    }
}
