//! Local Cache
//!
//! Owns a [`CacheStore`] together with the sweeper that keeps it compact.
//! Each `LocalCache` is independent; dropping it stops its sweeper.

use std::any::Any;
use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

use crate::cache::{CacheStore, SweepReport, SweepStats};
use crate::config::Config;
use crate::error::Result;
use crate::tasks::{spawn_dedicated_sweeper, spawn_sweeper, SweeperHandle};

// == Local Cache ==
/// Expiring in-process cache with a background sweep.
///
/// `set`, `get` and `remove` never wait on the sweeper and may be called
/// from any thread.
#[derive(Debug)]
pub struct LocalCache {
    store: Arc<CacheStore>,
    sweeper: Option<SweeperHandle>,
}

impl LocalCache {
    /// Creates a cache and starts its sweeper.
    ///
    /// The sweeper runs on the current tokio runtime if there is one, and on
    /// a dedicated thread otherwise.
    ///
    /// # Errors
    /// `CacheError::InvalidConfig` for a zero sweep interval, or
    /// `CacheError::Runtime` if the sweeper thread cannot be started.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(CacheStore::new());
        let sweeper = match tokio::runtime::Handle::try_current() {
            Ok(_) => spawn_sweeper(store.clone(), config.sweep_interval)?,
            Err(_) => spawn_dedicated_sweeper(store.clone(), config.sweep_interval)?,
        };

        Ok(Self {
            store,
            sweeper: Some(sweeper),
        })
    }

    /// Creates a cache with no background sweeper.
    ///
    /// Expired entries are still hidden from reads; memory is only reclaimed
    /// through [`LocalCache::sweep_now`].
    pub fn without_sweeper() -> Self {
        Self {
            store: Arc::new(CacheStore::new()),
            sweeper: None,
        }
    }

    /// Stores `value` under `key` for `ttl_millis` milliseconds.
    pub fn set<T>(&self, key: impl Into<String>, value: T, ttl_millis: i64)
    where
        T: Any + Send + Sync,
    {
        self.store.set(key, value, ttl_millis);
    }

    /// Returns the live value for `key`, or `Ok(None)` if missing or expired.
    ///
    /// # Errors
    /// `CacheError::TypeMismatch` if the value was stored as another type.
    pub fn get<T>(&self, key: &str) -> Result<Option<Arc<T>>>
    where
        T: Any + Send + Sync,
    {
        self.store.get(key)
    }

    /// Returns an owned clone of the live value for `key`.
    pub fn get_cloned<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: Any + Send + Sync + Clone,
    {
        self.store.get_cloned(key)
    }

    /// Returns true if `key` holds a live entry.
    pub fn contains_key(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }

    /// Removes the entry for `key`, if any.
    pub fn remove(&self, key: &str) {
        self.store.remove(key);
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Runs a sweep cycle on the calling thread.
    pub fn sweep_now(&self) -> SweepReport {
        self.store.sweep()
    }

    /// Returns sweep statistics.
    pub fn stats(&self) -> SweepStats {
        self.store.stats()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns true if nothing is stored, expired or not.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns true while a background sweeper is attached and running.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .as_ref()
            .is_some_and(|sweeper| !sweeper.is_finished())
    }

    /// Stops the background sweeper. The cache stays usable.
    pub fn shutdown(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.stop();
            info!("Local cache sweeper shut down");
        }
    }
}

static GLOBAL: OnceLock<LocalCache> = OnceLock::new();

/// Returns the process-wide cache, creating it on first use.
///
/// The global cache reads its configuration from the environment and sweeps
/// on a dedicated thread for the rest of the process.
pub fn global() -> &'static LocalCache {
    GLOBAL.get_or_init(|| {
        let mut config = Config::from_env();
        if let Err(err) = config.validate() {
            warn!("Ignoring cache configuration from environment: {}", err);
            config = Config::default();
        }

        let store = Arc::new(CacheStore::new());
        let sweeper = match spawn_dedicated_sweeper(store.clone(), config.sweep_interval) {
            Ok(sweeper) => Some(sweeper),
            Err(err) => {
                warn!("Global cache running without sweeper: {}", err);
                None
            }
        };

        LocalCache { store, sweeper }
    })
}
