//! Cache Store Module
//!
//! Concurrent key-value storage with lazy expiration and generational sweeping.
//!
//! The store keeps a single "current generation" handle. Every operation
//! clones the handle and works against that generation; a sweep builds a
//! filtered copy and swaps the handle. Generations are lock-free skip maps,
//! so copying one never stalls readers or writers.

use std::any::Any;
use std::fmt;
use std::mem;
use std::sync::Arc;
use std::time::Instant;

use crossbeam_skiplist::SkipMap;
use parking_lot::{Mutex, RwLock};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, SweepReport, SweepStats};
use crate::error::Result;

/// One generation of the store.
type Generation = SkipMap<String, CacheEntry>;

// == Cache Store ==
/// Thread-safe expiring store shared between callers and the sweeper.
pub struct CacheStore {
    /// Current generation; swapped wholesale by `sweep`
    current: RwLock<Arc<Generation>>,
    /// Sweep metrics
    stats: Mutex<SweepStats>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(Generation::new())),
            stats: Mutex::new(SweepStats::new()),
        }
    }

    /// Resolves the generation that is current right now.
    fn generation(&self) -> Arc<Generation> {
        self.current.read().clone()
    }

    /// Installs `next` as the current generation and returns the old one.
    ///
    /// The caller drops the old generation after the handle lock is released,
    /// so value destructors never run while the lock is held.
    fn install(&self, next: Generation) -> Arc<Generation> {
        mem::replace(&mut *self.current.write(), Arc::new(next))
    }

    // == Set ==
    /// Stores `value` under `key`, expiring `ttl_millis` from now.
    ///
    /// Any previous entry for the key is replaced. A TTL of zero or less
    /// stores an entry that reads already treat as absent.
    pub fn set<T>(&self, key: impl Into<String>, value: T, ttl_millis: i64)
    where
        T: Any + Send + Sync,
    {
        let entry = CacheEntry::new(value, ttl_millis);
        self.generation().insert(key.into(), entry);
    }

    // == Get ==
    /// Retrieves the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is missing or expired. Expired entries
    /// are left in place for the next sweep.
    ///
    /// # Errors
    /// `CacheError::TypeMismatch` if a live value exists but is not a `T`.
    pub fn get<T>(&self, key: &str) -> Result<Option<Arc<T>>>
    where
        T: Any + Send + Sync,
    {
        let entry = match self.generation().get(key) {
            Some(found) if !found.value().is_expired() => found.value().clone(),
            _ => return Ok(None),
        };

        entry.downcast(key).map(Some)
    }

    /// Like [`CacheStore::get`], but returns an owned clone of the value.
    pub fn get_cloned<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: Any + Send + Sync + Clone,
    {
        Ok(self.get::<T>(key)?.map(|value| T::clone(&value)))
    }

    // == Contains ==
    /// Returns true if `key` holds a live entry of any type.
    pub fn contains_key(&self, key: &str) -> bool {
        self.generation()
            .get(key)
            .is_some_and(|entry| !entry.value().is_expired())
    }

    // == Remove ==
    /// Removes the entry for `key`. Missing keys are ignored.
    pub fn remove(&self, key: &str) {
        self.generation().remove(key);
    }

    // == Clear ==
    /// Drops every entry by installing an empty generation.
    pub fn clear(&self) {
        let old = self.install(Generation::new());
        drop(old);
    }

    // == Sweep ==
    /// Rebuilds the store without expired entries and installs the result.
    ///
    /// The clock is sampled once per sweep. Entries are copied from a
    /// snapshot of the current generation into a new one, which then
    /// replaces the handle. A write that lands in the old generation after
    /// it has been copied is lost when the swap happens.
    pub fn sweep(&self) -> SweepReport {
        let started = Instant::now();
        let snapshot = self.generation();
        let now = current_timestamp_ms();

        let next = Generation::new();
        let mut reclaimed = 0;
        for item in snapshot.iter() {
            if item.value().is_expired_at(now) {
                reclaimed += 1;
                continue;
            }
            next.insert(item.key().clone(), item.value().clone());
        }
        let retained = next.len();

        let old = self.install(next);
        drop(old);
        drop(snapshot);

        let report = SweepReport {
            retained,
            reclaimed,
            elapsed: started.elapsed(),
        };
        self.stats.lock().record_sweep(&report);
        report
    }

    /// Records a sweep cycle that failed before installing a generation.
    pub fn record_failed_sweep(&self) {
        self.stats.lock().record_failure();
    }

    // == Stats ==
    /// Returns current sweep statistics.
    pub fn stats(&self) -> SweepStats {
        self.stats.lock().clone()
    }

    // == Length ==
    /// Returns the number of physically stored entries, including expired
    /// entries not yet swept.
    pub fn len(&self) -> usize {
        self.generation().len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.generation().is_empty()
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("len", &self.len())
            .field("stats", &*self.stats.lock())
            .finish()
    }
}
