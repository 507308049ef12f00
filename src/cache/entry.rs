//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use chrono::Utc;

use crate::error::{CacheError, Result};

// == Cache Entry ==
/// A single cached value together with its absolute expiry.
///
/// Entries are immutable once built. Overwriting a key replaces the whole
/// entry, so `expires_at` never moves for a given entry.
#[derive(Clone)]
pub struct CacheEntry {
    /// The stored value, shared with readers rather than copied
    value: Arc<dyn Any + Send + Sync>,
    /// Type name of the stored value, used in mismatch errors
    type_name: &'static str,
    /// Expiration timestamp (Unix milliseconds)
    expires_at: i64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry that expires `ttl_millis` from now.
    ///
    /// Zero or negative TTLs are accepted and yield an entry that is
    /// already expired.
    pub fn new<T>(value: T, ttl_millis: i64) -> Self
    where
        T: Any + Send + Sync,
    {
        Self::with_expiry(value, current_timestamp_ms().saturating_add(ttl_millis))
    }

    /// Creates an entry with an explicit expiration timestamp.
    pub fn with_expiry<T>(value: T, expires_at: i64) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
            expires_at,
        }
    }

    /// Expiration timestamp in Unix milliseconds.
    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    /// Type name recorded when the value was stored.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time reaches
    /// its expiration time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Checks expiry against a caller-supplied clock sample.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expires_at <= now_ms
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self) -> u64 {
        let remaining = self.expires_at.saturating_sub(current_timestamp_ms());
        remaining.max(0) as u64
    }

    // == Downcast ==
    /// Returns the stored value as `T`.
    ///
    /// # Errors
    /// `CacheError::TypeMismatch` if the value was stored as another type.
    pub fn downcast<T>(&self, key: &str) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        Arc::clone(&self.value)
            .downcast::<T>()
            .map_err(|_| CacheError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
                found: self.type_name,
            })
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("type_name", &self.type_name)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}
