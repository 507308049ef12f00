//! Error types for the local cache
//!
//! Provides unified error handling using thiserror. A missing or expired
//! key is never an error: lookups report it as `Ok(None)`.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the local cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The stored value is not of the type the caller asked for
    #[error("Type mismatch for key '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The background sweeper could not be started
    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl CacheError {
    /// Returns true if this error is a type mismatch.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, CacheError::TypeMismatch { .. })
    }
}

impl From<std::io::Error> for CacheError {
    fn from(err: std::io::Error) -> Self {
        CacheError::Runtime(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the local cache.
pub type Result<T> = std::result::Result<T, CacheError>;
