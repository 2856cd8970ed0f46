//! Error types for the memory store
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the memory store and the table registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Key was never written, was deleted, evicted, or has expired
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data (caller bug)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid store or registry configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CacheError {
    /// Returns true for the "key not found" outcome of an exact read.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound(_))
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Config(err.to_string())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the memory store.
pub type Result<T> = std::result::Result<T, CacheError>;
