//! Cache error types.

use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache operation failed: {0}")]
    Operation(String),

    #[error("Cache connection failed: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Cache context cancelled")]
    Cancelled,

    #[error("Cache context deadline exceeded")]
    DeadlineExceeded,

    /// The closure handed to `remember` failed; nothing was cached.
    #[error("Cache value computation failed")]
    Compute(#[source] anyhow::Error),

    #[error("Cache not initialized")]
    NotInitialized,
}

impl CacheError {
    pub fn operation(message: impl Into<String>) -> Self {
        CacheError::Operation(message.into())
    }

    pub fn connection(message: impl Into<String>) -> Self {
        CacheError::Connection(message.into())
    }

    /// Whether the error came from the caller's context rather than the backend.
    pub fn is_context_error(&self) -> bool {
        matches!(self, CacheError::Cancelled | CacheError::DeadlineExceeded)
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(error: redis::RedisError) -> Self {
        if error.is_connection_refusal() || error.is_connection_dropped() {
            CacheError::Connection(error.to_string())
        } else {
            CacheError::Operation(error.to_string())
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(error: serde_json::Error) -> Self {
        CacheError::Serialization(error.to_string())
    }
}
