//! Error types for cache operations.

use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-specific errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The store is unreachable or the connection failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// The value cannot be represented in the active encoding
    #[error("Encode error: {0}")]
    Encode(String),

    /// The bytes are malformed or do not match the requested type
    #[error("Decode error: {0}")]
    Decode(String),

    /// The store reported a failure while reading
    #[error("Store read error: {0}")]
    StoreRead(String),

    /// The store reported a failure while writing
    #[error("Store write error: {0}")]
    StoreWrite(String),

    /// Key not found
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Operation timeout
    #[error("Operation timeout")]
    Timeout,
}

impl CacheError {
    /// Check if this error means the key was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error indicates the store could not be reached.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout)
    }
}
