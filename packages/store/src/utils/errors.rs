// packages/store/src/utils/errors.rs
//! Error types for record construction and store operations.
//!
//! Every fallible operation in the crate returns [`Result`]. Batch operations
//! never abort: they collect one [`StoreError`] per failing item.

use thiserror::Error;

/// Convenience alias used by every public API in the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by records, codecs, and stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record, byte buffer, or document was absent or empty.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// The URL has never been committed to the store (or was deleted).
    #[error("response not found for URL: {0}")]
    NotFound(String),

    /// An HTTP method or status code is not recognized.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("compression failed: {0}")]
    CompressionFailed(String),

    /// The compressed blob is malformed or truncated.
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("serialization failed: {0}")]
    SerializationFailed(String),

    /// The decompressed or supplied document is not a valid record.
    #[error("deserialization failed: {0}")]
    DeserializationFailed(String),

    /// An error report was requested from a store with no entries.
    #[error("store is empty")]
    StoreEmpty,

    /// Raw HTTP bytes could not be parsed into a record.
    #[error("failed to parse HTTP response: {0}")]
    ParseFailed(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("observability setup failed: {0}")]
    ObservabilityFailed(String),
}

impl StoreError {
    /// Whether the error reports a missing URL.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl From<config::ConfigError> for StoreError {
    fn from(err: config::ConfigError) -> Self {
        StoreError::ConfigError(err.to_string())
    }
}
