// packages/store/src/lib.rs
//! Respack Response Store Library
//!
//! Stores, versions and retrieves captured HTTP response records under
//! concurrent access, optionally in compressed form.
//!
//! # Architecture
//!
//! The library is structured into several key modules:
//!
//! - **record**: the response record, its validation, encodings and the raw
//!   HTTP parser
//! - **store**: plain and compressed stores, round numbering, batch
//!   execution, error reports and exporters
//! - **observability**: tracing and metrics setup
//! - **utils**: error types and configuration
//!
//! # Example
//!
//! ```
//! use respack_store::record::{Method, ResponseRecord};
//! use respack_store::store::ResponseStore;
//!
//! let store = ResponseStore::new();
//! let record = ResponseRecord::new(
//!     "https://example.com/api",
//!     "example.com",
//!     Method::Get,
//!     200,
//!     None,
//!     Some(br#"{"status":"success"}"#.to_vec()),
//!     0,
//!     None,
//! )
//! .unwrap();
//!
//! let round = store.add(record).unwrap();
//! assert_eq!(round.to_string(), "round_1");
//! assert_eq!(store.get("https://example.com/api").unwrap().len(), 1);
//! ```

// Public module exports
pub mod observability;
pub mod record;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use record::{Method, ResponseRecord, StatusCode};
pub use store::{CompressedResponseStore, ErrorReport, ResponseStore, RoundKey};
pub use utils::config::StoreConfig;
pub use utils::errors::{Result, StoreError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_HASH: &str = env!("GIT_HASH");

/// Library build information
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub rustc_version: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            git_hash: GIT_HASH,
            build_timestamp: env!("BUILD_TIMESTAMP"),
            rustc_version: env!("RUSTC_VERSION"),
        }
    }
}

/// Create an empty response store
pub fn new_response_store() -> ResponseStore {
    ResponseStore::new()
}

/// Create an empty compressed response store
pub fn new_compressed_response_store() -> CompressedResponseStore {
    CompressedResponseStore::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_build_info() {
        let info = BuildInfo::current();
        assert!(!info.version.is_empty());
        assert!(!info.git_hash.is_empty());
    }

    #[test]
    fn test_factories() {
        assert!(new_response_store().is_empty());
        assert!(new_compressed_response_store().is_empty());
    }
}
