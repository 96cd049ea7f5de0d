// packages/store/src/utils/mod.rs
//! Shared utilities: error types and configuration

pub mod config;
pub mod errors;

pub use config::{BatchConfig, CompressionConfig, ExportConfig, LoggingConfig, StoreConfig};
pub use errors::{Result, StoreError};
