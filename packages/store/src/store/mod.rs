// packages/store/src/store/mod.rs
//! Concurrent response stores
//!
//! This module provides the in-memory collections of captured responses:
//!
//! - **ResponseStore**: live records plus success/failure statistics
//! - **CompressedResponseStore**: zstd-compressed serialized records
//! - **Rounds**: gapless per-URL round numbering (`round_1`, `round_2`, ...)
//! - **BatchExecutor**: bounded worker pool behind every batch operation
//! - **ErrorReport**: failing rounds grouped by URL
//! - **Exporter**: JSON, HAR and JUnit renderings of stored records
//!
//! # Architecture
//!
//! ```text
//! parser / constructor ──► ResponseRecord
//!                               │
//!                 add / batch_add (BatchExecutor)
//!                               │
//!                    ┌──── write lock ────┐
//!                    │ allocate round_n    │
//!                    │ commit record/blob  │
//!                    │ update statistics   │
//!                    └─────────────────────┘
//! ```

pub mod batch;
pub mod compressed_store;
pub mod compressor;
pub mod exporter;
pub mod report;
pub mod response_store;
pub mod rounds;
pub mod stats;

// Re-export commonly used types
pub use batch::{BatchExecutor, BatchOutcome, BatchStats};
pub use compressed_store::CompressedResponseStore;
pub use compressor::{compress, decompress, CompressionLevel, Compressor};
pub use exporter::{ExportFormat, Exporter};
pub use report::ErrorReport;
pub use response_store::ResponseStore;
pub use rounds::{RoundKey, Rounds};
pub use stats::StoreStats;
