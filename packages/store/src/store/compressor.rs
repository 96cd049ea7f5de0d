// packages/store/src/store/compressor.rs
//! zstd compression codec for response records
//!
//! A record is encoded to its standard JSON form and then compressed. The
//! two failure modes on the way back are kept apart: a bad frame is
//! `DecompressionFailed`, a bad document is `DeserializationFailed`.

use crate::record::ResponseRecord;
use crate::utils::errors::{Result, StoreError};
use serde::Deserialize;
use tracing::debug;

/// Compression levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Fast compression (level 1)
    Fast,

    /// Balanced (level 3)
    #[default]
    Balanced,

    /// Best compression (level 19)
    Best,
}

impl CompressionLevel {
    pub fn as_i32(&self) -> i32 {
        match self {
            CompressionLevel::Fast => 1,
            CompressionLevel::Balanced => 3,
            CompressionLevel::Best => 19,
        }
    }
}

/// Record codec using zstd
#[derive(Debug, Clone, Copy, Default)]
pub struct Compressor {
    level: CompressionLevel,
}

impl Compressor {
    pub fn new(level: CompressionLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> CompressionLevel {
        self.level
    }

    /// Serialize and compress a record
    pub fn compress_record(&self, record: &ResponseRecord) -> Result<Vec<u8>> {
        let json = record.to_json()?;
        self.compress(&json)
    }

    /// Decompress and deserialize a record
    pub fn decompress_record(&self, data: &[u8]) -> Result<ResponseRecord> {
        let json = self.decompress(data)?;
        serde_json::from_slice(&json).map_err(|e| {
            StoreError::DeserializationFailed(format!("failed to unmarshal record: {}", e))
        })
    }

    /// Compress raw bytes
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let level = self.level.as_i32();

        let compressed = zstd::encode_all(data, level)
            .map_err(|e| StoreError::CompressionFailed(format!("compression error: {}", e)))?;

        debug!(
            "Compressed {} bytes -> {} bytes at level {}",
            data.len(),
            compressed.len(),
            level
        );

        Ok(compressed)
    }

    /// Decompress raw bytes
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        if data.is_empty() {
            return Err(StoreError::DecompressionFailed(
                "compressed data is empty".to_string(),
            ));
        }

        let decompressed = zstd::decode_all(data)
            .map_err(|e| StoreError::DecompressionFailed(format!("decompression error: {}", e)))?;

        debug!(
            "Decompressed {} bytes -> {} bytes",
            data.len(),
            decompressed.len()
        );

        Ok(decompressed)
    }
}

/// Compress a record with the default level
pub fn compress(record: &ResponseRecord) -> Result<Vec<u8>> {
    Compressor::default().compress_record(record)
}

/// Restore a record compressed by [`compress`] or any [`Compressor`]
pub fn decompress(data: &[u8]) -> Result<ResponseRecord> {
    Compressor::default().decompress_record(data)
}
