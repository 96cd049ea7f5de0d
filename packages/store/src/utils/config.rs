// packages/store/src/utils/config.rs
//! Layered configuration
//!
//! Values are resolved in order: built-in defaults, an optional config file
//! (TOML, YAML or JSON, picked by extension), then `RESPACK__*` environment
//! variables. Nested keys use a double underscore, e.g.
//! `RESPACK__BATCH__MAX_WORKERS=4`.

use crate::store::compressor::CompressionLevel;
use crate::store::exporter::ExportFormat;
use crate::utils::errors::{Result, StoreError};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "RESPACK";

/// Batch executor settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchConfig {
    /// Upper bound on worker threads; `None` uses available parallelism.
    /// Zero is rejected at load time.
    #[serde(default)]
    pub max_workers: Option<NonZeroUsize>,
}

/// Compression settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompressionConfig {
    #[serde(default)]
    pub level: CompressionLevel,
}

/// Log output settings
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Export settings for the command line front end
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportConfig {
    #[serde(default)]
    pub format: ExportFormat,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub compression: CompressionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

impl StoreConfig {
    /// Load from defaults and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from defaults, an optional file, and the environment
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("logging.level", default_log_level())?
            .set_default("logging.json", false)?
            .set_default("compression.level", "balanced")?
            .set_default("export.format", "json")?;

        if let Some(path) = path {
            if !path.exists() {
                return Err(StoreError::ConfigError(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
