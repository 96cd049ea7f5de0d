// packages/store/src/observability/mod.rs
//! Tracing and metrics setup
//!
//! Library code only emits `tracing` events and `metrics` measurements; the
//! binary decides where they go by calling [`init_tracing`] and
//! [`init_metrics`] once at startup.

use crate::utils::config::LoggingConfig;
use crate::utils::errors::{Result, StoreError};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| StoreError::ObservabilityFailed(format!("invalid log filter: {}", e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| StoreError::ObservabilityFailed(format!("tracing: {}", e)))
}

/// Install the Prometheus recorder and describe the store metrics
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| StoreError::ObservabilityFailed(format!("metrics: {}", e)))?;

    metrics::describe_counter!(
        "respack_records_added_total",
        "Records committed to a store"
    );
    metrics::describe_counter!(
        "respack_add_failures_total",
        "Add calls rejected before commit"
    );
    metrics::describe_counter!(
        "respack_records_deleted_total",
        "Compressed rounds removed by delete"
    );
    metrics::describe_histogram!(
        "respack_compression_ratio",
        "Serialized size divided by compressed size"
    );
    metrics::describe_gauge!(
        "respack_compressed_bytes",
        "Compressed bytes held by the compressed store"
    );

    Ok(handle)
}
