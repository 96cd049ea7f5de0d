// packages/store/src/main.rs
//! Respack command line front end
//!
//! Loads captured raw HTTP responses into both store flavors and prints a
//! summary, the error report and an export of the stored records.
//!
//! ```text
//! respack <url> <raw-response-file> [<url> <raw-response-file> ...]
//! ```
//!
//! Configuration comes from `RESPACK_CONFIG` (a file path) and `RESPACK__*`
//! environment variables.

use anyhow::{bail, Context, Result};
use respack_store::observability::{init_metrics, init_tracing};
use respack_store::record::parse_raw_response;
use respack_store::store::{CompressedResponseStore, Exporter, ResponseStore};
use respack_store::utils::config::StoreConfig;
use respack_store::StoreError;
use std::path::PathBuf;
use tracing::{info, warn};

fn main() -> Result<()> {
    let config_path = std::env::var_os("RESPACK_CONFIG").map(PathBuf::from);
    let config = StoreConfig::load_from(config_path.as_deref())?;

    // Initialize observability (tracing, metrics)
    init_tracing(&config.logging)?;
    let metrics = init_metrics()?;

    info!("Starting respack v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.len() % 2 != 0 {
        bail!("usage: respack <url> <raw-response-file> [<url> <raw-response-file> ...]");
    }

    let mut records = Vec::with_capacity(args.len() / 2);
    for pair in args.chunks(2) {
        let (url, path) = (&pair[0], &pair[1]);
        let raw = std::fs::read(path).with_context(|| format!("failed to read {}", path))?;
        match parse_raw_response(&raw, url) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping {}: {}", path, e),
        }
    }
    info!("Parsed {} of {} responses", records.len(), args.len() / 2);

    let store = ResponseStore::from_config(&config);
    let compressed = CompressedResponseStore::from_config(&config);
    store.add_info("source", "respack");
    compressed.add_info("source", "respack");

    for err in compressed.batch_add(records.clone()) {
        warn!("Compressed store rejected a record: {}", err);
    }
    for err in store.batch_add(records) {
        warn!("Store rejected a record: {}", err);
    }

    println!("{}", store);
    println!("\n{}", compressed);

    match store.error_report() {
        Ok(report) if report.is_empty() => println!("\nNo failed responses"),
        Ok(report) => println!("\n{}", report),
        Err(StoreError::StoreEmpty) => println!("\nNo responses stored"),
        Err(e) => return Err(e.into()),
    }

    let export = Exporter::new(config.export.format).export(&store.records())?;
    println!("\n{}", export);

    info!("Metrics snapshot:\n{}", metrics.render());
    Ok(())
}
