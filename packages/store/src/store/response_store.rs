// packages/store/src/store/response_store.rs
//! Concurrent response store with aggregate statistics
//!
//! Records are kept as URL → rounds. A single read-write lock guards the
//! records, the counters and the metadata together, so a reader never sees a
//! counter without its record or a record without its counter.

use crate::record::ResponseRecord;
use crate::store::batch::BatchExecutor;
use crate::store::report::ErrorReport;
use crate::store::rounds::{RoundKey, Rounds};
use crate::store::stats::StoreStats;
use crate::utils::config::StoreConfig;
use crate::utils::errors::{Result, StoreError};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, warn};

const STORE_LABEL: &str = "plain";

#[derive(Debug, Default)]
struct StoreState {
    records: HashMap<String, Rounds<ResponseRecord>>,
    stats: StoreStats,
    info: HashMap<String, String>,
}

/// Unbounded, append-only store of response records
#[derive(Debug, Default)]
pub struct ResponseStore {
    state: RwLock<StoreState>,
    executor: BatchExecutor,
}

impl ResponseStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that runs batches on `executor`
    pub fn with_executor(executor: BatchExecutor) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            executor,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::with_executor(BatchExecutor::from_config(&config.batch))
    }

    /// Commit a record under the next round for its URL.
    ///
    /// Fails with `EmptyInput` when no record is given. Counters, ratios and
    /// the record are updated in one critical section.
    pub fn add(&self, record: impl Into<Option<ResponseRecord>>) -> Result<RoundKey> {
        let record = match record.into() {
            Some(record) => record,
            None => {
                metrics::counter!("respack_add_failures_total", "store" => STORE_LABEL)
                    .increment(1);
                return Err(StoreError::EmptyInput("response record is absent".to_string()));
            }
        };

        let successful = record.is_successful();

        let mut state = self.state.write();
        state.stats.record(successful);
        let round = state
            .records
            .entry(record.url.clone())
            .or_default()
            .push(record);
        drop(state);

        metrics::counter!("respack_records_added_total", "store" => STORE_LABEL).increment(1);
        debug!("Stored record as {} (success: {})", round, successful);

        Ok(round)
    }

    /// Add every record on the batch executor.
    ///
    /// Returns one error per failed item; an empty list means every record
    /// was committed.
    pub fn batch_add<I>(&self, records: I) -> Vec<StoreError>
    where
        I: IntoIterator,
        I::Item: Into<Option<ResponseRecord>>,
    {
        let items: Vec<Option<ResponseRecord>> = records.into_iter().map(Into::into).collect();
        let outcome = self.executor.run(items, |record| self.add(record));

        if !outcome.errors.is_empty() {
            warn!(
                "Batch add: {} of {} records failed",
                outcome.stats.failed, outcome.stats.items
            );
        }
        outcome.errors
    }

    /// All rounds stored for `url`, in round order
    pub fn get(&self, url: &str) -> Result<Vec<ResponseRecord>> {
        let state = self.state.read();
        let rounds = state
            .records
            .get(url)
            .ok_or_else(|| StoreError::NotFound(url.to_string()))?;
        Ok(rounds.values().cloned().collect())
    }

    /// All rounds stored for `url`, keyed by round
    pub fn get_rounds(&self, url: &str) -> Result<BTreeMap<RoundKey, ResponseRecord>> {
        let state = self.state.read();
        let rounds = state
            .records
            .get(url)
            .ok_or_else(|| StoreError::NotFound(url.to_string()))?;
        Ok(rounds
            .iter()
            .map(|(key, record)| (key, record.clone()))
            .collect())
    }

    /// A single round for `url`
    pub fn get_round(&self, url: &str, round: RoundKey) -> Result<ResponseRecord> {
        let state = self.state.read();
        state
            .records
            .get(url)
            .and_then(|rounds| rounds.get(round))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{} ({})", url, round)))
    }

    /// Look up many URLs concurrently.
    ///
    /// A miss adds an error but never prevents the other URLs from resolving.
    pub fn batch_get<I, S>(
        &self,
        urls: I,
    ) -> (HashMap<String, BTreeMap<RoundKey, ResponseRecord>>, Vec<StoreError>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls: Vec<String> = urls.into_iter().map(|url| url.as_ref().to_string()).collect();
        let outcome = self
            .executor
            .run(urls, |url| self.get_rounds(&url).map(|rounds| (url, rounds)));

        (outcome.successes.into_iter().collect(), outcome.errors)
    }

    /// Every stored URL, in no particular order
    pub fn keys(&self) -> Vec<String> {
        self.state.read().records.keys().cloned().collect()
    }

    /// Every stored record, ordered by URL and then round
    pub fn records(&self) -> Vec<ResponseRecord> {
        let state = self.state.read();
        let mut urls: Vec<&String> = state.records.keys().collect();
        urls.sort();
        urls.into_iter()
            .flat_map(|url| state.records[url].values().cloned())
            .collect()
    }

    /// Recompute ratios from the counters
    pub fn recalculate(&self) {
        self.state.write().stats.recalculate();
    }

    /// Snapshot of the counters and ratios
    pub fn stats(&self) -> StoreStats {
        self.state.read().stats
    }

    /// Insert or replace a metadata entry
    pub fn add_info(&self, key: impl Into<String>, value: impl Into<String>) {
        self.state.write().info.insert(key.into(), value.into());
    }

    pub fn add_info_from_map(&self, info: HashMap<String, String>) {
        self.state.write().info.extend(info);
    }

    pub fn info(&self) -> HashMap<String, String> {
        self.state.read().info.clone()
    }

    /// Failing rounds grouped by URL.
    ///
    /// Errors with `StoreEmpty` when nothing has been stored, so an empty
    /// report always means "no failures".
    pub fn error_report(&self) -> Result<ErrorReport> {
        let state = self.state.read();
        if state.records.is_empty() {
            return Err(StoreError::StoreEmpty);
        }

        let mut report = ErrorReport::new();
        for (url, rounds) in &state.records {
            for (round, record) in rounds.iter() {
                report.observe(url, round, record.status_code);
            }
        }
        Ok(report)
    }

    pub fn error_report_string(&self) -> Result<String> {
        self.error_report().map(|report| report.to_string())
    }

    /// Number of distinct URLs
    pub fn count(&self) -> usize {
        self.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().records.is_empty()
    }
}

impl fmt::Display for ResponseStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        write!(f, "{}", state.stats)?;
        write!(f, "\nInfo:")?;

        let mut info: Vec<_> = state.info.iter().collect();
        info.sort();
        for (key, value) in info {
            write!(f, "\n\t{}: {}", key, value)?;
        }
        Ok(())
    }
}
