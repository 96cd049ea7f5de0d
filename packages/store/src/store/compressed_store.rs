// packages/store/src/store/compressed_store.rs
//! Response store that keeps each record as a compressed blob
//!
//! Records are serialized and compressed before the lock is taken, so the
//! critical section only covers round allocation and the insert. Reads copy
//! the blobs out under the read lock and decompress after releasing it.

use crate::record::ResponseRecord;
use crate::store::batch::BatchExecutor;
use crate::store::compressor::Compressor;
use crate::store::rounds::{RoundKey, Rounds};
use crate::utils::config::StoreConfig;
use crate::utils::errors::{Result, StoreError};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, info, warn};

const STORE_LABEL: &str = "compressed";

#[derive(Debug, Default)]
struct CompressedState {
    blobs: HashMap<String, Rounds<Vec<u8>>>,
    meta_info: HashMap<String, String>,
    stored_bytes: u64,
}

/// Store of compressed, serialized response records
#[derive(Debug, Default)]
pub struct CompressedResponseStore {
    state: RwLock<CompressedState>,
    executor: BatchExecutor,
    compressor: Compressor,
}

impl CompressedResponseStore {
    /// Create an empty store with default compression
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(executor: BatchExecutor, compressor: Compressor) -> Self {
        Self {
            state: RwLock::new(CompressedState::default()),
            executor,
            compressor,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::with_options(
            BatchExecutor::from_config(&config.batch),
            Compressor::new(config.compression.level),
        )
    }

    /// Compress a record and commit it under the next round for its URL
    pub fn add(&self, record: impl Into<Option<ResponseRecord>>) -> Result<RoundKey> {
        let record = record.into().ok_or_else(|| {
            metrics::counter!("respack_add_failures_total", "store" => STORE_LABEL).increment(1);
            StoreError::EmptyInput("response record is absent".to_string())
        })?;

        let json = record.to_json()?;
        let json_len = json.len();
        let blob = self.compressor.compress(&json)?;
        let blob_len = blob.len() as u64;

        let mut state = self.state.write();
        let round = state.blobs.entry(record.url).or_default().push(blob);
        state.stored_bytes += blob_len;
        let stored_bytes = state.stored_bytes;
        drop(state);

        metrics::counter!("respack_records_added_total", "store" => STORE_LABEL).increment(1);
        metrics::histogram!("respack_compression_ratio").record(json_len as f64 / blob_len as f64);
        metrics::gauge!("respack_compressed_bytes").set(stored_bytes as f64);
        debug!("Stored compressed record as {} ({} -> {} bytes)", round, json_len, blob_len);

        Ok(round)
    }

    /// Add every record on the batch executor, returning per-item errors
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

    /// Decompress every round stored for `url`, in round order.
    ///
    /// Any blob that fails to decode fails the whole call.
    pub fn get(&self, url: &str) -> Result<Vec<ResponseRecord>> {
        Ok(self.get_rounds(url)?.into_values().collect())
    }

    /// Decompress every round stored for `url`, keyed by round
    pub fn get_rounds(&self, url: &str) -> Result<BTreeMap<RoundKey, ResponseRecord>> {
        let blobs: Vec<(RoundKey, Vec<u8>)> = {
            let state = self.state.read();
            let rounds = state
                .blobs
                .get(url)
                .ok_or_else(|| StoreError::NotFound(url.to_string()))?;
            rounds.iter().map(|(key, blob)| (key, blob.clone())).collect()
        };

        blobs
            .into_iter()
            .map(|(key, blob)| Ok((key, self.compressor.decompress_record(&blob)?)))
            .collect()
    }

    /// Look up many URLs concurrently.
    ///
    /// Non-aborting: URLs that resolve are returned even when others fail.
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

    /// Remove every round for `url`
    pub fn delete(&self, url: &str) -> Result<()> {
        let mut state = self.state.write();
        let rounds = state
            .blobs
            .remove(url)
            .ok_or_else(|| StoreError::NotFound(url.to_string()))?;

        let freed: u64 = rounds.values().map(|blob| blob.len() as u64).sum();
        state.stored_bytes -= freed;
        let stored_bytes = state.stored_bytes;
        drop(state);

        metrics::counter!("respack_records_deleted_total", "store" => STORE_LABEL)
            .increment(rounds.len() as u64);
        metrics::gauge!("respack_compressed_bytes").set(stored_bytes as f64);
        debug!("Deleted {} rounds for {}", rounds.len(), url);

        Ok(())
    }

    /// Delete many URLs concurrently, returning per-item errors
    pub fn batch_delete<I, S>(&self, urls: I) -> Vec<StoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls: Vec<String> = urls.into_iter().map(|url| url.as_ref().to_string()).collect();
        self.executor.run(urls, |url| self.delete(&url)).errors
    }

    /// Total (URL, round) entries across all URLs
    pub fn count(&self) -> usize {
        self.state.read().blobs.values().map(Rounds::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().blobs.is_empty()
    }

    /// Every stored URL, in no particular order
    pub fn keys(&self) -> Vec<String> {
        self.state.read().blobs.keys().cloned().collect()
    }

    /// Compressed bytes currently held
    pub fn stored_bytes(&self) -> u64 {
        self.state.read().stored_bytes
    }

    pub fn add_info(&self, key: impl Into<String>, value: impl Into<String>) {
        self.state.write().meta_info.insert(key.into(), value.into());
    }

    pub fn add_info_from_map(&self, info: HashMap<String, String>) {
        self.state.write().meta_info.extend(info);
    }

    pub fn meta_info(&self) -> HashMap<String, String> {
        self.state.read().meta_info.clone()
    }

    /// Drop every stored blob. Metadata is kept.
    pub fn clear(&self) {
        let mut state = self.state.write();
        let released = state.stored_bytes;
        state.blobs = HashMap::new();
        state.stored_bytes = 0;
        drop(state);

        metrics::gauge!("respack_compressed_bytes").set(0.0);
        info!("Cleared compressed store ({} bytes released)", released);
    }
}

impl fmt::Display for CompressedResponseStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        let entries: usize = state.blobs.values().map(Rounds::len).sum();
        write!(f, "URLs: {}", state.blobs.len())?;
        write!(f, "\nEntries: {}", entries)?;
        write!(f, "\nCompressedBytes: {}", state.stored_bytes)?;
        write!(f, "\nInfo:")?;

        let mut info: Vec<_> = state.meta_info.iter().collect();
        info.sort();
        for (key, value) in info {
            write!(f, "\n\t{}: {}", key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Method, StatusCode};
    use crate::store::compressor::CompressionLevel;

    const API1: &str = "https://example.com/api1";
    const API2: &str = "https://example.com/api2";

    fn record(url: &str, status: u16, body: &[u8]) -> ResponseRecord {
        ResponseRecord::new(
            url,
            "example.com",
            Method::Get,
            status,
            Some(HashMap::from([(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )])),
            Some(body.to_vec()),
            0,
            Some(b"HTTP/1.1 200 OK\r\n\r\n".to_vec()),
        )
        .unwrap()
    }

    #[test]
    fn test_new_store() {
        let store = CompressedResponseStore::new();
        assert_eq!(store.count(), 0);
        assert!(store.is_empty());
        assert!(store.meta_info().is_empty());
        assert_eq!(store.stored_bytes(), 0);
    }

    #[test]
    fn test_blob_holds_wire_encoding() {
        let store = CompressedResponseStore::new();
        let original = record(API1, 200, br#"{"result":"success"}"#);
        store.add(original.clone()).unwrap();

        let state = store.state.read();
        let blob = state.blobs[API1].get(RoundKey::FIRST).unwrap();
        let decoded = Compressor::default().decompress(blob).unwrap();
        assert_eq!(decoded, original.to_json().unwrap());
        assert_eq!(state.stored_bytes, blob.len() as u64);
    }

    #[test]
    fn test_add_and_get() {
        let store = CompressedResponseStore::new();
        let original = record(API1, 200, br#"{"result":"success"}"#);
        store.add(original.clone()).unwrap();

        let records = store.get(API1).unwrap();
        assert_eq!(records, vec![original]);
        assert!(store.stored_bytes() > 0);

        assert!(matches!(store.add(None), Err(StoreError::EmptyInput(_))));
        assert!(store.get(API2).unwrap_err().is_not_found());
    }

    #[test]
    fn test_duplicates_accumulate_rounds() {
        let store = CompressedResponseStore::new();
        let first = store.add(record(API1, 200, b"one")).unwrap();
        let second = store.add(record(API1, 500, b"two")).unwrap();
        assert_eq!(first, RoundKey::FIRST);
        assert_eq!(second.number(), 2);

        let rounds = store.get_rounds(API1).unwrap();
        assert_eq!(rounds[&first].body, b"one");
        assert_eq!(rounds[&second].status_code, StatusCode::INTERNAL_SERVER_ERROR);
        // URL field is never rewritten
        assert!(rounds.values().all(|r| r.url == API1));
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_binary_body_round_trip() {
        let store = CompressedResponseStore::with_options(
            BatchExecutor::new(),
            Compressor::new(CompressionLevel::Best),
        );
        let binary: Vec<u8> = vec![0x00, 0xff, 0xc3, 0x28, 0x80, 0x7f];
        let original = record(API1, 200, &binary);
        store.add(original.clone()).unwrap();
        assert_eq!(store.get(API1).unwrap()[0], original);
    }

    #[test]
    fn test_batch_add() {
        let store = CompressedResponseStore::new();
        let records: Vec<ResponseRecord> = (0..50)
            .map(|i| record(&format!("https://example.com/{}", i % 5), 200, b"{}"))
            .collect();

        let errors = store.batch_add(records);
        assert!(errors.is_empty());
        assert_eq!(store.count(), 50);
        assert_eq!(store.keys().len(), 5);

        let errors = store.batch_add(vec![None, None, Some(record(API1, 200, b""))]);
        assert_eq!(errors.len(), 2);
        assert_eq!(store.count(), 51);
    }

    #[test]
    fn test_batch_get() {
        let store = CompressedResponseStore::new();
        store.add(record(API1, 200, b"a")).unwrap();
        store.add(record(API2, 201, b"b")).unwrap();
        store.add(record(API2, 201, b"c")).unwrap();

        let (results, errors) = store.batch_get([API1, API2]);
        assert!(errors.is_empty());
        assert_eq!(results.len(), 2);
        assert_eq!(results[API2].len(), 2);

        // Partial failure keeps the successful lookups
        let (results, errors) = store.batch_get([API1, "https://nonexistent.com"]);
        assert_eq!(errors.len(), 1);
        assert_eq!(results.len(), 1);
        assert!(results.contains_key(API1));
    }

    #[test]
    fn test_delete_removes_all_rounds() {
        let store = CompressedResponseStore::new();
        store.add(record(API1, 200, b"a")).unwrap();
        store.add(record(API1, 404, b"b")).unwrap();
        store.add(record(API2, 200, b"c")).unwrap();

        store.delete(API1).unwrap();
        assert!(store.get(API1).unwrap_err().is_not_found());
        assert_eq!(store.count(), 1);
        assert!(store.delete(API1).unwrap_err().is_not_found());

        // Re-adding after a delete starts over at round 1
        assert_eq!(store.add(record(API1, 200, b"d")).unwrap(), RoundKey::FIRST);
    }

    #[test]
    fn test_batch_delete() {
        let store = CompressedResponseStore::new();
        store.add(record(API1, 200, b"a")).unwrap();
        store.add(record(API2, 200, b"b")).unwrap();

        let errors = store.batch_delete([API1, API2, "https://nonexistent.com"]);
        assert_eq!(errors.len(), 1);
        assert!(store.is_empty());
        assert_eq!(store.stored_bytes(), 0);
    }

    #[test]
    fn test_corrupt_blob_surfaces_error() {
        let store = CompressedResponseStore::new();
        store.add(record(API1, 200, b"a")).unwrap();
        store.state.write().blobs.get_mut(API1).unwrap().push(b"garbage".to_vec());

        assert!(matches!(store.get(API1), Err(StoreError::DecompressionFailed(_))));
    }

    #[test]
    fn test_info() {
        let store = CompressedResponseStore::new();
        store.add_info("key", "value");
        store.add_info_from_map(HashMap::from([
            ("a".to_string(), "1".to_string()),
            ("key".to_string(), "override".to_string()),
        ]));

        let info = store.meta_info();
        assert_eq!(info.len(), 2);
        assert_eq!(info["key"], "override");
        assert!(store.to_string().contains("a: 1"));
    }

    #[test]
    fn test_clear() {
        let store = CompressedResponseStore::new();
        store.add(record(API1, 200, b"a")).unwrap();
        store.add(record(API2, 200, b"b")).unwrap();
        store.add_info("kept", "yes");

        store.clear();
        assert_eq!(store.count(), 0);
        assert_eq!(store.stored_bytes(), 0);
        assert!(store.keys().is_empty());
        assert_eq!(store.meta_info()["kept"], "yes");
    }

    #[test]
    fn test_display_on_empty_store() {
        let store = CompressedResponseStore::new();
        let text = store.to_string();
        assert!(text.contains("URLs: 0"));
        assert!(text.contains("Entries: 0"));
    }
}
