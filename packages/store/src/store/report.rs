// packages/store/src/store/report.rs
//! Error report: every non-success round, grouped by URL

use crate::record::StatusCode;
use crate::store::rounds::RoundKey;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// URL → round → status for each stored record outside the 2xx range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    entries: BTreeMap<String, BTreeMap<RoundKey, StatusCode>>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a round if its status is a failure; successes are ignored
    pub fn observe(&mut self, url: &str, round: RoundKey, status: StatusCode) {
        if status.is_success() {
            return;
        }
        self.entries
            .entry(url.to_string())
            .or_default()
            .insert(round, status);
    }

    /// Failing rounds recorded for `url`
    pub fn get(&self, url: &str) -> Option<&BTreeMap<RoundKey, StatusCode>> {
        self.entries.get(url)
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    /// Distinct URLs with at least one failing round
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Failing rounds across all URLs
    pub fn failure_count(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<RoundKey, StatusCode>)> {
        self.entries.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, BTreeMap<RoundKey, StatusCode>> {
        self.entries
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Error Report:")?;
        for (url, rounds) in &self.entries {
            writeln!(f, "URL: {}", url)?;
            for (round, status) in rounds {
                writeln!(f, "\t{}: {}", round, status)?;
            }
        }
        Ok(())
    }
}
