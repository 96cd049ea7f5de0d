// packages/store/src/store/stats.rs
//! Aggregate success/failure statistics for a response store

use serde::Serialize;
use std::fmt;

/// Running totals and ratios.
///
/// `total == success + failure` after every update; ratios are 0 while
/// `total` is 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total: u64,
    pub success: u64,
    pub failure: u64,
    pub success_ratio: f64,
    pub failure_ratio: f64,
}

impl StoreStats {
    /// Count one committed record and refresh the ratios
    pub fn record(&mut self, successful: bool) {
        if successful {
            self.success += 1;
        } else {
            self.failure += 1;
        }
        self.total += 1;
        self.recalculate();
    }

    /// Recompute ratios from the counters
    pub fn recalculate(&mut self) {
        if self.total == 0 {
            self.success_ratio = 0.0;
            self.failure_ratio = 0.0;
            return;
        }
        self.success_ratio = self.success as f64 / self.total as f64;
        self.failure_ratio = self.failure as f64 / self.total as f64;
    }
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Total: {}", self.total)?;
        write!(f, "\nSuccess: {}", self.success)?;
        write!(f, "\nFailure: {}", self.failure)?;
        write!(f, "\nSuccessRatio: {:.6}", self.success_ratio)?;
        write!(f, "\nFailureRatio: {:.6}", self.failure_ratio)
    }
}
