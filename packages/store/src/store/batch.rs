// packages/store/src/store/batch.rs
//! Bounded-parallelism batch executor
//!
//! Every item is enqueued up front on a lock-free queue. A pool of scoped
//! worker threads, sized to `min(available parallelism, item count)` and an
//! optional configured cap, pops until the queue is drained, so each item is
//! processed exactly once regardless of how many workers run.
//!
//! ```text
//! items ──► ArrayQueue ──► worker 1 ─┐
//!                     ├──► worker 2 ─┼──► result channel ──► BatchOutcome
//!                     └──► worker N ─┘
//! ```
//!
//! Failures never stop the batch: each failing item contributes one error.

use crate::utils::config::BatchConfig;
use crossbeam::queue::ArrayQueue;
use std::num::NonZeroUsize;
use std::thread;
use tracing::{debug, trace};

/// Results of one batch run. Order does not follow the input order.
#[derive(Debug)]
pub struct BatchOutcome<R, E> {
    pub successes: Vec<R>,
    pub errors: Vec<E>,
    pub stats: BatchStats,
}

impl<R, E> BatchOutcome<R, E> {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Batch run statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Items submitted
    pub items: usize,

    /// Worker threads used
    pub workers: usize,

    pub succeeded: usize,
    pub failed: usize,
}

/// Fan-out executor shared by the stores
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchExecutor {
    max_workers: Option<NonZeroUsize>,
}

impl BatchExecutor {
    /// Executor bounded only by available parallelism
    pub fn new() -> Self {
        Self { max_workers: None }
    }

    /// Executor with an explicit upper bound on worker threads
    pub fn with_max_workers(max_workers: NonZeroUsize) -> Self {
        Self {
            max_workers: Some(max_workers),
        }
    }

    pub fn from_config(config: &BatchConfig) -> Self {
        Self {
            max_workers: config.max_workers,
        }
    }

    /// Workers used for `items` items
    pub fn worker_count(&self, items: usize) -> usize {
        let available = thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        let cap = self.max_workers.map(NonZeroUsize::get).unwrap_or(available);

        available.min(cap).min(items)
    }

    /// Apply `op` to every item on the worker pool
    pub fn run<T, R, E, F>(&self, items: Vec<T>, op: F) -> BatchOutcome<R, E>
    where
        T: Send,
        R: Send,
        E: Send,
        F: Fn(T) -> Result<R, E> + Sync,
    {
        let total = items.len();
        if total == 0 {
            return BatchOutcome {
                successes: Vec::new(),
                errors: Vec::new(),
                stats: BatchStats::default(),
            };
        }

        let workers = self.worker_count(total);
        debug!("Running batch of {} items on {} workers", total, workers);

        let queue = ArrayQueue::new(total);
        for item in items {
            // Capacity equals the item count
            let _ = queue.push(item);
        }

        let (result_tx, result_rx) = crossbeam_channel::unbounded();

        thread::scope(|scope| {
            for worker_id in 0..workers {
                let queue = &queue;
                let op = &op;
                let result_tx = result_tx.clone();

                scope.spawn(move || {
                    let mut processed = 0usize;
                    while let Some(item) = queue.pop() {
                        processed += 1;
                        if result_tx.send(op(item)).is_err() {
                            break;
                        }
                    }
                    trace!("Batch worker {} processed {} items", worker_id, processed);
                });
            }
        });
        drop(result_tx);

        let mut successes = Vec::new();
        let mut errors = Vec::new();
        for result in result_rx.iter() {
            match result {
                Ok(value) => successes.push(value),
                Err(err) => errors.push(err),
            }
        }

        let stats = BatchStats {
            items: total,
            workers,
            succeeded: successes.len(),
            failed: errors.len(),
        };
        debug!(
            "Batch complete: {} succeeded, {} failed",
            stats.succeeded, stats.failed
        );

        BatchOutcome {
            successes,
            errors,
            stats,
        }
    }
}
