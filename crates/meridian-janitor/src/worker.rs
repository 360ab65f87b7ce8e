//! Worker pool for per-document repair

use crate::JanitorError;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

/// Work-stealing pool that repairs documents in parallel
///
/// Each item handed to [`RepairWorker::map`] is processed by exactly one
/// worker, so a document is never written by two threads.
pub struct RepairWorker {
    pool: ThreadPool,
}

impl RepairWorker {
    /// Create a pool with `workers` threads (0 = one per core)
    pub fn new(workers: usize) -> Result<Self, JanitorError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("meridian-repair-{}", i))
            .build()
            .map_err(|e| JanitorError::Worker(e.to_string()))?;
        tracing::debug!("Repair pool started with {} worker(s)", pool.current_num_threads());
        Ok(Self { pool })
    }

    /// Number of worker threads
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Apply `f` to every item on the pool, preserving input order
    pub fn map<T, R, F>(&self, items: &[T], f: F) -> Vec<R>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> R + Sync + Send,
    {
        self.pool.install(|| items.par_iter().map(f).collect())
    }
}
