//! permutation::parallel — order-preserving map over draw indices.
//!
//! Purpose
//! -------
//! Run a fallible closure over a slice of indices either on the calling
//! thread or on a rayon pool, returning results in input order.
//!
//! Key behaviors
//! -------------
//! - `Workers::Sequential` uses a plain iterator; no pool is created.
//! - Other strategies build a dedicated pool for the duration of one
//!   [`ParallelMap::map`] call. The pool is dropped when the call returns,
//!   whether it succeeds, fails, or unwinds.
//! - The first error aborts the map and is returned to the caller.
//!
//! Invariants & assumptions
//! ------------------------
//! - Output position `i` corresponds to `indices[i]`.
//! - `f` only borrows shared inputs immutably (`Fn + Sync`).
use rayon::{ThreadPoolBuilder, prelude::*};
use tracing::debug;

use crate::{
    permutation::options::Workers,
    statistical_tests::errors::{PermError, PermResult},
};

/// ParallelMap — executor for per-draw work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelMap {
    workers: Workers,
}

impl ParallelMap {
    pub fn new(workers: Workers) -> Self {
        ParallelMap { workers }
    }

    /// Apply `f` to every index, preserving order.
    ///
    /// Errors
    /// ------
    /// - `PermError::ParallelExecution` if the worker pool cannot be built.
    /// - The first error returned by `f`.
    pub fn map<I, T, F>(&self, indices: &[I], f: F) -> PermResult<Vec<T>>
    where
        I: Sync,
        T: Send,
        F: Fn(&I) -> PermResult<T> + Sync + Send,
    {
        if self.workers == Workers::Sequential {
            return indices.iter().map(&f).collect();
        }

        let threads = self.workers.thread_count();
        debug!(threads, tasks = indices.len(), "building permutation worker pool");
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| PermError::ParallelExecution { reason: e.to_string() })?;

        pool.install(|| indices.par_iter().map(&f).collect())
    }
}
