//! permutation::options — configuration for permutation runs.
//!
//! Purpose
//! -------
//! Collect the knobs shared by every permutation test in one validated
//! carrier: how many draws to make, how many workers to use, and which seed
//! drives the per-draw generators.
//!
//! Key behaviors
//! -------------
//! - Represent the worker strategy via [`Workers`], decoded from the
//!   conventional integer (`-1` = all cores, `1` = sequential, `n > 1` =
//!   fixed pool).
//! - Represent a full run configuration via [`PermutationOptions`], with a
//!   fallible [`PermutationOptions::new`] and a `Default` of 1000 sequential
//!   draws without a fixed seed.
//!
//! Invariants & assumptions
//! ------------------------
//! - `reps > 0` for every constructed [`PermutationOptions`].
//! - A `Workers::Fixed` pool always has at least two threads; one thread is
//!   represented as `Workers::Sequential`.
//!
//! Conventions
//! -----------
//! - Options are `Copy` and immutable during a test call; facades hold one
//!   and expose `with_*` builders.
//! - `seed = None` means "draw one fresh base seed per call".
//!
//! Testing notes
//! -------------
//! - Unit tests cover worker decoding, the `reps == 0` rejection and the
//!   documented defaults.
use std::num::NonZeroUsize;

use crate::statistical_tests::errors::{PermError, PermResult};

/// Default number of permutation draws.
pub const DEFAULT_REPS: usize = 1000;

/// Workers — how permutation draws are spread over threads.
///
/// - `Sequential`: plain iterator on the calling thread.
/// - `AllAvailable`: one worker per available core.
/// - `Fixed(n)`: a pool of exactly `n ≥ 2` threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Workers {
    #[default]
    Sequential,
    AllAvailable,
    Fixed(NonZeroUsize),
}

impl Workers {
    /// Decode the integer worker convention.
    ///
    /// Parameters
    /// ----------
    /// - `workers`: `-1` for all available cores, `1` for sequential
    ///   execution, any `n > 1` for a fixed pool of `n` threads.
    ///
    /// Errors
    /// ------
    /// - `PermError::InvalidWorkers` for `0` and negatives other than `-1`.
    pub fn from_count(workers: isize) -> PermResult<Self> {
        match workers {
            -1 => Ok(Workers::AllAvailable),
            1 => Ok(Workers::Sequential),
            n if n > 1 => NonZeroUsize::new(n as usize)
                .map(Workers::Fixed)
                .ok_or(PermError::InvalidWorkers(workers)),
            _ => Err(PermError::InvalidWorkers(workers)),
        }
    }

    /// Number of threads this strategy will use on the current machine.
    pub fn thread_count(&self) -> usize {
        match self {
            Workers::Sequential => 1,
            Workers::AllAvailable => {
                std::thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(1)
            }
            Workers::Fixed(n) => n.get(),
        }
    }
}

/// PermutationOptions — validated configuration of one permutation run.
///
/// Fields
/// ------
/// - `reps`: number of permutation draws (`> 0`).
/// - `workers`: [`Workers`] strategy for the draws.
/// - `seed`: base seed for the per-draw generators; `None` draws a fresh
///   seed once per call.
///
/// Notes
/// -----
/// - A fixed seed makes the null distribution reproducible regardless of
///   the worker strategy, because draw `i` always uses generator stream `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermutationOptions {
    pub reps: usize,
    pub workers: Workers,
    pub seed: Option<u64>,
}

impl PermutationOptions {
    /// Construct validated options.
    ///
    /// Parameters
    /// ----------
    /// - `reps`: number of draws; must be positive.
    /// - `workers`: integer worker convention, see [`Workers::from_count`].
    /// - `seed`: optional base seed.
    ///
    /// Errors
    /// ------
    /// - `PermError::InvalidReps` if `reps == 0`.
    /// - `PermError::InvalidWorkers` for an invalid worker count.
    pub fn new(reps: usize, workers: isize, seed: Option<u64>) -> PermResult<Self> {
        if reps == 0 {
            return Err(PermError::InvalidReps(reps));
        }
        Ok(PermutationOptions { reps, workers: Workers::from_count(workers)?, seed })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_workers(mut self, workers: Workers) -> Self {
        self.workers = workers;
        self
    }
}

impl Default for PermutationOptions {
    fn default() -> Self {
        PermutationOptions { reps: DEFAULT_REPS, workers: Workers::Sequential, seed: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Decoding of the integer worker convention.
    // - Rejection of zero draws.
    // - Documented defaults.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the integer worker convention.
    //
    // Given
    // -----
    // - Worker counts -1, 1, 4, 0 and -2.
    //
    // Expect
    // ------
    // - AllAvailable, Sequential, Fixed(4), then two `InvalidWorkers` errors.
    fn workers_from_count_decodes_convention() {
        // Act & Assert
        assert_eq!(Workers::from_count(-1), Ok(Workers::AllAvailable));
        assert_eq!(Workers::from_count(1), Ok(Workers::Sequential));
        assert_eq!(Workers::from_count(4), Ok(Workers::Fixed(NonZeroUsize::new(4).unwrap())));
        assert_eq!(Workers::from_count(0), Err(PermError::InvalidWorkers(0)));
        assert_eq!(Workers::from_count(-2), Err(PermError::InvalidWorkers(-2)));
    }

    #[test]
    // Purpose
    // -------
    // Ensure zero draws are rejected.
    //
    // Given
    // -----
    // - `reps = 0`.
    //
    // Expect
    // ------
    // - `Err(PermError::InvalidReps(0))`.
    fn permutation_options_new_zero_reps_returns_error() {
        // Act
        let result = PermutationOptions::new(0, 1, None);

        // Assert
        assert_eq!(result, Err(PermError::InvalidReps(0)));
    }

    #[test]
    // Purpose
    // -------
    // Verify defaults and builders.
    //
    // Given
    // -----
    // - `PermutationOptions::default()` extended with a seed.
    //
    // Expect
    // ------
    // - 1000 sequential draws with the given seed.
    fn permutation_options_default_and_with_seed() {
        // Act
        let opts = PermutationOptions::default().with_seed(7);

        // Assert
        assert_eq!(opts.reps, 1000);
        assert_eq!(opts.workers, Workers::Sequential);
        assert_eq!(opts.seed, Some(7));
        assert_eq!(opts.workers.thread_count(), 1);
    }
}
