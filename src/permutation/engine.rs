//! permutation::engine — observed statistic plus a permutation null.
//!
//! Purpose
//! -------
//! Drive a [`StatisticKernel`] through one permutation test: compute the
//! observed statistic once on the unpermuted inputs, then evaluate the same
//! kernel on `reps` independent relabellings of the second input and collect
//! the resulting [`NullDistribution`].
//!
//! Key behaviors
//! -------------
//! - The observed statistic is computed synchronously before any draw; a
//!   non-finite value aborts the run.
//! - Only `y` is permuted. `x` is shared by reference across all draws.
//! - Draw `i` owns a `ChaCha8Rng` seeded with the base seed and switched to
//!   stream `i`; no generator is shared between draws.
//! - Draws run through [`ParallelMap`]; the first kernel error aborts the
//!   whole run and no partial null distribution is returned.
//!
//! Invariants & assumptions
//! ------------------------
//! - `x.n_samples() == y.n_samples()` has been checked by validation.
//! - For a fixed base seed the null distribution is identical for every
//!   worker strategy.
//!
//! Downstream usage
//! ----------------
//! - Facades call [`PermutationEngine::run`] with either a plain kernel or a
//!   [`LagSearch`](crate::permutation::lag::LagSearch) wrapper, then feed the
//!   outcome into [`p_value`](crate::permutation::pvalue::p_value).
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::{
    data::Permutable,
    kernels::{StatisticKernel, StatisticResult},
    permutation::{options::PermutationOptions, parallel::ParallelMap},
    statistical_tests::errors::{PermError, PermResult},
};

/// NullDistribution — permuted statistics in draw-index order.
#[derive(Debug, Clone, PartialEq)]
pub struct NullDistribution(Vec<f64>);

impl NullDistribution {
    pub fn new(values: Vec<f64>) -> Self {
        NullDistribution(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of draws whose statistic is `>= observed`.
    pub fn count_at_least(&self, observed: f64) -> usize {
        self.0.iter().filter(|&&v| v >= observed).count()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

/// PermutationOutcome — observed result and the null it is compared against.
#[derive(Debug, Clone, PartialEq)]
pub struct PermutationOutcome<A> {
    pub observed: StatisticResult<A>,
    pub null_dist: NullDistribution,
}

/// PermutationEngine — runs one permutation test for a given configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermutationEngine {
    options: PermutationOptions,
}

impl PermutationEngine {
    pub fn new(options: PermutationOptions) -> Self {
        PermutationEngine { options }
    }

    /// Observed statistic and permutation null of `kernel` on `(x, y)`.
    ///
    /// Parameters
    /// ----------
    /// - `kernel`: statistic evaluated on the observed and every permuted pair.
    /// - `x`: first input, never permuted.
    /// - `y`: second input, relabelled by each draw.
    ///
    /// Errors
    /// ------
    /// - `PermError::NonFiniteStatistic` if the observed statistic is NaN/±∞.
    /// - Any kernel error, from the observed evaluation or from a draw.
    /// - `PermError::ParallelExecution` if the worker pool cannot be built.
    pub fn run<K, X, Y>(&self, kernel: &K, x: &X, y: &Y) -> PermResult<PermutationOutcome<K::Aux>>
    where
        K: StatisticKernel<X, Y>,
        X: Sync,
        Y: Permutable + Sync,
    {
        let observed = kernel.evaluate(x, y)?;
        if !observed.stat().is_finite() {
            return Err(PermError::NonFiniteStatistic {
                kernel: kernel.name(),
                value: observed.stat(),
            });
        }

        let base_seed = self.options.seed.unwrap_or_else(rand::random::<u64>);
        let n = y.n_samples();
        debug!(
            kernel = kernel.name(),
            reps = self.options.reps,
            n,
            observed = observed.stat(),
            "starting permutation draws"
        );

        let draws: Vec<u64> = (0..self.options.reps as u64).collect();
        let values = ParallelMap::new(self.options.workers).map(&draws, |&draw| {
            let perm = draw_permutation(base_seed, draw, n);
            let permuted = y.permuted(&perm);
            kernel.evaluate(x, &permuted).map(|r| r.stat())
        })?;

        debug!(kernel = kernel.name(), reps = values.len(), "permutation draws finished");
        Ok(PermutationOutcome { observed, null_dist: NullDistribution::new(values) })
    }
}

/// Uniform permutation of `0..n` for draw `draw` under `base_seed`.
pub fn draw_permutation(base_seed: u64, draw: u64, n: usize) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(base_seed);
    rng.set_stream(draw);
    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(&mut rng);
    perm
}
