//! kernels — statistic kernels plugged into the permutation engine.
//!
//! Purpose
//! -------
//! Define the [`StatisticKernel`] capability shared by every test family
//! and ship the reference kernels: unbiased distance correlation
//! ([`Dcorr`]), multiscale graph correlation ([`Mgc`]) and the
//! discriminability index ([`Discriminability`]).
//!
//! Key behaviors
//! -------------
//! - A kernel is a pure function of its two inputs returning a
//!   [`StatisticResult`]: the scalar statistic plus an auxiliary payload
//!   (`()` for plain statistics, [`Scale`] for MGC).
//! - The permutation engine, the lag search, and the facades are generic
//!   over this trait; nothing downstream matches on a concrete kernel.
//!
//! Invariants & assumptions
//! ------------------------
//! - Kernels are `Sync` and hold no mutable state, so one instance can be
//!   evaluated concurrently from every worker.
//! - Inputs have already been validated (matching `n`, finite entries).
//! - Degenerate inputs (constant samples, too few rows after lag
//!   slicing) yield a statistic of `0.0` rather than an error.

pub mod dcorr;
pub mod discrim;
pub mod mgc;

pub use self::dcorr::Dcorr;
pub use self::discrim::Discriminability;
pub use self::mgc::{Mgc, Scale};

use std::fmt::Debug;

use crate::{data::DistanceMatrix, statistical_tests::errors::PermResult};

/// StatisticResult — scalar statistic with an auxiliary payload.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticResult<A> {
    stat: f64,
    aux: A,
}

impl<A> StatisticResult<A> {
    pub fn new(stat: f64, aux: A) -> Self {
        StatisticResult { stat, aux }
    }

    pub fn stat(&self) -> f64 {
        self.stat
    }

    pub fn aux(&self) -> &A {
        &self.aux
    }

    pub fn into_parts(self) -> (f64, A) {
        (self.stat, self.aux)
    }
}

impl StatisticResult<()> {
    /// Statistic without auxiliary output.
    pub fn scalar(stat: f64) -> Self {
        StatisticResult { stat, aux: () }
    }
}

/// Dependence statistic over a pair of inputs `(x, y)`.
///
/// Implementors must be pure: the same inputs always produce the same
/// result, and evaluation never mutates shared state.
pub trait StatisticKernel<X, Y>: Sync {
    /// Auxiliary output carried next to the statistic.
    type Aux: Clone + Send + Debug;

    /// Short identifier used in logs and error messages.
    fn name(&self) -> &'static str;

    fn evaluate(&self, x: &X, y: &Y) -> PermResult<StatisticResult<Self::Aux>>;
}

/// Kernel over a pair of distance matrices (independence and time-series tests).
pub trait DistanceKernel: StatisticKernel<DistanceMatrix, DistanceMatrix> {}

impl<K> DistanceKernel for K where K: StatisticKernel<DistanceMatrix, DistanceMatrix> {}
