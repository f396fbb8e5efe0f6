//! statistical_tests::time_series — cross-lag independence tests (DcorrX, MgcX).
//!
//! Purpose
//! -------
//! Test whether two time series are independent across lags. A distance
//! kernel (distance correlation for [`DcorrX`], multiscale graph
//! correlation for [`MgcX`]) is evaluated between `x[j..n]` and `y[0..n-j]`
//! for every lag `j ≤ max_lag`; the weighted, clipped contributions are
//! summed into one statistic whose null distribution is obtained by
//! permuting `y`.
//!
//! Key behaviors
//! -------------
//! - Inputs are normalized into distance matrices through
//!   [`prepare_time_series`](crate::data::validation::prepare_time_series),
//!   which also enforces `max_lag < n`.
//! - The permutation engine runs a [`LagSearch`] as its kernel, so every
//!   draw repeats the full lag search.
//! - After the run, the kernel is re-evaluated at the observed optimal lag
//!   to recover its auxiliary output (`opt_scale`; the MGC [`Scale`] or `()`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Rows are ordered in time; row `t` of `x` and `y` refers to the same
//!   time point.
//! - The statistic is non-negative; `max_lag = 0` reduces to the clipped
//!   plain statistic.
//!
//! Conventions
//! -----------
//! - Defaults: `max_lag = 0`, peak-contribution lag selection, features
//!   input, Euclidean metric, 1000 sequential draws.
//!
//! Downstream usage
//! ----------------
//! - `MgcX::mgcx(max_lag).test(x.view(), y.view())?` returns a
//!   [`TimeSeriesOutcome`] carrying the statistic, p-value, optimal lag,
//!   optimal scale and the per-lag contributions.
use ndarray::ArrayView2;
use tracing::debug;

use crate::{
    data::{Metric, Sample, validation::prepare_time_series},
    kernels::{Dcorr, DistanceKernel, Mgc, Scale},
    permutation::{LagSearch, LagSelection, PermutationEngine, PermutationOptions, p_value},
    statistical_tests::errors::PermResult,
};

/// TimeSeriesInfo — lag and kernel output at the observed optimum.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesInfo<A> {
    pub opt_lag: usize,
    pub opt_scale: A,
}

/// Kernel outputs that surface as `opt_scale` in the info mapping.
pub trait ReportedScale {
    fn reported_scale(&self) -> Option<(usize, usize)>;
}

impl ReportedScale for () {
    fn reported_scale(&self) -> Option<(usize, usize)> {
        None
    }
}

impl ReportedScale for Scale {
    fn reported_scale(&self) -> Option<(usize, usize)> {
        Some((*self).into())
    }
}

impl<A: ReportedScale> TimeSeriesInfo<A> {
    /// `opt_scale` entry of the info mapping; `None` for scale-free kernels.
    pub fn scale_entry(&self) -> Option<(usize, usize)> {
        self.opt_scale.reported_scale()
    }
}

/// TimeSeriesOutcome — result of one cross-lag test.
///
/// Fields
/// ------
/// - `stat`: `Σ_j (n - j)/n · max(0, K_j)` on the observed series.
/// - `p_value`: one-sided permutation p-value, at least `1 / reps`.
/// - `info`: optimal lag and the kernel's auxiliary output at that lag.
/// - `lag_contributions`: weighted, clipped contribution per lag.
/// - `null_dist`: permuted statistics in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesOutcome<A> {
    pub stat: f64,
    pub p_value: f64,
    pub info: TimeSeriesInfo<A>,
    pub lag_contributions: Vec<f64>,
    pub null_dist: Vec<f64>,
}

/// TimeSeriesTest — cross-lag permutation test over a distance kernel.
#[derive(Debug, Clone)]
pub struct TimeSeriesTest<K: DistanceKernel> {
    pub kernel: K,
    pub max_lag: usize,
    pub selection: LagSelection,
    pub is_distance: bool,
    pub metric: Metric,
    pub options: PermutationOptions,
    results: Option<TimeSeriesOutcome<K::Aux>>,
}

/// Cross-distance-correlation test.
pub type DcorrX = TimeSeriesTest<Dcorr>;
/// Cross-multiscale-graph-correlation test.
pub type MgcX = TimeSeriesTest<Mgc>;

impl TimeSeriesTest<Dcorr> {
    /// DcorrX with the unbiased distance correlation.
    pub fn dcorrx(max_lag: usize) -> Self {
        TimeSeriesTest::with_kernel(Dcorr::new(), max_lag)
    }
}

impl TimeSeriesTest<Mgc> {
    pub fn mgcx(max_lag: usize) -> Self {
        TimeSeriesTest::with_kernel(Mgc::new(), max_lag)
    }

    /// Optimal MGC scale of the last test, if any.
    pub fn opt_scale(&self) -> Option<Scale> {
        self.results.as_ref().map(|r| r.info.opt_scale)
    }
}

impl<K: DistanceKernel> TimeSeriesTest<K> {
    pub fn with_kernel(kernel: K, max_lag: usize) -> Self {
        TimeSeriesTest {
            kernel,
            max_lag,
            selection: LagSelection::default(),
            is_distance: false,
            metric: Metric::default(),
            options: PermutationOptions::default(),
            results: None,
        }
    }

    pub fn with_options(mut self, options: PermutationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_selection(mut self, selection: LagSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_distance_input(mut self, is_distance: bool) -> Self {
        self.is_distance = is_distance;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Run the test on two feature (or distance) matrices.
    ///
    /// Parameters
    /// ----------
    /// - `x`, `y`: `n × p` and `n × q` time-ordered features, or `n × n`
    ///   distance matrices when `is_distance`.
    ///
    /// Errors
    /// ------
    /// - `InvalidMaxLag` if `max_lag >= n`.
    /// - Other validation errors from
    ///   [`prepare_time_series`](crate::data::validation::prepare_time_series).
    /// - Statistic and worker-pool errors from the permutation engine.
    pub fn test(
        &mut self, x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>,
    ) -> PermResult<TimeSeriesOutcome<K::Aux>> {
        let x = Sample::from_view(x, self.is_distance);
        let y = Sample::from_view(y, self.is_distance);
        self.test_samples(&x, &y)
    }

    /// Run the test on two univariate series.
    pub fn test_series(&mut self, x: &[f64], y: &[f64]) -> PermResult<TimeSeriesOutcome<K::Aux>> {
        self.test_samples(&Sample::from_series(x), &Sample::from_series(y))
    }

    /// Run the test on already wrapped samples.
    pub fn test_samples(&mut self, x: &Sample, y: &Sample) -> PermResult<TimeSeriesOutcome<K::Aux>> {
        let (distx, disty) = prepare_time_series(x, y, self.metric, self.max_lag)?;
        debug!(
            kernel = self.kernel.name(),
            n = distx.n(),
            max_lag = self.max_lag,
            "cross-lag independence test"
        );

        let search = LagSearch::new(&self.kernel, self.max_lag).with_selection(self.selection);
        let outcome = PermutationEngine::new(self.options).run(&search, &distx, &disty)?;
        let (stat, lags) = outcome.observed.into_parts();
        let opt_scale = search.recover_aux(&distx, &disty, lags.opt_lag)?;
        let p_value = p_value(stat, &outcome.null_dist)?;

        let result = TimeSeriesOutcome {
            stat,
            p_value,
            info: TimeSeriesInfo { opt_lag: lags.opt_lag, opt_scale },
            lag_contributions: lags.contributions,
            null_dist: outcome.null_dist.into_vec(),
        };
        self.results = Some(result.clone());
        Ok(result)
    }

    pub fn last_outcome(&self) -> Option<&TimeSeriesOutcome<K::Aux>> {
        self.results.as_ref()
    }
}
