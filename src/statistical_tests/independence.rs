//! statistical_tests::independence — plain permutation independence test.
//!
//! Runs a distance kernel once on the observed pair and on `reps`
//! permutations of `y`, without any lag structure. This is the lag-0
//! counterpart of [`TimeSeriesTest`](super::time_series::TimeSeriesTest);
//! unlike the lagged statistic, the observed value is not clipped at zero.
use ndarray::ArrayView2;
use tracing::debug;

use crate::{
    data::{Metric, Sample, validation::prepare_pair},
    kernels::{Dcorr, DistanceKernel, Mgc},
    permutation::{PermutationEngine, PermutationOptions, p_value},
    statistical_tests::errors::PermResult,
};

/// IndependenceOutcome — statistic, p-value and kernel output.
#[derive(Debug, Clone, PartialEq)]
pub struct IndependenceOutcome<A> {
    pub stat: f64,
    pub p_value: f64,
    pub aux: A,
    pub null_dist: Vec<f64>,
}

/// IndependenceTest — permutation test of `x ⟂ y` for a distance kernel.
#[derive(Debug, Clone)]
pub struct IndependenceTest<K: DistanceKernel> {
    pub kernel: K,
    pub is_distance: bool,
    pub metric: Metric,
    pub options: PermutationOptions,
    results: Option<IndependenceOutcome<K::Aux>>,
}

impl IndependenceTest<Dcorr> {
    pub fn dcorr() -> Self {
        IndependenceTest::with_kernel(Dcorr::new())
    }
}

impl IndependenceTest<Mgc> {
    pub fn mgc() -> Self {
        IndependenceTest::with_kernel(Mgc::new())
    }
}

impl<K: DistanceKernel> IndependenceTest<K> {
    pub fn with_kernel(kernel: K) -> Self {
        IndependenceTest {
            kernel,
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

    pub fn with_distance_input(mut self, is_distance: bool) -> Self {
        self.is_distance = is_distance;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Errors
    /// ------
    /// - Validation errors from [`prepare_pair`].
    /// - Statistic and worker-pool errors from the permutation engine.
    pub fn test(
        &mut self, x: ArrayView2<'_, f64>, y: ArrayView2<'_, f64>,
    ) -> PermResult<IndependenceOutcome<K::Aux>> {
        let x = Sample::from_view(x, self.is_distance);
        let y = Sample::from_view(y, self.is_distance);
        self.test_samples(&x, &y)
    }

    pub fn test_samples(
        &mut self, x: &Sample, y: &Sample,
    ) -> PermResult<IndependenceOutcome<K::Aux>> {
        let (distx, disty) = prepare_pair(x, y, self.metric)?;
        debug!(kernel = self.kernel.name(), n = distx.n(), "independence test");

        let outcome = PermutationEngine::new(self.options).run(&self.kernel, &distx, &disty)?;
        let (stat, aux) = outcome.observed.into_parts();
        let p_value = p_value(stat, &outcome.null_dist)?;

        let result =
            IndependenceOutcome { stat, p_value, aux, null_dist: outcome.null_dist.into_vec() };
        self.results = Some(result.clone());
        Ok(result)
    }

    pub fn last_outcome(&self) -> Option<&IndependenceOutcome<K::Aux>> {
        self.results.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    // Purpose
    // -------
    // Verify that a strong monotone relation is detected.
    //
    // Given
    // -----
    // - x = 0..20, y = x³, 100 seeded draws.
    //
    // Expect
    // ------
    // - Dcorr statistic above 0.8 and p-value at the 1/100 floor.
    fn independence_dcorr_detects_monotone_relation() {
        // Arrange
        let x = Array2::from_shape_fn((20, 1), |(i, _)| i as f64);
        let y = x.mapv(|v| v.powi(3));
        let opts = PermutationOptions::new(100, 1, Some(5)).unwrap();
        let mut test = IndependenceTest::dcorr().with_options(opts);

        // Act
        let outcome = test.test(x.view(), y.view()).unwrap();

        // Assert
        assert!(outcome.stat > 0.8, "stat = {}", outcome.stat);
        assert_eq!(outcome.p_value, 0.01);
    }
}
