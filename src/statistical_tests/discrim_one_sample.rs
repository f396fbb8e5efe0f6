//! statistical_tests::discrim_one_sample — one-sample discriminability test.
//!
//! Purpose
//! -------
//! Test whether repeated measurements of the same item are more similar to
//! each other than to measurements of other items. The null hypothesis is
//! that the discriminability index equals the value expected when labels
//! carry no information; the alternative is that it is larger.
//!
//! Key behaviors
//! -------------
//! - Normalize `x` (features or distances) and the labels, optionally
//!   dropping isolated measurements, via
//!   [`prepare_discrim`](crate::data::validation::prepare_discrim).
//! - Compute the [`Discriminability`] statistic once on the observed labels,
//!   then build its null distribution by permuting the labels.
//! - Store the most recent [`DiscrimOutcome`] for inspection.
//!
//! Conventions
//! -----------
//! - Defaults: features input, isolates removed, Euclidean metric, 1000
//!   draws on all available cores.
//!
//! Testing notes
//! -------------
//! - The separated-groups scenario lives in the integration tests.
use std::hash::Hash;

use ndarray::ArrayView2;
use tracing::debug;

use crate::{
    data::{Labels, Metric, Sample, validation::prepare_discrim},
    kernels::Discriminability,
    permutation::{PermutationEngine, PermutationOptions, Workers, p_value},
    statistical_tests::errors::PermResult,
};

/// DiscrimOutcome — result of one discriminability test.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscrimOutcome {
    pub stat: f64,
    pub p_value: f64,
    pub null_dist: Vec<f64>,
}

/// DiscrimOneSample — configured discriminability test.
///
/// Fields
/// ------
/// - `is_distance`: treat `x` as a precomputed `n × n` distance matrix.
/// - `remove_isolates`: drop measurements whose label occurs exactly once.
/// - `metric`: distance used for feature input.
/// - `options`: permutation configuration.
/// - `results`: outcome of the last successful `test` call.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscrimOneSample {
    pub is_distance: bool,
    pub remove_isolates: bool,
    pub metric: Metric,
    pub options: PermutationOptions,
    results: Option<DiscrimOutcome>,
}

impl DiscrimOneSample {
    pub fn new() -> Self {
        DiscrimOneSample {
            is_distance: false,
            remove_isolates: true,
            metric: Metric::default(),
            options: PermutationOptions::default().with_workers(Workers::AllAvailable),
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

    pub fn with_remove_isolates(mut self, remove_isolates: bool) -> Self {
        self.remove_isolates = remove_isolates;
        self
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Run the test on a feature or distance matrix and raw labels.
    ///
    /// Parameters
    /// ----------
    /// - `x`: `n × p` features, or `n × n` distances when `is_distance`.
    /// - `labels`: item identifier per row of `x`.
    ///
    /// Errors
    /// ------
    /// - Validation errors from
    ///   [`prepare_discrim`](crate::data::validation::prepare_discrim).
    /// - Statistic and worker-pool errors from the permutation engine.
    pub fn test<T: Eq + Hash>(
        &mut self, x: ArrayView2<'_, f64>, labels: &[T],
    ) -> PermResult<DiscrimOutcome> {
        let sample = Sample::from_view(x, self.is_distance);
        self.test_samples(&sample, &Labels::encode(labels))
    }

    /// Run the test on an already wrapped sample and encoded labels.
    pub fn test_samples(&mut self, x: &Sample, labels: &Labels) -> PermResult<DiscrimOutcome> {
        let (dist, labels) = prepare_discrim(x, labels, self.metric, self.remove_isolates)?;
        debug!(n = dist.n(), classes = labels.n_classes(), "discriminability test");

        let outcome = PermutationEngine::new(self.options).run(&Discriminability, &dist, &labels)?;
        let stat = outcome.observed.stat();
        let p_value = p_value(stat, &outcome.null_dist)?;

        let result = DiscrimOutcome { stat, p_value, null_dist: outcome.null_dist.into_vec() };
        self.results = Some(result.clone());
        Ok(result)
    }

    pub fn last_outcome(&self) -> Option<&DiscrimOutcome> {
        self.results.as_ref()
    }
}

impl Default for DiscrimOneSample {
    fn default() -> Self {
        DiscrimOneSample::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistical_tests::errors::PermError;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Verify that a successful test fills the last-result snapshot and that
    // p-values respect the floor.
    //
    // Given
    // -----
    // - Three items measured twice, well separated; 50 seeded draws.
    //
    // Expect
    // ------
    // - stat = 1, p in [1/50, 1], snapshot equals the returned outcome.
    fn discrim_test_records_last_outcome() {
        // Arrange
        let x = array![[0.0], [0.1], [5.0], [5.1], [10.0], [10.1]];
        let labels = ["a", "a", "b", "b", "c", "c"];
        let opts = PermutationOptions::new(50, 1, Some(3)).unwrap();
        let mut test = DiscrimOneSample::new().with_options(opts);

        // Act
        let outcome = test.test(x.view(), &labels).unwrap();

        // Assert
        assert!((outcome.stat - 1.0).abs() < 1e-12);
        assert!(outcome.p_value >= 1.0 / 50.0 && outcome.p_value <= 1.0);
        assert_eq!(outcome.null_dist.len(), 50);
        assert_eq!(test.last_outcome(), Some(&outcome));
    }

    #[test]
    // Purpose
    // -------
    // Ensure a label vector of the wrong length is rejected before any draw.
    //
    // Given
    // -----
    // - Four rows and three labels.
    //
    // Expect
    // ------
    // - `Err(SampleCountMismatch { x: 4, y: 3 })` and no snapshot.
    fn discrim_test_label_length_mismatch_returns_error() {
        // Arrange
        let x = array![[0.0], [0.1], [5.0], [5.1]];
        let mut test = DiscrimOneSample::default();

        // Act
        let result = test.test(x.view(), &[1, 1, 2]);

        // Assert
        assert_eq!(result, Err(PermError::SampleCountMismatch { x: 4, y: 3 }));
        assert!(test.last_outcome().is_none());
    }
}
