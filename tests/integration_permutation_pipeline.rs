//! Integration tests for the permutation testing pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end path from raw samples, through validation and
//!   distance normalization, to the permutation engine and p-values, for
//!   every public test facade.
//! - Exercise realistic dependence structures (separated groups, lagged
//!   autoregressive coupling) rather than toy edge cases only.
//!
//! Coverage
//! --------
//! - `statistical_tests::DiscrimOneSample` on separated groups.
//! - `statistical_tests::{DcorrX, MgcX}`:
//!   - optimal lag and scale recovery,
//!   - reproducibility across worker strategies,
//!   - equivalence of feature and precomputed-distance inputs,
//!   - lag-0 agreement with `IndependenceTest`, and clipping of a negative
//!     plain statistic.
//! - Error propagation from a failing kernel during the permutation phase.
//!
//! Exclusions
//! ----------
//! - Low-level kernel arithmetic and validation branches, which are
//!   covered by unit tests.
//! - Python bindings.
use approx::assert_relative_eq;
use ndarray::{Array2, Axis, concatenate};
use rand::{SeedableRng, distributions::Distribution};
use rand_chacha::ChaCha8Rng;
use rust_permtests::{
    data::{DistanceMatrix, Sample},
    kernels::{Dcorr, Scale, StatisticKernel, StatisticResult},
    permutation::{PermutationOptions, Workers},
    statistical_tests::{
        DcorrX, DiscrimOneSample, IndependenceTest, MgcX, PermError, PermResult, TimeSeriesTest,
    },
};
use statrs::distribution::Normal;
use std::num::NonZeroUsize;

/// Purpose
/// -------
/// Simulate a pair of AR processes coupled at a fixed lag:
/// `x_t = φ y_{t−lag} + ε_t`, `y_t = φ x_{t−lag} + η_t`, with Gaussian
/// noise of standard deviation `sigma`.
///
/// Returns
/// -------
/// - Two series of length `n`, deterministic for a given `seed`.
fn cross_corr_ar(n: usize, lag: usize, phi: f64, sigma: f64, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = Normal::new(0.0, sigma).unwrap();
    let eps: Vec<f64> = (0..n).map(|_| noise.sample(&mut rng)).collect();
    let eta: Vec<f64> = (0..n).map(|_| noise.sample(&mut rng)).collect();

    let mut x = vec![0.0; n];
    let mut y = vec![0.0; n];
    x[..lag].copy_from_slice(&eps[..lag]);
    y[..lag].copy_from_slice(&eta[..lag]);
    for t in lag..n {
        x[t] = phi * y[t - lag] + eps[t];
        y[t] = phi * x[t - lag] + eta[t];
    }
    (x, y)
}

fn column(values: &[f64]) -> Array2<f64> {
    Array2::from_shape_fn((values.len(), 1), |(i, _)| values[i])
}

/// Kernel that fails as soon as `y` is no longer in its original order.
struct FailOnPermutedKernel;

impl StatisticKernel<DistanceMatrix, DistanceMatrix> for FailOnPermutedKernel {
    type Aux = ();

    fn name(&self) -> &'static str {
        "fail_on_permuted"
    }

    fn evaluate(&self, x: &DistanceMatrix, y: &DistanceMatrix) -> PermResult<StatisticResult<()>> {
        if y.view()[[0, 1]] != 1.0 {
            return Err(PermError::StatisticComputation {
                kernel: self.name(),
                reason: "permuted input".into(),
            });
        }
        Dcorr::new().evaluate(x, y)
    }
}

#[test]
// Purpose
// -------
// Two perfectly separated items are maximally discriminable.
//
// Given
// -----
// - 50 measurements at (0, 0) labelled 0 and 50 at (1, 1) labelled 1.
// - 1000 seeded draws on all available cores.
//
// Expect
// ------
// - Statistic = 1 and p-value at the 1/1000 floor.
fn discrim_separated_groups_reaches_floor() {
    // Arrange
    let x = concatenate![Axis(0), Array2::<f64>::zeros((50, 2)), Array2::<f64>::ones((50, 2))];
    let labels: Vec<u8> = (0..100).map(|i| u8::from(i >= 50)).collect();
    let opts = PermutationOptions::new(1000, -1, Some(2024)).unwrap();
    let mut test = DiscrimOneSample::new().with_options(opts);

    // Act
    let outcome = test.test(x.view(), &labels).unwrap();

    // Assert
    assert_relative_eq!(outcome.stat, 1.0, epsilon = 1e-12);
    assert_relative_eq!(outcome.p_value, 1.0 / 1000.0);
}

#[test]
// Purpose
// -------
// MgcX on identical short series recovers the full-scale optimum.
//
// Given
// -----
// - x = y = 0, 1, …, 6; max_lag = 0; 100 seeded draws.
//
// Expect
// ------
// - Statistic ≈ 1, opt_lag = 0 and opt_scale = (7, 7).
fn mgcx_identical_series_recovers_full_scale() {
    // Arrange
    let series: Vec<f64> = (0..7).map(f64::from).collect();
    let opts = PermutationOptions::new(100, 1, Some(1)).unwrap();
    let mut test = MgcX::mgcx(0).with_options(opts);

    // Act
    let outcome = test.test_series(&series, &series).unwrap();

    // Assert
    assert_relative_eq!(outcome.stat, 1.0, epsilon = 1e-9);
    assert_eq!(outcome.info.opt_lag, 0);
    assert_eq!(outcome.info.opt_scale, Scale { x: 7, y: 7 });
    assert_eq!(test.opt_scale(), Some(Scale { x: 7, y: 7 }));
    assert!(outcome.p_value >= 0.01 && outcome.p_value <= 1.0);
}

#[test]
// Purpose
// -------
// DcorrX locates lag-1 coupling between autoregressive series.
//
// Given
// -----
// - Seeded cross-correlated AR pairs (n = 100 and n = 200, φ = 0.9,
//   σ = 0.1, coupling at lag 1); max_lag = 1; 200 seeded draws.
//
// Expect
// ------
// - opt_lag = 1 and p-value at the 1/200 floor for both sample sizes.
fn dcorrx_cross_correlated_ar_selects_lag_one() {
    for n in [100, 200] {
        // Arrange
        let (x, y) = cross_corr_ar(n, 1, 0.9, 0.1, 123_456_789);
        let opts = PermutationOptions::new(200, 1, Some(7)).unwrap();
        let mut test = DcorrX::dcorrx(1).with_options(opts);

        // Act
        let outcome = test.test_series(&x, &y).unwrap();

        // Assert
        assert_eq!(outcome.info.opt_lag, 1, "n = {n}");
        assert_relative_eq!(outcome.p_value, 1.0 / 200.0);
        assert!(outcome.lag_contributions[1] > outcome.lag_contributions[0]);
    }
}

#[test]
// Purpose
// -------
// A fixed seed reproduces the same outcome for every worker strategy.
//
// Given
// -----
// - The lag-1 AR pair, MgcX with max_lag = 2, 40 draws, seed 99.
// - Sequential, 3 fixed workers and all available cores.
//
// Expect
// ------
// - Identical statistic, p-value, optimal lag/scale and null distribution.
fn mgcx_fixed_seed_is_reproducible_across_workers() {
    // Arrange
    let (x, y) = cross_corr_ar(40, 1, 0.9, 0.1, 5);
    let base = PermutationOptions::new(40, 1, Some(99)).unwrap();
    let strategies = [
        Workers::Sequential,
        Workers::Fixed(NonZeroUsize::new(3).unwrap()),
        Workers::AllAvailable,
    ];

    // Act
    let outcomes: Vec<_> = strategies
        .iter()
        .map(|&w| {
            MgcX::mgcx(2).with_options(base.with_workers(w)).test_series(&x, &y).unwrap()
        })
        .collect();

    // Assert
    assert_eq!(outcomes[0], outcomes[1]);
    assert_eq!(outcomes[0], outcomes[2]);
}

#[test]
// Purpose
// -------
// A constant series carries no dependence at any lag.
//
// Given
// -----
// - x = 1 (six times), y = 1..6, max_lag = 3, 50 draws.
//
// Expect
// ------
// - Statistic 0, every contribution 0, p-value 1.
fn dcorrx_constant_series_yields_zero_and_unit_p_value() {
    // Arrange
    let x = [1.0; 6];
    let y = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let opts = PermutationOptions::new(50, 1, Some(3)).unwrap();
    let mut test = DcorrX::dcorrx(3).with_options(opts);

    // Act
    let outcome = test.test_series(&x, &y).unwrap();

    // Assert
    assert_eq!(outcome.stat, 0.0);
    assert!(outcome.lag_contributions.iter().all(|&c| c == 0.0));
    assert_eq!(outcome.p_value, 1.0);
}

#[test]
// Purpose
// -------
// Precomputed Euclidean distances are equivalent to raw features.
//
// Given
// -----
// - The lag-1 AR pair (n = 30) as features and as |a_i − a_j| matrices;
//   max_lag = 1; identical seeds.
//
// Expect
// ------
// - Identical statistics and p-values.
fn dcorrx_distance_input_matches_feature_input() {
    // Arrange
    let (x, y) = cross_corr_ar(30, 1, 0.9, 0.1, 17);
    let abs_diff =
        |v: &[f64]| Array2::from_shape_fn((v.len(), v.len()), |(i, j)| (v[i] - v[j]).abs());
    let opts = PermutationOptions::new(50, 1, Some(4)).unwrap();

    // Act
    let features = DcorrX::dcorrx(1).with_options(opts).test_series(&x, &y).unwrap();
    let distances = DcorrX::dcorrx(1)
        .with_options(opts)
        .with_distance_input(true)
        .test(abs_diff(&x).view(), abs_diff(&y).view())
        .unwrap();

    // Assert
    assert_relative_eq!(features.stat, distances.stat, epsilon = 1e-12);
    assert_eq!(features.p_value, distances.p_value);
}

#[test]
// Purpose
// -------
// With max_lag = 0 the lagged statistic equals the plain independence
// statistic.
//
// Given
// -----
// - y_t = x_t² + small noise on a seeded AR series, n = 60.
//
// Expect
// ------
// - Identical statistics and p-values (the plain value is positive, so
//   clipping is inactive), both within [1/reps, 1].
fn dcorrx_lag_zero_matches_independence_test() {
    // Arrange
    let (x, noise) = cross_corr_ar(60, 1, 0.5, 1.0, 8);
    let y: Vec<f64> = x.iter().zip(&noise).map(|(v, e)| v * v + 0.01 * e).collect();
    let opts = PermutationOptions::new(100, 1, Some(12)).unwrap();

    // Act
    let lagged = DcorrX::dcorrx(0).with_options(opts).test_series(&x, &y).unwrap();
    let plain = IndependenceTest::dcorr()
        .with_options(opts)
        .test(column(&x).view(), column(&y).view())
        .unwrap();

    // Assert
    assert!(plain.stat > 0.0);
    assert_relative_eq!(lagged.stat, plain.stat, epsilon = 1e-12);
    assert_eq!(lagged.p_value, plain.p_value);
    assert_eq!(lagged.info.opt_lag, 0);
    for p in [lagged.p_value, plain.p_value] {
        assert!((0.01..=1.0).contains(&p), "p = {p}");
    }
}

#[test]
// Purpose
// -------
// A negative plain statistic is clipped to 0 by the lag search, so lag-0
// equivalence stops at the sign boundary.
//
// Given
// -----
// - x = 0..7 and a scrambled y = 3, 7, 1, 5, 0, 6, 2, 4; 100 seeded draws.
//
// Expect
// ------
// - The plain unbiased Dcorr is negative.
// - The lagged statistic is 0 and its p-value is 1, since every clipped
//   permuted statistic is at least 0.
fn dcorrx_lag_zero_clips_negative_plain_statistic() {
    // Arrange
    let x: Vec<f64> = (0..8).map(f64::from).collect();
    let y = [3.0, 7.0, 1.0, 5.0, 0.0, 6.0, 2.0, 4.0];
    let opts = PermutationOptions::new(100, 1, Some(12)).unwrap();

    // Act
    let lagged = DcorrX::dcorrx(0).with_options(opts).test_series(&x, &y).unwrap();
    let plain = IndependenceTest::dcorr()
        .with_options(opts)
        .test(column(&x).view(), column(&y).view())
        .unwrap();

    // Assert
    assert!(plain.stat < 0.0, "plain stat = {}", plain.stat);
    assert_eq!(lagged.stat, 0.0);
    assert_eq!(lagged.p_value, 1.0);
}

#[test]
// Purpose
// -------
// A kernel failure during the permutation phase aborts the whole test.
//
// Given
// -----
// - A kernel that succeeds on the observed order and fails once `y` is
//   permuted; n = 10, 20 draws on two workers.
//
// Expect
// ------
// - `Err(StatisticComputation { kernel: "fail_on_permuted", .. })` and no
//   recorded outcome.
fn failing_kernel_during_permutation_propagates_error() {
    // Arrange
    let series: Vec<f64> = (0..10).map(f64::from).collect();
    let opts = PermutationOptions::new(20, 2, Some(31)).unwrap();
    let mut test = TimeSeriesTest::with_kernel(FailOnPermutedKernel, 0).with_options(opts);

    // Act
    let result = test.test_samples(&Sample::from_series(&series), &Sample::from_series(&series));

    // Assert
    match result {
        Err(PermError::StatisticComputation { kernel: "fail_on_permuted", .. }) => (),
        other => panic!("expected StatisticComputation error, got {other:?}"),
    }
    assert!(test.last_outcome().is_none());
}
