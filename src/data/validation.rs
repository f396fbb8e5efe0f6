//! data::validation — input guards and normalization for test facades.
//!
//! Purpose
//! -------
//! Turn caller-supplied samples into the normalized inputs the kernels
//! consume: pairs of [`DistanceMatrix`] values for independence and
//! time-series tests, and a `(DistanceMatrix, Labels)` pair for
//! discriminability. All shape and content checks happen here, before any
//! statistic is computed.
//!
//! Key behaviors
//! -------------
//! - Reject empty, non-finite, non-square (for distance input) and
//!   mismatched samples.
//! - Compute distance matrices for feature inputs with the configured
//!   [`Metric`].
//! - Enforce the lag-grid invariant `max_lag < n`.
//! - Optionally drop isolated observations (labels occurring once) and
//!   require at least two label classes.
//!
//! Conventions
//! -----------
//! - Errors are reported as input-validation variants of [`PermError`].
//! - Functions are pure; they allocate only the normalized outputs.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each error branch and the isolate-removal path.
use ndarray::ArrayView2;

use crate::{
    data::{
        distance::Metric,
        sample::{DistanceMatrix, Labels, Sample},
    },
    statistical_tests::errors::{PermError, PermResult},
};

/// Smallest sample size accepted by paired independence and time-series tests.
pub const MIN_PAIRED_SAMPLES: usize = 4;

/// Reject NaN/±∞ anywhere in a feature matrix.
pub fn check_finite(features: ArrayView2<'_, f64>) -> PermResult<()> {
    if let Some(((row, col), &value)) = features.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(PermError::NonFiniteData { row, col, value });
    }
    Ok(())
}

/// Normalize a single sample into a distance matrix.
///
/// Errors
/// ------
/// - `EmptySample` for zero rows.
/// - `NonFiniteData` for NaN/±∞ entries.
/// - `NonSquareDistance` for distance input that is not `n × n`.
pub fn to_distance(sample: &Sample, metric: Metric) -> PermResult<DistanceMatrix> {
    match sample {
        Sample::Distance(m) => DistanceMatrix::new(m.clone()),
        Sample::Features(m) => {
            if m.nrows() == 0 {
                return Err(PermError::EmptySample);
            }
            check_finite(m.view())?;
            DistanceMatrix::new(metric.pairwise(m.view()))
        }
    }
}

/// Normalize a paired sample for independence-style tests.
///
/// Errors
/// ------
/// - Any error from [`to_distance`].
/// - `SampleCountMismatch` if `x` and `y` disagree on `n`.
/// - `InsufficientSamples` if `n < MIN_PAIRED_SAMPLES`.
pub fn prepare_pair(
    x: &Sample, y: &Sample, metric: Metric,
) -> PermResult<(DistanceMatrix, DistanceMatrix)> {
    let (nx, ny) = (x.n_samples(), y.n_samples());
    if nx != ny {
        return Err(PermError::SampleCountMismatch { x: nx, y: ny });
    }
    if nx < MIN_PAIRED_SAMPLES {
        return Err(PermError::InsufficientSamples { n: nx, min: MIN_PAIRED_SAMPLES });
    }
    Ok((to_distance(x, metric)?, to_distance(y, metric)?))
}

/// Normalize a paired time series and check the lag grid.
///
/// Errors
/// ------
/// - Any error from [`prepare_pair`].
/// - `InvalidMaxLag` if `max_lag >= n`.
pub fn prepare_time_series(
    x: &Sample, y: &Sample, metric: Metric, max_lag: usize,
) -> PermResult<(DistanceMatrix, DistanceMatrix)> {
    let n = x.n_samples();
    if n == y.n_samples() && max_lag >= n {
        return Err(PermError::InvalidMaxLag { max_lag, n });
    }
    prepare_pair(x, y, metric)
}

/// Normalize inputs for a one-sample discriminability test.
///
/// Parameters
/// ----------
/// - `x`: features or precomputed distances, one row per measurement.
/// - `labels`: subject/item identifier per measurement.
/// - `remove_isolates`: drop measurements whose label occurs exactly once.
///
/// Errors
/// ------
/// - `SampleCountMismatch` if `x` and `labels` disagree on `n`.
/// - `TooFewLabels` if fewer than two classes remain after isolate removal.
/// - `InsufficientSamples` if no class has a repeated measurement.
/// - Any error from [`to_distance`].
pub fn prepare_discrim(
    x: &Sample, labels: &Labels, metric: Metric, remove_isolates: bool,
) -> PermResult<(DistanceMatrix, Labels)> {
    let n = x.n_samples();
    if n != labels.len() {
        return Err(PermError::SampleCountMismatch { x: n, y: labels.len() });
    }
    let dist = to_distance(x, metric)?;

    let (dist, labels) = if remove_isolates {
        let counts = labels.class_counts();
        let keep: Vec<usize> = (0..n).filter(|&i| counts[labels.codes()[i]] > 1).collect();
        if keep.len() == n {
            (dist, labels.clone())
        } else {
            (dist.select(&keep), labels.select(&keep))
        }
    } else {
        (dist, labels.clone())
    };

    if labels.n_classes() < 2 {
        return Err(PermError::TooFewLabels { distinct: labels.n_classes() });
    }
    if labels.class_counts().iter().all(|&c| c < 2) {
        return Err(PermError::InsufficientSamples {
            n: labels.len(),
            min: 2 * labels.n_classes(),
        });
    }
    Ok((dist, labels))
}
