//! data::sample — sample containers consumed by statistic kernels.
//!
//! Purpose
//! -------
//! Hold the normalized forms of test inputs: raw samples as handed in by
//! callers ([`Sample`]), validated pairwise-distance matrices
//! ([`DistanceMatrix`]) and dense class codes ([`Labels`]). Both normalized
//! forms implement [`Permutable`], which is the only capability the
//! permutation engine needs from the permuted input.
//!
//! Invariants & assumptions
//! ------------------------
//! - A `DistanceMatrix` is square with finite entries; this is enforced by
//!   [`DistanceMatrix::new`].
//! - `Labels` codes are `0..n_classes`, assigned in order of first
//!   appearance.
//! - Permutations passed to [`Permutable::permuted`] are bijections on
//!   `0..n_samples()`; they are produced by the engine, never by callers.
use std::collections::HashMap;
use std::hash::Hash;

use ndarray::{Array2, ArrayView2, Axis, s};

use crate::statistical_tests::errors::{PermError, PermResult};

/// Input whose observations can be relabelled by a permutation of rows.
pub trait Permutable: Sized {
    /// Number of observations (rows).
    fn n_samples(&self) -> usize;

    /// Copy of `self` with observation `i` replaced by observation `perm[i]`.
    fn permuted(&self, perm: &[usize]) -> Self;
}

/// Sample — raw input as supplied by the caller.
///
/// - `Features(n × p)`: one row per observation; distances are computed
///   with the facade's [`Metric`](crate::data::distance::Metric).
/// - `Distance(n × n)`: precomputed pairwise distances.
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Features(Array2<f64>),
    Distance(Array2<f64>),
}

impl Sample {
    /// Number of observations represented by this sample.
    pub fn n_samples(&self) -> usize {
        match self {
            Sample::Features(m) | Sample::Distance(m) => m.nrows(),
        }
    }

    /// Wrap a view as features or as a distance matrix depending on `is_distance`.
    pub fn from_view(view: ArrayView2<'_, f64>, is_distance: bool) -> Self {
        if is_distance {
            Sample::Distance(view.to_owned())
        } else {
            Sample::Features(view.to_owned())
        }
    }

    /// Treat a 1-D series as an `n × 1` feature matrix.
    pub fn from_series(series: &[f64]) -> Self {
        let column = Array2::from_shape_fn((series.len(), 1), |(i, _)| series[i]);
        Sample::Features(column)
    }
}

/// DistanceMatrix — validated square matrix of pairwise distances.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    inner: Array2<f64>,
}

impl DistanceMatrix {
    /// Validate and wrap a square, finite matrix.
    ///
    /// Errors
    /// ------
    /// - `PermError::EmptySample` if the matrix has no rows.
    /// - `PermError::NonSquareDistance` if `rows != cols`.
    /// - `PermError::NonFiniteData` on the first NaN/±∞ entry.
    pub fn new(inner: Array2<f64>) -> PermResult<Self> {
        let (rows, cols) = inner.dim();
        if rows == 0 {
            return Err(PermError::EmptySample);
        }
        if rows != cols {
            return Err(PermError::NonSquareDistance { rows, cols });
        }
        if let Some(((row, col), &value)) = inner.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(PermError::NonFiniteData { row, col, value });
        }
        Ok(DistanceMatrix { inner })
    }

    /// Wrap a matrix known to be square and finite (kernel-internal slices).
    pub(crate) fn from_trusted(inner: Array2<f64>) -> Self {
        debug_assert_eq!(inner.nrows(), inner.ncols());
        DistanceMatrix { inner }
    }

    pub fn n(&self) -> usize {
        self.inner.nrows()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.inner.view()
    }

    /// Trailing block `[j.., j..]`: observations `j..n`.
    pub fn tail(&self, j: usize) -> DistanceMatrix {
        DistanceMatrix::from_trusted(self.inner.slice(s![j.., j..]).to_owned())
    }

    /// Leading block `[..n-j, ..n-j]`: observations `0..n-j`.
    pub fn head(&self, j: usize) -> DistanceMatrix {
        let end = self.n() - j;
        DistanceMatrix::from_trusted(self.inner.slice(s![..end, ..end]).to_owned())
    }

    /// Keep only the observations in `keep`, on both axes.
    pub fn select(&self, keep: &[usize]) -> DistanceMatrix {
        DistanceMatrix::from_trusted(self.inner.select(Axis(0), keep).select(Axis(1), keep))
    }
}

impl Permutable for DistanceMatrix {
    fn n_samples(&self) -> usize {
        self.n()
    }

    fn permuted(&self, perm: &[usize]) -> Self {
        self.select(perm)
    }
}

/// Labels — dense class codes for discriminability tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    codes: Vec<usize>,
    n_classes: usize,
}

impl Labels {
    /// Encode arbitrary hashable labels as `0..n_classes`, in order of first
    /// appearance.
    pub fn encode<T: Eq + Hash>(raw: &[T]) -> Self {
        let mut lookup: HashMap<&T, usize> = HashMap::new();
        let codes = raw
            .iter()
            .map(|label| {
                let next = lookup.len();
                *lookup.entry(label).or_insert(next)
            })
            .collect();
        Labels { codes, n_classes: lookup.len() }
    }

    pub fn codes(&self) -> &[usize] {
        &self.codes
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Number of observations carrying each class code.
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes];
        for &code in &self.codes {
            counts[code] += 1;
        }
        counts
    }

    /// Keep only the observations in `keep`, re-encoding the classes densely.
    pub fn select(&self, keep: &[usize]) -> Labels {
        let kept: Vec<usize> = keep.iter().map(|&i| self.codes[i]).collect();
        Labels::encode(&kept)
    }
}

impl Permutable for Labels {
    fn n_samples(&self) -> usize {
        self.len()
    }

    fn permuted(&self, perm: &[usize]) -> Self {
        Labels { codes: perm.iter().map(|&i| self.codes[i]).collect(), n_classes: self.n_classes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Ensure non-square input is rejected by `DistanceMatrix::new`.
    //
    // Given
    // -----
    // - A 2 × 3 matrix.
    //
    // Expect
    // ------
    // - `Err(PermError::NonSquareDistance { rows: 2, cols: 3 })`.
    fn distance_matrix_new_non_square_returns_error() {
        // Arrange
        let m = Array2::<f64>::zeros((2, 3));

        // Act
        let result = DistanceMatrix::new(m);

        // Assert
        assert_eq!(result, Err(PermError::NonSquareDistance { rows: 2, cols: 3 }));
    }

    #[test]
    // Purpose
    // -------
    // Verify that head/tail lag slices have matching sizes and pick the
    // documented blocks.
    //
    // Given
    // -----
    // - A 4 × 4 matrix with entry (i, j) = 10 i + j.
    //
    // Expect
    // ------
    // - `tail(1)` starts at (1, 1); `head(1)` ends at (2, 2); both 3 × 3.
    fn distance_matrix_head_and_tail_align_for_lag() {
        // Arrange
        let m = Array2::from_shape_fn((4, 4), |(i, j)| (10 * i + j) as f64);
        let dist = DistanceMatrix::from_trusted(m);

        // Act
        let tail = dist.tail(1);
        let head = dist.head(1);

        // Assert
        assert_eq!(tail.n(), 3);
        assert_eq!(head.n(), 3);
        assert_eq!(tail.view()[[0, 0]], 11.0);
        assert_eq!(head.view()[[2, 2]], 22.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify that permuting a distance matrix relabels rows and columns
    // consistently, keeping the diagonal at zero.
    //
    // Given
    // -----
    // - A 3 × 3 distance matrix and the permutation [2, 0, 1].
    //
    // Expect
    // ------
    // - Entry (0, 1) of the result equals entry (2, 0) of the input.
    fn distance_matrix_permuted_moves_rows_and_columns() {
        // Arrange
        let dist =
            DistanceMatrix::new(array![[0.0, 1.0, 2.0], [1.0, 0.0, 3.0], [2.0, 3.0, 0.0]]).unwrap();

        // Act
        let perm = dist.permuted(&[2, 0, 1]);

        // Assert
        assert_eq!(perm.view()[[0, 1]], 2.0);
        assert!(perm.view().diag().iter().all(|&d| d == 0.0));
    }

    #[test]
    // Purpose
    // -------
    // Verify dense label encoding and class counts.
    //
    // Given
    // -----
    // - Labels ["b", "a", "b", "c"].
    //
    // Expect
    // ------
    // - Codes [0, 1, 0, 2], three classes, counts [2, 1, 1].
    fn labels_encode_assigns_codes_in_first_appearance_order() {
        // Arrange
        let raw = ["b", "a", "b", "c"];

        // Act
        let labels = Labels::encode(&raw);

        // Assert
        assert_eq!(labels.codes(), &[0, 1, 0, 2]);
        assert_eq!(labels.n_classes(), 3);
        assert_eq!(labels.class_counts(), vec![2, 1, 1]);
    }
}
