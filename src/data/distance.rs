//! Pairwise distance metrics for turning feature matrices into distance
//! matrices.
//!
//! Conventions:
//! - Input is `n×p` (rows = observations, cols = features).
//! - Output is the symmetric `n×n` matrix with a zero diagonal.
use ndarray::{Array2, ArrayView1, ArrayView2};

/// Distance used for raw feature inputs.
///
/// - `Euclidean`: ℓ₂ norm of the row difference (default).
/// - `Manhattan`: ℓ₁ norm (city block).
/// - `Chebyshev`: ℓ∞ norm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    #[default]
    Euclidean,
    Manhattan,
    Chebyshev,
}

impl Metric {
    /// Distance between two observations.
    pub fn between(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        let diffs = a.iter().zip(b.iter()).map(|(u, v)| (u - v).abs());
        match self {
            Metric::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            Metric::Manhattan => diffs.sum(),
            Metric::Chebyshev => diffs.fold(0.0, f64::max),
        }
    }

    /// Full pairwise distance matrix of the rows of `features`.
    pub fn pairwise(&self, features: ArrayView2<'_, f64>) -> Array2<f64> {
        let n = features.nrows();
        let mut out = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in (i + 1)..n {
                let d = self.between(features.row(i), features.row(j));
                out[[i, j]] = d;
                out[[j, i]] = d;
            }
        }
        out
    }
}
