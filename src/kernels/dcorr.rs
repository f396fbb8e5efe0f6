//! kernels::dcorr — distance correlation.
//!
//! Purpose
//! -------
//! Compute the distance correlation between two samples given as distance
//! matrices:
//!
//! ```text
//! dCor(x, y) = dCov(x, y) / sqrt(dCov(x, x) · dCov(y, y))
//! ```
//!
//! where `dCov` is the inner product of the centered distance matrices.
//! The default is the unbiased (U-centered) estimator; a biased
//! (double-centered) variant is available via [`Dcorr::biased`].
//!
//! Conventions
//! -----------
//! - U-centering: `Ã_ij = a_ij − a_i·/(n−2) − a_·j/(n−2) + a_··/((n−1)(n−2))`
//!   with a zero diagonal, and `dCov = Σ Ã_ij B̃_ij / (n(n−3))`.
//! - Double centering: `Ã_ij = a_ij − ā_i· − ā_·j + ā_··` and
//!   `dCov = Σ Ã_ij B̃_ij / n²`.
//! - A non-positive variance term yields a statistic of `0.0`.
//! - The unbiased estimator needs `n ≥ 4`; smaller inputs (which arise
//!   from deep lag slices) yield `0.0`.
use ndarray::{Array2, ArrayView2, Axis};

use crate::{
    data::DistanceMatrix,
    kernels::{StatisticKernel, StatisticResult},
    statistical_tests::errors::PermResult,
};

/// Distance correlation kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dcorr {
    bias: bool,
}

impl Dcorr {
    /// Unbiased distance correlation.
    pub fn new() -> Self {
        Dcorr { bias: false }
    }

    /// Biased (V-statistic) distance correlation.
    pub fn biased() -> Self {
        Dcorr { bias: true }
    }

    /// Distance correlation of two equally sized distance matrices.
    pub fn correlation(&self, distx: ArrayView2<'_, f64>, disty: ArrayView2<'_, f64>) -> f64 {
        let n = distx.nrows();
        if !self.bias && n < 4 {
            return 0.0;
        }
        let cx = center(distx, self.bias);
        let cy = center(disty, self.bias);
        let var_x = dcov(&cx, &cx, self.bias);
        let var_y = dcov(&cy, &cy, self.bias);
        if var_x <= 0.0 || var_y <= 0.0 {
            return 0.0;
        }
        dcov(&cx, &cy, self.bias) / (var_x * var_y).sqrt()
    }
}

impl StatisticKernel<DistanceMatrix, DistanceMatrix> for Dcorr {
    type Aux = ();

    fn name(&self) -> &'static str {
        "dcorr"
    }

    fn evaluate(&self, x: &DistanceMatrix, y: &DistanceMatrix) -> PermResult<StatisticResult<()>> {
        Ok(StatisticResult::scalar(self.correlation(x.view(), y.view())))
    }
}

fn center(dist: ArrayView2<'_, f64>, bias: bool) -> Array2<f64> {
    let n = dist.nrows();
    let nf = n as f64;
    let row_sums = dist.sum_axis(Axis(1));
    let col_sums = dist.sum_axis(Axis(0));
    let total = dist.sum();

    if bias {
        let grand = total / (nf * nf);
        Array2::from_shape_fn((n, n), |(i, j)| {
            dist[[i, j]] - row_sums[i] / nf - col_sums[j] / nf + grand
        })
    } else {
        let scale = nf - 2.0;
        let grand = total / ((nf - 1.0) * (nf - 2.0));
        Array2::from_shape_fn((n, n), |(i, j)| {
            if i == j {
                0.0
            } else {
                dist[[i, j]] - row_sums[i] / scale - col_sums[j] / scale + grand
            }
        })
    }
}

fn dcov(cx: &Array2<f64>, cy: &Array2<f64>, bias: bool) -> f64 {
    let nf = cx.nrows() as f64;
    let inner = (cx * cy).sum();
    if bias { inner / (nf * nf) } else { inner / (nf * (nf - 3.0)) }
}
