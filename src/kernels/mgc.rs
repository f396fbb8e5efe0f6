//! kernels::mgc — multiscale graph correlation (MGC).
//!
//! Purpose
//! -------
//! Compute the MGC statistic and its optimal scale for two samples given as
//! distance matrices. MGC evaluates a family of local distance
//! correlations, one per pair of neighborhood sizes `(k, l)`, and reports
//! the smoothed maximum over a significant region of that map.
//!
//! Key behaviors
//! -------------
//! - Column-center each distance matrix (divisor `n − 1`, zero diagonal)
//!   and rank each column with the "max" tie rule.
//! - Build the local covariance map with 2-D prefix sums over rank bins and
//!   normalize it by the local variances into the correlation map.
//! - Threshold the map with a Beta approximation to the null, keep the
//!   largest 4-connected significant region, and report its maximum when
//!   the region is large enough; otherwise fall back to the global scale.
//!
//! Invariants & assumptions
//! ------------------------
//! - Local correlations are clipped to at most 1 and set to 0 wherever a
//!   local variance is non-positive.
//! - The optimal scale is reported with 1-based neighborhood sizes; the
//!   global scale is `(k_max, l_max)`.
//! - Inputs with fewer than 3 observations yield a zero statistic at the
//!   global scale.
//!
//! Conventions
//! -----------
//! - The significance percentile is `1 − 0.02 / (n − 1)`; the region-size
//!   requirement is `⌈0.02 · max(m, l)⌉ · min(m, l)` cells.
//! - When several cells attain the regional maximum, the last one in
//!   row-major order is reported.
use std::collections::VecDeque;

use ndarray::{Array2, ArrayView2};
use statrs::distribution::{Beta, ContinuousCDF};

use crate::{
    data::DistanceMatrix,
    kernels::{StatisticKernel, StatisticResult},
    statistical_tests::errors::PermResult,
};

const MIN_MGC_SAMPLES: usize = 3;
const SIGNIFICANCE_MASS: f64 = 0.02;
const REGION_FRACTION: f64 = 0.02;

/// Optimal MGC scale: neighborhood sizes for `x` and `y` (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    pub x: usize,
    pub y: usize,
}

impl From<Scale> for (usize, usize) {
    fn from(scale: Scale) -> Self {
        (scale.x, scale.y)
    }
}

/// Multiscale graph correlation kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mgc;

impl Mgc {
    pub fn new() -> Self {
        Mgc
    }

    /// Full local correlation map, `k_max × l_max`.
    pub fn correlation_map(
        &self, distx: ArrayView2<'_, f64>, disty: ArrayView2<'_, f64>,
    ) -> Array2<f64> {
        local_correlations(distx, disty)
    }
}

impl StatisticKernel<DistanceMatrix, DistanceMatrix> for Mgc {
    type Aux = Scale;

    fn name(&self) -> &'static str {
        "mgc"
    }

    fn evaluate(
        &self, x: &DistanceMatrix, y: &DistanceMatrix,
    ) -> PermResult<StatisticResult<Scale>> {
        let n = x.n();
        if n < MIN_MGC_SAMPLES {
            return Ok(StatisticResult::new(0.0, Scale { x: n, y: n }));
        }
        let map = local_correlations(x.view(), y.view());
        let (m, l) = map.dim();
        if m == 1 || l == 1 {
            return Ok(StatisticResult::new(map[[m - 1, l - 1]], Scale { x: m, y: l }));
        }
        let region = significant_region(&map, n - 1);
        let (stat, scale) = smooth_map(&map, &region);
        Ok(StatisticResult::new(stat, scale))
    }
}

// ---- Local correlation map ----

struct Transformed {
    centered: Array2<f64>,
    ranks: Array2<usize>,
}

/// Column ranks (0-based, "max" ties) and column-centered distances.
fn transform(dist: ArrayView2<'_, f64>) -> Transformed {
    let n = dist.nrows();
    let mut ranks = Array2::<usize>::zeros((n, n));
    let mut centered = Array2::<f64>::zeros((n, n));
    let mut sorted = Vec::with_capacity(n);

    for j in 0..n {
        let column = dist.column(j);
        sorted.clear();
        sorted.extend(column.iter().copied());
        sorted.sort_by(f64::total_cmp);
        let mean = column.sum() / (n as f64 - 1.0);
        for i in 0..n {
            let value = column[i];
            ranks[[i, j]] = sorted.partition_point(|&s| s <= value) - 1;
            if i != j {
                centered[[i, j]] = value - mean;
            }
        }
    }
    Transformed { centered, ranks }
}

/// Local covariances for every `(k, l)`, pairing `a[i, j]` with `b[i, j]`.
///
/// `b` and `rb` are expected to be transposed by the caller, so entry
/// `(i, j)` of the result sums `A_ij · B_ji` over `rank_a(i, j) ≤ k` and
/// `rank_b(j, i) ≤ l`.
fn local_covariance(
    a: ArrayView2<'_, f64>, b: ArrayView2<'_, f64>, ra: ArrayView2<'_, usize>,
    rb: ArrayView2<'_, usize>,
) -> Array2<f64> {
    let n = a.nrows();
    let kx = ra.iter().copied().max().unwrap_or(0) + 1;
    let ky = rb.iter().copied().max().unwrap_or(0) + 1;

    let mut cov = Array2::<f64>::zeros((kx, ky));
    let mut expect_x = vec![0.0; kx];
    let mut expect_y = vec![0.0; ky];
    for i in 0..n {
        for j in 0..n {
            let (ka, lb) = (ra[[i, j]], rb[[i, j]]);
            cov[[ka, lb]] += a[[i, j]] * b[[i, j]];
            expect_x[ka] += a[[i, j]];
            expect_y[lb] += b[[i, j]];
        }
    }

    for k in 1..kx {
        cov[[k, 0]] += cov[[k - 1, 0]];
        expect_x[k] += expect_x[k - 1];
    }
    for l in 1..ky {
        cov[[0, l]] += cov[[0, l - 1]];
        expect_y[l] += expect_y[l - 1];
    }
    for k in 1..kx {
        for l in 1..ky {
            cov[[k, l]] += cov[[k - 1, l]] + cov[[k, l - 1]] - cov[[k - 1, l - 1]];
        }
    }

    let n2 = (n * n) as f64;
    for ((k, l), value) in cov.indexed_iter_mut() {
        *value -= expect_x[k] * expect_y[l] / n2;
    }
    cov
}

fn local_correlations(distx: ArrayView2<'_, f64>, disty: ArrayView2<'_, f64>) -> Array2<f64> {
    let tx = transform(distx);
    let ty = transform(disty);

    let cov_xy =
        local_covariance(tx.centered.view(), ty.centered.t(), tx.ranks.view(), ty.ranks.t());
    let var_x = local_covariance(tx.centered.view(), tx.centered.t(), tx.ranks.view(), tx.ranks.t())
        .diag()
        .to_vec();
    let var_y = local_covariance(ty.centered.view(), ty.centered.t(), ty.ranks.view(), ty.ranks.t())
        .diag()
        .to_vec();

    let mut corr = cov_xy;
    for ((k, l), value) in corr.indexed_iter_mut() {
        let (vx, vy) = (var_x[k], var_y[l]);
        *value = if vx <= 0.0 || vy <= 0.0 { 0.0 } else { (*value / (vx * vy).sqrt()).min(1.0) };
    }
    corr
}

// ---- Threshold and smoothing ----

/// Largest 4-connected region of the map above the significance threshold.
fn significant_region(map: &Array2<f64>, samp_size: usize) -> Array2<bool> {
    let (m, l) = map.dim();
    let global = map[[m - 1, l - 1]];

    let s = samp_size as f64;
    let shape = s * (s - 3.0) / 4.0 - 0.5;
    let beta_cut = if shape > 0.0 {
        Beta::new(shape, shape)
            .ok()
            .map(|beta| beta.inverse_cdf(1.0 - SIGNIFICANCE_MASS / s) * 2.0 - 1.0)
    } else {
        None
    };
    let threshold = beta_cut.map_or(global, |cut| cut.max(global));

    let above = map.mapv(|v| v > threshold);
    largest_component(&above)
}

/// Keep the largest 4-connected component of `mask`; ties go to the
/// component found first in row-major order. Cells touching only at a
/// corner belong to different components.
fn largest_component(mask: &Array2<bool>) -> Array2<bool> {
    let (m, l) = mask.dim();
    let mut labels = Array2::<usize>::zeros((m, l));
    let mut sizes: Vec<usize> = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..m * l {
        let (r0, c0) = (start / l, start % l);
        if !mask[[r0, c0]] || labels[[r0, c0]] != 0 {
            continue;
        }
        let label = sizes.len() + 1;
        let mut size = 0;
        labels[[r0, c0]] = label;
        queue.push_back((r0, c0));
        while let Some((r, c)) = queue.pop_front() {
            size += 1;
            let neighbours = [
                (r.checked_sub(1), Some(c)),
                ((r + 1 < m).then_some(r + 1), Some(c)),
                (Some(r), c.checked_sub(1)),
                (Some(r), (c + 1 < l).then_some(c + 1)),
            ];
            for (nr, nc) in neighbours {
                let (Some(nr), Some(nc)) = (nr, nc) else {
                    continue;
                };
                if mask[[nr, nc]] && labels[[nr, nc]] == 0 {
                    labels[[nr, nc]] = label;
                    queue.push_back((nr, nc));
                }
            }
        }
        sizes.push(size);
    }

    let mut best: Option<(usize, usize)> = None;
    for (idx, &size) in sizes.iter().enumerate() {
        if best.map_or(true, |(_, best_size)| size > best_size) {
            best = Some((idx + 1, size));
        }
    }
    match best {
        Some((label, _)) => labels.mapv(|v| v == label),
        None => Array2::from_elem((m, l), false),
    }
}

/// Statistic and scale from the significant region, defaulting to the
/// global scale.
fn smooth_map(map: &Array2<f64>, region: &Array2<bool>) -> (f64, Scale) {
    let (m, l) = map.dim();
    let mut stat = map[[m - 1, l - 1]];
    let mut scale = Scale { x: m, y: l };

    let area = region.iter().filter(|&&inside| inside).count();
    if area == 0 {
        return (stat, scale);
    }
    let min_area = (REGION_FRACTION * m.max(l) as f64).ceil() * m.min(l) as f64;
    if (area as f64) < min_area {
        return (stat, scale);
    }

    let max_corr = map
        .iter()
        .zip(region.iter())
        .filter(|&(_, &inside)| inside)
        .map(|(&v, _)| v)
        .fold(f64::NEG_INFINITY, f64::max);
    if max_corr >= stat {
        stat = max_corr;
        if let Some(((k, l_idx), _)) = map
            .indexed_iter()
            .filter(|&((k, l_idx), &v)| region[[k, l_idx]] && v >= max_corr)
            .last()
        {
            scale = Scale { x: k + 1, y: l_idx + 1 };
        }
    }
    (stat, scale)
}
