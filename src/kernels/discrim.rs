//! kernels::discrim — sample discriminability index.
//!
//! Purpose
//! -------
//! Measure whether repeated measurements of the same item are closer to
//! each other than to measurements of other items. For every measurement
//! `i` and every other measurement `j` of the same item, the fraction of
//! between-item distances from `i` that are not smaller than `d(i, j)` is
//! recorded; the statistic is the mean of all such fractions.
//!
//! Conventions
//! -----------
//! - Ties between a within-item distance and a between-item distance count
//!   one half.
//! - Measurements without a within-item partner contribute nothing.
//! - Per-row between-item distances are sorted once, so each fraction is a
//!   pair of binary searches.
use crate::{
    data::{DistanceMatrix, Labels},
    kernels::{StatisticKernel, StatisticResult},
    statistical_tests::errors::{PermError, PermResult},
};

/// Discriminability kernel over `(distances, labels)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Discriminability;

impl StatisticKernel<DistanceMatrix, Labels> for Discriminability {
    type Aux = ();

    fn name(&self) -> &'static str {
        "discriminability"
    }

    fn evaluate(&self, x: &DistanceMatrix, y: &Labels) -> PermResult<StatisticResult<()>> {
        let dist = x.view();
        let codes = y.codes();
        let n = x.n();

        let mut between: Vec<f64> = Vec::with_capacity(n);
        let mut total = 0.0;
        let mut pairs = 0usize;
        for i in 0..n {
            between.clear();
            between.extend((0..n).filter(|&j| codes[j] != codes[i]).map(|j| dist[[i, j]]));
            if between.is_empty() {
                continue;
            }
            between.sort_by(f64::total_cmp);
            let size = between.len() as f64;

            for j in (0..n).filter(|&j| j != i && codes[j] == codes[i]) {
                let within = dist[[i, j]];
                let smaller = between.partition_point(|&b| b < within);
                let ties = between.partition_point(|&b| b <= within) - smaller;
                total += 1.0 - (smaller as f64 + 0.5 * ties as f64) / size;
                pairs += 1;
            }
        }

        if pairs == 0 {
            return Err(PermError::StatisticComputation {
                kernel: self.name(),
                reason: "no item has two measurements with a between-item comparison".into(),
            });
        }
        Ok(StatisticResult::scalar(total / pairs as f64))
    }
}
