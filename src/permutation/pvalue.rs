//! permutation::pvalue — one-sided permutation p-value.
//!
//! `p = #{null ≥ observed} / reps`, floored at `1 / reps` so that a finite
//! number of draws never reports an exact zero.
use crate::{
    permutation::engine::NullDistribution,
    statistical_tests::errors::{PermError, PermResult},
};

/// One-sided p-value of `observed` against `null_dist`.
///
/// Errors
/// ------
/// - `PermError::EmptyNullDistribution` if no draws were made.
pub fn p_value(observed: f64, null_dist: &NullDistribution) -> PermResult<f64> {
    if null_dist.is_empty() {
        return Err(PermError::EmptyNullDistribution);
    }
    let reps = null_dist.len() as f64;
    let count = null_dist.count_at_least(observed);
    if count == 0 { Ok(1.0 / reps) } else { Ok(count as f64 / reps) }
}
