//! statistical_tests — permutation-based dependence tests.
//!
//! Purpose
//! -------
//! Collect the user-facing test facades and the crate-wide error type. Each
//! facade validates and normalizes its inputs, drives the permutation
//! engine with the appropriate kernel, and records its last outcome.
//!
//! Key behaviors
//! -------------
//! - [`DiscrimOneSample`]: one-sample discriminability of repeated
//!   measurements, permuting labels.
//! - [`TimeSeriesTest`] with the [`DcorrX`] and [`MgcX`] aliases: cross-lag
//!   independence of two time series, permuting `y`.
//! - [`IndependenceTest`]: the same kernels without lag structure.
//! - [`PermError`] / [`PermResult`] for every failure, with a conversion to
//!   Python exceptions when the `python-bindings` feature is enabled.
//!
//! Invariants & assumptions
//! ------------------------
//! - Facades never panic on invalid user input; all guards report through
//!   [`PermResult`].
//! - A failed `test` call leaves the previous snapshot untouched and never
//!   returns a partial p-value.
//!
//! Downstream usage
//! ----------------
//! - Typical Rust code imports the main surface as:
//!
//!   ```rust,ignore
//!   use rust_permtests::statistical_tests::prelude::*;
//!
//!   let mut test = MgcX::mgcx(2).with_options(PermutationOptions::new(1000, -1, Some(1))?);
//!   let outcome = test.test(x.view(), y.view())?;
//!   println!("{} {} {:?}", outcome.stat, outcome.p_value, outcome.info.opt_scale);
//!   ```
//!
//! Testing notes
//! -------------
//! - Unit tests in each facade cover validation and snapshot behavior;
//!   end-to-end scenarios live in `tests/integration_permutation_pipeline.rs`.

pub mod discrim_one_sample;
pub mod errors;
pub mod independence;
pub mod time_series;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::discrim_one_sample::{DiscrimOneSample, DiscrimOutcome};
pub use self::errors::{ErrorKind, PermError, PermResult};
pub use self::independence::{IndependenceOutcome, IndependenceTest};
pub use self::time_series::{
    DcorrX, MgcX, ReportedScale, TimeSeriesInfo, TimeSeriesOutcome, TimeSeriesTest,
};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::discrim_one_sample::{DiscrimOneSample, DiscrimOutcome};
    pub use super::errors::{PermError, PermResult};
    pub use super::independence::IndependenceTest;
    pub use super::time_series::{DcorrX, MgcX, TimeSeriesOutcome};
    pub use crate::data::Metric;
    pub use crate::permutation::{LagSelection, PermutationOptions, Workers};
}
