//! permutation — engine, lag search, worker pool and p-values.
//!
//! Purpose
//! -------
//! Provide the test-agnostic machinery shared by every facade: validated
//! run options, an order-preserving parallel map, the permutation engine
//! that builds a null distribution for any [`StatisticKernel`], the
//! cross-lag wrapper used by time-series tests, and the one-sided p-value.
//!
//! Downstream usage
//! ----------------
//! - Facades in [`crate::statistical_tests`] normalize inputs, wrap their
//!   kernel (in a [`LagSearch`] for time series), call
//!   [`PermutationEngine::run`], and finish with [`p_value`].
//!
//! [`StatisticKernel`]: crate::kernels::StatisticKernel

pub mod engine;
pub mod lag;
pub mod options;
pub mod parallel;
pub mod pvalue;

pub use self::engine::{NullDistribution, PermutationEngine, PermutationOutcome};
pub use self::lag::{LagGrid, LagOutcome, LagSearch, LagSelection};
pub use self::options::{PermutationOptions, Workers};
pub use self::parallel::ParallelMap;
pub use self::pvalue::p_value;
