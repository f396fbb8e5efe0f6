//! data — sample containers, distance metrics, and input normalization.
//!
//! Purpose
//! -------
//! Own everything that happens before a statistic is computed: the raw
//! [`Sample`] representation, the validated [`DistanceMatrix`] and
//! [`Labels`] forms consumed by kernels, the [`Metric`] used to build
//! distances from features, and the validation routines that reject
//! malformed inputs.
//!
//! Conventions
//! -----------
//! - Rows index observations; for time series, rows are in time order.
//! - Kernels never see raw features: every test normalizes to distance
//!   matrices first, so permuting `y` always means permuting rows and
//!   columns of its distance matrix (or the entries of a label vector).

pub mod distance;
pub mod sample;
pub mod validation;

pub use self::distance::Metric;
pub use self::sample::{DistanceMatrix, Labels, Permutable, Sample};
