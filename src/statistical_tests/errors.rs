//! statistical_tests::errors — shared error type for permutation tests.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias used by every layer of the
//! crate: input normalization, statistic kernels, the permutation engine,
//! and the worker pool. A conversion to Python exceptions is provided for
//! the PyO3 bindings.
//!
//! Key behaviors
//! -------------
//! - Define [`PermResult`] and [`PermError`] as the canonical result and
//!   error types.
//! - Classify each variant into an [`ErrorKind`] (invalid input, statistic
//!   computation, parallel execution) so callers can branch on the failure
//!   family without matching every variant.
//! - Attach human-readable `Display` messages that embed the offending
//!   values.
//!
//! Invariants & assumptions
//! ------------------------
//! - Validation errors are produced before any statistic is computed.
//! - A statistic-computation error during the permutation phase always
//!   invalidates the whole test call; no partial p-value is returned.
//! - `PermError` values are small and cloneable.
//!
//! Conventions
//! -----------
//! - Messages are phrased in terms of domain constraints
//!   ("max_lag must satisfy max_lag < n") rather than internals.
//! - At the Python boundary every variant maps to `ValueError`.
//!
//! Testing notes
//! -------------
//! - Unit tests below check payload embedding in `Display` and the
//!   [`ErrorKind`] classification.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type PermResult<T> = Result<T, PermError>;

/// ErrorKind — coarse failure family of a [`PermError`].
///
/// - `InvalidInput`: rejected before any statistic computation.
/// - `StatisticComputation`: a kernel failed or produced a non-finite value.
/// - `ParallelExecution`: the worker pool could not be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    StatisticComputation,
    ParallelExecution,
}

/// PermError — error conditions for permutation-based dependence tests.
///
/// Variants
/// --------
/// Input validation:
/// - `EmptySample`: a sample has no rows.
/// - `InsufficientSamples { n, min }`: fewer than `min` observations.
/// - `SampleCountMismatch { x, y }`: paired samples disagree on `n`.
/// - `NonSquareDistance { rows, cols }`: distance input is not `n × n`.
/// - `NonFiniteData { row, col, value }`: NaN or ±∞ in an input.
/// - `InvalidMaxLag { max_lag, n }`: violates `max_lag < n`.
/// - `InvalidReps(reps)`: `reps == 0`.
/// - `InvalidWorkers(workers)`: not `-1` and not `≥ 1`.
/// - `TooFewLabels { distinct }`: fewer than two label classes.
/// - `EmptyNullDistribution`: p-value requested without draws.
///
/// Statistic computation:
/// - `StatisticComputation { kernel, reason }`: a kernel failed.
/// - `NonFiniteStatistic { kernel, value }`: a kernel returned NaN/±∞.
///
/// Parallel execution:
/// - `ParallelExecution { reason }`: the worker pool failed to build.
#[derive(Debug, Clone, PartialEq)]
pub enum PermError {
    // ---- Input validation ----
    EmptySample,
    InsufficientSamples { n: usize, min: usize },
    SampleCountMismatch { x: usize, y: usize },
    NonSquareDistance { rows: usize, cols: usize },
    NonFiniteData { row: usize, col: usize, value: f64 },
    InvalidMaxLag { max_lag: usize, n: usize },
    InvalidReps(usize),
    InvalidWorkers(isize),
    TooFewLabels { distinct: usize },
    EmptyNullDistribution,

    // ---- Statistic computation ----
    StatisticComputation { kernel: &'static str, reason: String },
    NonFiniteStatistic { kernel: &'static str, value: f64 },

    // ---- Parallel execution ----
    ParallelExecution { reason: String },
}

impl PermError {
    /// Failure family of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PermError::StatisticComputation { .. } | PermError::NonFiniteStatistic { .. } => {
                ErrorKind::StatisticComputation
            }
            PermError::ParallelExecution { .. } => ErrorKind::ParallelExecution,
            _ => ErrorKind::InvalidInput,
        }
    }
}

impl std::error::Error for PermError {}

impl std::fmt::Display for PermError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input validation ----
            PermError::EmptySample => write!(f, "Input sample is empty."),
            PermError::InsufficientSamples { n, min } => {
                write!(f, "Need at least {min} observations; got {n}.")
            }
            PermError::SampleCountMismatch { x, y } => {
                write!(f, "Paired samples must share n; x has {x} rows, y has {y} rows.")
            }
            PermError::NonSquareDistance { rows, cols } => {
                write!(f, "Distance input must be square; got {rows} x {cols}.")
            }
            PermError::NonFiniteData { row, col, value } => {
                write!(f, "Data value at ({row}, {col}) is non-finite: {value}")
            }
            PermError::InvalidMaxLag { max_lag, n } => {
                write!(f, "Invalid max_lag {max_lag}. Must satisfy max_lag < n (n = {n}).")
            }
            PermError::InvalidReps(reps) => {
                write!(f, "Invalid reps value: {reps}. Must be positive.")
            }
            PermError::InvalidWorkers(workers) => {
                write!(f, "Invalid workers value: {workers}. Use -1 for all cores or a count >= 1.")
            }
            PermError::TooFewLabels { distinct } => {
                write!(f, "Need at least 2 distinct labels; got {distinct}.")
            }
            PermError::EmptyNullDistribution => {
                write!(f, "Null distribution is empty; cannot compute a p-value.")
            }

            // ---- Statistic computation ----
            PermError::StatisticComputation { kernel, reason } => {
                write!(f, "Statistic kernel '{kernel}' failed: {reason}")
            }
            PermError::NonFiniteStatistic { kernel, value } => {
                write!(f, "Statistic kernel '{kernel}' returned a non-finite value: {value}")
            }

            // ---- Parallel execution ----
            PermError::ParallelExecution { reason } => {
                write!(f, "Worker pool failure: {reason}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<PermError> for PyErr {
    fn from(err: PermError) -> PyErr {
        PyValueError::new_err(format!("PermError: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Payload embedding in `Display` messages.
    // - The `ErrorKind` classification of each failure family.
    //
    // They intentionally DO NOT cover:
    // - The `From<PermError> for PyErr` conversion, which requires linking
    //   against the Python C API.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that `InvalidMaxLag` reports both the lag and the sample size.
    //
    // Given
    // -----
    // - `PermError::InvalidMaxLag { max_lag: 12, n: 10 }`.
    //
    // Expect
    // ------
    // - The message contains "12" and "10".
    fn perm_error_invalid_max_lag_includes_payload_in_display() {
        // Arrange
        let err = PermError::InvalidMaxLag { max_lag: 12, n: 10 };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("12") && msg.contains("10"), "Got: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Verify that kernel failures name the kernel in their message.
    //
    // Given
    // -----
    // - A `StatisticComputation` error raised by "mgc".
    //
    // Expect
    // ------
    // - The message contains the kernel name and the reason.
    fn perm_error_statistic_computation_names_kernel() {
        // Arrange
        let err = PermError::StatisticComputation { kernel: "mgc", reason: "boom".into() };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("mgc") && msg.contains("boom"), "Got: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Ensure every failure family is classified as documented.
    //
    // Given
    // -----
    // - One representative variant per family.
    //
    // Expect
    // ------
    // - `kind()` returns the matching `ErrorKind`.
    fn perm_error_kind_classifies_each_family() {
        // Arrange
        let invalid = PermError::InvalidReps(0);
        let stat = PermError::NonFiniteStatistic { kernel: "dcorr", value: f64::NAN };
        let pool = PermError::ParallelExecution { reason: "no threads".into() };

        // Act & Assert
        assert_eq!(invalid.kind(), ErrorKind::InvalidInput);
        assert_eq!(stat.kind(), ErrorKind::StatisticComputation);
        assert_eq!(pool.kind(), ErrorKind::ParallelExecution);
    }
}
