//! utils — conversion helpers for the Python bindings.
//!
//! Purpose
//! -------
//! Turn loosely typed Python arguments (NumPy arrays, pandas objects,
//! nested sequences, label lists, option strings) into the validated Rust
//! types used by the test facades. Every helper reports failures as
//! `PyErr` so the `#[pymethods]` in the crate root stay thin.
//!
//! Conventions
//! -----------
//! - 1-D inputs are treated as `n × 1` matrices.
//! - Time-series info is returned as a dict with `opt_lag` and, for
//!   kernels that report one, `opt_scale`.
//! - Option-style arguments (`reps`, `workers`, `random_state`) are checked
//!   through [`PermutationOptions::new`], so Python callers see the same
//!   messages as Rust callers.
#[cfg(feature = "python-bindings")]
use ndarray::Array2;

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::{PyAny, PyDict},
};

#[cfg(feature = "python-bindings")]
use numpy::{PyReadonlyArray1, PyReadonlyArray2};

#[cfg(feature = "python-bindings")]
use crate::{
    data::{Labels, Metric},
    permutation::PermutationOptions,
    statistical_tests::{ReportedScale, TimeSeriesInfo},
};

/// Extract a 2-D `f64` matrix from a NumPy array, pandas object or nested
/// sequence. One-dimensional inputs become a single column.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix<'py>(raw_data: &Bound<'py, PyAny>) -> PyResult<Array2<f64>> {
    if let Ok(arr) = raw_data.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr.as_array().to_owned());
    }
    if let Ok(arr) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        let column = arr.as_array();
        return Ok(Array2::from_shape_fn((column.len(), 1), |(i, _)| column[i]));
    }

    if let Ok(obj) = raw_data.call_method0("to_numpy") {
        if !obj.is(raw_data) {
            return extract_f64_matrix(&obj);
        }
    }

    if let Ok(rows) = raw_data.extract::<Vec<Vec<f64>>>() {
        let n = rows.len();
        let p = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != p) {
            return Err(PyValueError::new_err("all rows must have the same length"));
        }
        return Ok(Array2::from_shape_fn((n, p), |(i, j)| rows[i][j]));
    }

    let series: Vec<f64> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err(
            "expected a 1-D or 2-D numpy.ndarray, pandas object, or sequence of float64",
        )
    })?;
    Ok(Array2::from_shape_fn((series.len(), 1), |(i, _)| series[i]))
}

/// Encode a Python label sequence. Integer labels are used as-is; any
/// other element is keyed by its `str()` representation.
#[cfg(feature = "python-bindings")]
pub fn extract_labels<'py>(raw_labels: &Bound<'py, PyAny>) -> PyResult<Labels> {
    if let Ok(ints) = raw_labels.extract::<Vec<i64>>() {
        return Ok(Labels::encode(&ints));
    }
    let mut keys: Vec<String> = Vec::new();
    for item in raw_labels.try_iter()? {
        keys.push(item?.str()?.to_string());
    }
    Ok(Labels::encode(&keys))
}

/// Build permutation options from the Python keyword arguments.
#[cfg(feature = "python-bindings")]
pub fn build_options(
    reps: usize, workers: isize, random_state: Option<u64>,
) -> PyResult<PermutationOptions> {
    Ok(PermutationOptions::new(reps, workers, random_state)?)
}

#[cfg(feature = "python-bindings")]
pub fn extract_metric(metric: Option<&str>) -> PyResult<Metric> {
    let metric_str = metric.unwrap_or("euclidean").to_lowercase();
    match metric_str.as_str() {
        "euclidean" | "l2" => Ok(Metric::Euclidean),
        "manhattan" | "cityblock" | "l1" => Ok(Metric::Manhattan),
        "chebyshev" | "linf" => Ok(Metric::Chebyshev),
        other => Err(PyValueError::new_err(format!(
            "invalid metric {:?} (expected 'euclidean', 'manhattan', or 'chebyshev')",
            other
        ))),
    }
}

/// Build the `info` dict returned by the time-series `test` methods.
#[cfg(feature = "python-bindings")]
pub fn info_dict<'py, A: ReportedScale>(
    py: Python<'py>, info: &TimeSeriesInfo<A>,
) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("opt_lag", info.opt_lag)?;
    if let Some(scale) = info.scale_entry() {
        dict.set_item("opt_scale", scale)?;
    }
    Ok(dict)
}
