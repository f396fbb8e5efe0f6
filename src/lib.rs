//! rust_permtests — permutation-based dependence tests with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the tests to Python via the `_rust_permtests` extension module.
//! The crate implements one-sample discriminability and cross-lag
//! independence tests for time series (DcorrX, MgcX) on top of a generic
//! permutation engine.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules: `data` (samples, distances,
//!   validation), `kernels` (statistics), `permutation` (engine, lag search,
//!   worker pool, p-values) and `statistical_tests` (facades and errors).
//! - When `python-bindings` is enabled, define `#[pyclass]` wrappers and the
//!   `#[pymodule]` initializer, registering the `discrim` and `time_series`
//!   submodules under `rust_permtests`.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue and error mapping.
//! - Permutation results are reproducible for a fixed `random_state`,
//!   independent of the number of workers.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should use [`statistical_tests::prelude`] and can
//!   ignore the items guarded by the `python-bindings` feature.
//! - The Python packaging layer imports `_rust_permtests` and wraps its
//!   classes in user-facing Python APIs.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by the
//!   integration tests under `tests/`.

pub mod data;
pub mod kernels;
pub mod permutation;
pub mod statistical_tests;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{
    prelude::*,
    types::{PyAny, PyDict},
};

#[cfg(feature = "python-bindings")]
use crate::{
    data::Sample,
    kernels::{Dcorr, Mgc},
    statistical_tests::{DiscrimOneSample, DiscrimOutcome, TimeSeriesTest},
    utils::{build_options, extract_f64_matrix, extract_labels, extract_metric, info_dict},
};

/// DiscrimOneSample — Python-facing wrapper for the discriminability test.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `DiscrimOneSample(is_dist=False, remove_isolates=True, metric="euclidean")`.
///
/// Notes
/// -----
/// - `test(x, y, reps=1000, workers=-1, random_state=None)` returns
///   `(stat, pvalue)`; the null distribution of the last call is available
///   as the `null_dist` property.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "DiscrimOneSample", module = "rust_permtests.discrim")]
pub struct PyDiscrimOneSample {
    inner: DiscrimOneSample,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyDiscrimOneSample {
    #[new]
    #[pyo3(
        signature = (is_dist = false, remove_isolates = true, metric = None),
        text_signature = "(is_dist=False, remove_isolates=True, metric=None)"
    )]
    pub fn new(is_dist: bool, remove_isolates: bool, metric: Option<&str>) -> PyResult<Self> {
        let inner = DiscrimOneSample::new()
            .with_distance_input(is_dist)
            .with_remove_isolates(remove_isolates)
            .with_metric(extract_metric(metric)?);
        Ok(PyDiscrimOneSample { inner })
    }

    #[pyo3(
        signature = (x, y, reps = 1000, workers = -1, random_state = None),
        text_signature = "($self, x, y, /, reps=1000, workers=-1, random_state=None)"
    )]
    pub fn test<'py>(
        &mut self, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>, reps: usize, workers: isize,
        random_state: Option<u64>,
    ) -> PyResult<(f64, f64)> {
        let sample = Sample::from_view(extract_f64_matrix(x)?.view(), self.inner.is_distance);
        let labels = extract_labels(y)?;
        self.inner.options = build_options(reps, workers, random_state)?;
        let DiscrimOutcome { stat, p_value, .. } = self.inner.test_samples(&sample, &labels)?;
        Ok((stat, p_value))
    }

    /// Permuted statistics of the last test, in draw order.
    #[getter]
    pub fn null_dist(&self) -> Option<Vec<f64>> {
        self.inner.last_outcome().map(|o| o.null_dist.clone())
    }
}

/// DcorrX — Python-facing wrapper for the cross-distance-correlation test.
///
/// Notes
/// -----
/// - `test(x, y, reps=1000, workers=1, random_state=None)` returns
///   `(stat, pvalue, {"opt_lag": int})`.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "DcorrX", module = "rust_permtests.time_series")]
pub struct PyDcorrX {
    inner: TimeSeriesTest<Dcorr>,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyDcorrX {
    #[new]
    #[pyo3(
        signature = (max_lag = 0, is_distance = false, metric = None),
        text_signature = "(max_lag=0, is_distance=False, metric=None)"
    )]
    pub fn new(max_lag: usize, is_distance: bool, metric: Option<&str>) -> PyResult<Self> {
        let inner = TimeSeriesTest::dcorrx(max_lag)
            .with_distance_input(is_distance)
            .with_metric(extract_metric(metric)?);
        Ok(PyDcorrX { inner })
    }

    #[pyo3(
        signature = (x, y, reps = 1000, workers = 1, random_state = None),
        text_signature = "($self, x, y, /, reps=1000, workers=1, random_state=None)"
    )]
    pub fn test<'py>(
        &mut self, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>, reps: usize, workers: isize,
        random_state: Option<u64>,
    ) -> PyResult<(f64, f64, Bound<'py, PyDict>)> {
        let py = x.py();
        let x = Sample::from_view(extract_f64_matrix(x)?.view(), self.inner.is_distance);
        let y = Sample::from_view(extract_f64_matrix(y)?.view(), self.inner.is_distance);
        self.inner.options = build_options(reps, workers, random_state)?;
        let outcome = self.inner.test_samples(&x, &y)?;
        Ok((outcome.stat, outcome.p_value, info_dict(py, &outcome.info)?))
    }

    #[getter]
    pub fn null_dist(&self) -> Option<Vec<f64>> {
        self.inner.last_outcome().map(|o| o.null_dist.clone())
    }
}

/// MGCX — Python-facing wrapper for the cross-MGC test.
///
/// Notes
/// -----
/// - `test(x, y, reps=1000, workers=1, random_state=None)` returns
///   `(stat, pvalue, {"opt_lag": int, "opt_scale": (scale_x, scale_y)})`.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "MGCX", module = "rust_permtests.time_series")]
pub struct PyMgcX {
    inner: TimeSeriesTest<Mgc>,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyMgcX {
    #[new]
    #[pyo3(
        signature = (max_lag = 0, is_distance = false, metric = None),
        text_signature = "(max_lag=0, is_distance=False, metric=None)"
    )]
    pub fn new(max_lag: usize, is_distance: bool, metric: Option<&str>) -> PyResult<Self> {
        let inner = TimeSeriesTest::mgcx(max_lag)
            .with_distance_input(is_distance)
            .with_metric(extract_metric(metric)?);
        Ok(PyMgcX { inner })
    }

    #[pyo3(
        signature = (x, y, reps = 1000, workers = 1, random_state = None),
        text_signature = "($self, x, y, /, reps=1000, workers=1, random_state=None)"
    )]
    pub fn test<'py>(
        &mut self, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>, reps: usize, workers: isize,
        random_state: Option<u64>,
    ) -> PyResult<(f64, f64, Bound<'py, PyDict>)> {
        let py = x.py();
        let x = Sample::from_view(extract_f64_matrix(x)?.view(), self.inner.is_distance);
        let y = Sample::from_view(extract_f64_matrix(y)?.view(), self.inner.is_distance);
        self.inner.options = build_options(reps, workers, random_state)?;
        let outcome = self.inner.test_samples(&x, &y)?;
        Ok((outcome.stat, outcome.p_value, info_dict(py, &outcome.info)?))
    }

    #[getter]
    pub fn null_dist(&self) -> Option<Vec<f64>> {
        self.inner.last_outcome().map(|o| o.null_dist.clone())
    }
}

/// Register the `discrim` and `time_series` submodules and make them
/// importable through dotted paths.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_permtests<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let discrim_mod = PyModule::new(_py, "discrim")?;
    discrim_mod.add_class::<PyDiscrimOneSample>()?;
    m.add_submodule(&discrim_mod)?;

    let time_series_mod = PyModule::new(_py, "time_series")?;
    time_series_mod.add_class::<PyDcorrX>()?;
    time_series_mod.add_class::<PyMgcX>()?;
    m.add_submodule(&time_series_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("rust_permtests.discrim", discrim_mod)?;
    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_permtests.time_series", time_series_mod)?;
    Ok(())
}
