//! Python bindings for oneway.
//!
//! This module exposes dataset parsing and one-way ANOVA to Python using
//! PyO3. Enable the `python` feature to use this.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::anova::{compute_one_way_anova, AnovaResult};
use crate::dataset::{Cell, Dataset, DatasetParser, Delimiter};

fn to_py_err(err: crate::Error) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn cell_to_py(py: Python<'_>, cell: &Cell) -> PyObject {
    match cell {
        Cell::Number(v) => (*v).into_py(py),
        Cell::Text(s) => s.as_str().into_py(py),
        Cell::Null => py.None(),
    }
}

/// Python wrapper for Dataset
#[pyclass(name = "Dataset")]
pub struct PyDataset {
    inner: Dataset,
}

#[pymethods]
impl PyDataset {
    /// All column names in order.
    #[getter]
    fn headers(&self) -> Vec<String> {
        self.inner.headers().into_iter().map(String::from).collect()
    }

    /// Names of numeric columns.
    #[getter]
    fn numeric_headers(&self) -> Vec<String> {
        self.inner
            .numeric_headers()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Names of categorical columns.
    #[getter]
    fn categorical_headers(&self) -> Vec<String> {
        self.inner
            .categorical_headers()
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Number of data rows.
    #[getter]
    fn row_count(&self) -> usize {
        self.inner.row_count()
    }

    /// Get the rows as a list of dicts keyed by header.
    fn rows(&self, py: Python<'_>) -> PyResult<PyObject> {
        let headers = self.inner.headers();
        let list = PyList::empty(py);
        for row in self.inner.rows() {
            let dict = PyDict::new(py);
            for (name, cell) in headers.iter().zip(row.cells()) {
                dict.set_item(*name, cell_to_py(py, cell))?;
            }
            list.append(dict)?;
        }
        Ok(list.into())
    }

    fn __len__(&self) -> usize {
        self.inner.row_count()
    }
}

/// Python wrapper for AnovaResult
#[pyclass(name = "AnovaResult")]
pub struct PyAnovaResult {
    inner: AnovaResult,
}

#[pymethods]
impl PyAnovaResult {
    /// F statistic.
    #[getter]
    fn f_stat(&self) -> f64 {
        self.inner.f_stat
    }

    /// Upper-tail p-value.
    #[getter]
    fn p_value(&self) -> f64 {
        self.inner.p_value
    }

    /// Between-groups degrees of freedom.
    #[getter]
    fn df_between(&self) -> usize {
        self.inner.df_between
    }

    /// Within-groups degrees of freedom.
    #[getter]
    fn df_within(&self) -> usize {
        self.inner.df_within
    }

    /// Between-groups sum of squares.
    #[getter]
    fn ss_between(&self) -> f64 {
        self.inner.ss_between
    }

    /// Within-groups sum of squares.
    #[getter]
    fn ss_within(&self) -> f64 {
        self.inner.ss_within
    }

    /// Effect size (eta squared).
    #[getter]
    fn eta_squared(&self) -> f64 {
        self.inner.eta_squared()
    }

    /// Rows excluded for missing data.
    #[getter]
    fn excluded_rows(&self) -> usize {
        self.inner.excluded_rows
    }

    /// Per-group statistics as `{label: {"n", "mean", "std_dev", "min", "max"}}`.
    fn groups(&self, py: Python<'_>) -> PyResult<PyObject> {
        let out = PyDict::new(py);
        for (label, stats) in &self.inner.groups {
            let entry = PyDict::new(py);
            entry.set_item("n", stats.n)?;
            entry.set_item("mean", stats.mean)?;
            entry.set_item("std_dev", stats.std_dev)?;
            entry.set_item("min", stats.min)?;
            entry.set_item("max", stats.max)?;
            out.set_item(label, entry)?;
        }
        Ok(out.into())
    }

    /// Check significance at the given level.
    #[pyo3(signature = (alpha=0.05))]
    fn is_significant(&self, alpha: f64) -> bool {
        self.inner.is_significant(alpha)
    }
}

/// Parse delimited text into a classified dataset.
///
/// `delimiter` defaults to a comma, as in the Rust `parse_dataset`; pass
/// `"auto"` to detect it from the first line.
#[pyfunction]
#[pyo3(signature = (text, delimiter=",", numeric_threshold=None))]
fn parse_dataset(
    text: &str,
    delimiter: &str,
    numeric_threshold: Option<f64>,
) -> PyResult<PyDataset> {
    let delimiter: Delimiter = delimiter.parse().map_err(to_py_err)?;
    let mut parser = DatasetParser::new().delimiter_mode(delimiter);
    if let Some(threshold) = numeric_threshold {
        parser = parser.numeric_threshold(threshold);
    }

    let inner = parser.parse_str(text).map_err(to_py_err)?;
    Ok(PyDataset { inner })
}

/// Run a one-way ANOVA of `value_column` across `group_column`.
#[pyfunction]
fn one_way_anova(
    data: PyRef<'_, PyDataset>,
    group_column: &str,
    value_column: &str,
) -> PyResult<PyAnovaResult> {
    let inner = compute_one_way_anova(&data.inner, group_column, value_column).map_err(to_py_err)?;
    Ok(PyAnovaResult { inner })
}

/// The oneway Python module.
#[pymodule]
fn oneway(_py: Python<'_>, m: &PyModule) -> PyResult<()> {
    m.add_class::<PyDataset>()?;
    m.add_class::<PyAnovaResult>()?;
    m.add_function(wrap_pyfunction!(parse_dataset, m)?)?;
    m.add_function(wrap_pyfunction!(one_way_anova, m)?)?;
    Ok(())
}
