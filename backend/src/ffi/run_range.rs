//! PyO3 wrapper for RunRangeTable

use pyo3::prelude::*;

use crate::core::RunRangeTable;

/// Python wrapper for a run-range directive table
///
/// # Example (from Python)
///
/// ```python
/// from jet_calib_core import RunRangeTable
///
/// table = RunRangeTable(["1:100:fileA.txt", "100:-1:fileB.txt"])
/// assert table.resolve(150) == "fileB.txt"
/// ```
#[pyclass(name = "RunRangeTable")]
pub struct PyRunRangeTable {
    inner: RunRangeTable,
}

#[pymethods]
impl PyRunRangeTable {
    #[new]
    fn new(entries: Vec<String>) -> Self {
        PyRunRangeTable {
            inner: RunRangeTable::parse(&entries),
        }
    }

    /// Payload of the first rule containing `run`, or None
    fn resolve(&self, run: u32) -> Option<String> {
        self.inner.resolve(run).map(|m| m.payload)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!("RunRangeTable(rules={})", self.inner.len())
    }
}
