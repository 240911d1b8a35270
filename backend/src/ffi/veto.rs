//! PyO3 wrapper for VetoMap

use pyo3::prelude::*;
use tracing::warn;

use crate::veto::VetoMap;

/// Python wrapper for a loaded exclusion map
#[pyclass(name = "VetoMap")]
pub struct PyVetoMap {
    inner: VetoMap,
}

#[pymethods]
impl PyVetoMap {
    /// Load a map file; None when the file is unusable
    #[staticmethod]
    fn load(path: &str) -> Option<Self> {
        match VetoMap::load(path) {
            Ok(inner) => Some(PyVetoMap { inner }),
            Err(error) => {
                warn!(%error, "exclusion map unavailable");
                None
            }
        }
    }

    /// 1 inside a bad region, 0 otherwise
    fn flag(&self, eta: f64, phi: f64) -> u8 {
        self.inner.flag(eta, phi)
    }

    #[getter]
    fn object_name(&self) -> String {
        self.inner.object_name().to_string()
    }

    #[getter]
    fn swapped_axes(&self) -> bool {
        self.inner.roles().is_swapped()
    }

    fn __repr__(&self) -> String {
        format!(
            "VetoMap(path='{}', object='{}')",
            self.inner.path(),
            self.inner.object_name()
        )
    }
}
