//! Jet Calibration Core - Rust Engine
//!
//! Resolves and caches run-dependent calibration parameters for a stream of
//! detector records and applies them to per-object measurements.
//!
//! # Architecture
//!
//! - **core**: run-range directive tables
//! - **config**: job configuration (JSON)
//! - **correction**: parameter supply, evaluator caching, uncertainty, application
//! - **selector**: one-time data/simulation bundle selection
//! - **veto**: region-exclusion maps with axis-role detection
//! - **models**: input records, calibrated outputs, calibration event log
//! - **orchestrator**: per-event sequencing
//! - **report**: configuration banners
//!
//! # Critical Invariants
//!
//! 1. At most one evaluator build per distinct cache key per job
//! 2. The data/simulation choice is made on the first record and then frozen
//! 3. Caches change only between events, never during object evaluation

// Module declarations
pub mod config;
pub mod core;
pub mod correction;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod report;
pub mod selector;
pub mod veto;

// Re-exports for convenience
pub use config::{CalibrationConfig, CorrectionMode, FlavorBundle};
pub use self::core::{RunRangeMatch, RunRangeRule, RunRangeTable};
pub use correction::{
    CorrectionInputs, CorrectionModel, CorrectionOutput, Corrector, ConditionsProvider,
    JsonConditionsSnapshot, LevelParameters, UncertaintyEvaluator,
};
pub use error::CalibrationError;
pub use models::{CalibrationEvent, CalibrationLog, EventOutput, EventRecord, ObjectOutput, RawObject};
pub use orchestrator::Orchestrator;
pub use selector::{DataMcSelector, Flavor};
pub use veto::{VetoMap, VetoMapCache};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn jet_calib_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::run_range::PyRunRangeTable>()?;
    m.add_class::<ffi::veto::PyVetoMap>()?;
    Ok(())
}
