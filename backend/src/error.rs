//! Calibration error types
//!
//! Only failures that must stop the job surface as `CalibrationError`.
//! Recoverable conditions (missing uncertainty source, unusable veto map,
//! absent residual) are logged and absorbed by the component that hit them.

use thiserror::Error;

/// Errors raised by the calibration engine
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CalibrationError {
    /// File-list mode resolved to no parameter files at all
    #[error("no correction parameters for run {run}: option '{option}' resolved to an empty level list")]
    EmptyParameterSet { option: String, run: u32 },

    /// A mandatory level is absent from the conditions snapshot
    #[error("level '{level}' not present in conditions payload '{payload}'")]
    MissingLevel { payload: String, level: String },

    /// The external correction model refused the parameter set
    #[error("corrector build failed for payload '{payload}' (run {run}): {reason}")]
    CorrectorBuildFailed {
        payload: String,
        run: u32,
        reason: String,
    },

    /// A parameter file could not be read
    #[error("cannot read parameter file '{path}': {reason}")]
    ParameterFile { path: String, reason: String },

    /// Configuration is internally inconsistent
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration document could not be parsed
    #[error("cannot parse configuration: {0}")]
    ConfigParse(String),
}
