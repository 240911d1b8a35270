//! Seams to the external correction model
//!
//! The mathematics of the correction (parameter formulas, interpolation,
//! factorized level products) lives outside this crate. The engine only
//! gathers ordered parameter sets and hands them to a `CorrectionModel`.

use std::path::Path;

use crate::correction::apply::CorrectionInputs;
use crate::error::CalibrationError;

/// Where a parameter set was obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterOrigin {
    /// Read from a parameter file
    File(String),

    /// Fetched from a conditions snapshot
    Snapshot { payload: String },
}

impl std::fmt::Display for ParameterOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterOrigin::File(path) => write!(f, "file {}", path),
            ParameterOrigin::Snapshot { payload } => write!(f, "snapshot payload {}", payload),
        }
    }
}

/// Opaque parameter set for one correction level
///
/// `content` is passed through untouched; only the correction model
/// interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelParameters {
    pub level: String,
    pub origin: ParameterOrigin,
    pub content: String,
}

impl LevelParameters {
    pub fn new(level: impl Into<String>, origin: ParameterOrigin, content: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            origin,
            content: content.into(),
        }
    }

    /// Read a per-level parameter file.
    ///
    /// The level is the first of `known_levels` that appears in the file name,
    /// falling back to the file stem.
    pub fn from_file(path: &str, known_levels: &[String]) -> Result<Self, CalibrationError> {
        let content = std::fs::read_to_string(path).map_err(|e| CalibrationError::ParameterFile {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            level: level_from_file_name(path, known_levels),
            origin: ParameterOrigin::File(path.to_string()),
            content,
        })
    }
}

/// Infer the level a file provides from its name.
pub fn level_from_file_name(path: &str, known_levels: &[String]) -> String {
    let file_name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);

    if let Some(level) = known_levels.iter().find(|l| file_name.contains(l.as_str())) {
        return level.clone();
    }

    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
        .to_string()
}

/// Built multiplicative correction evaluator
pub trait Corrector {
    /// Correction factor for one object.
    fn factor(&self, inputs: &CorrectionInputs) -> f64;
}

/// Built uncertainty evaluator
pub trait UncertaintyEvaluator {
    /// Relative uncertainty at (pseudorapidity, corrected momentum).
    ///
    /// Implementations may return small negative values from interpolation;
    /// callers clamp.
    fn relative_uncertainty(&self, eta: f64, corrected_pt: f64) -> f64;
}

/// Factory for evaluators, implemented by the external correction model
pub trait CorrectionModel {
    /// Build a corrector from parameter sets in application order.
    fn build_corrector(&self, levels: &[LevelParameters]) -> Result<Box<dyn Corrector>, String>;

    /// Build an uncertainty evaluator from one parameter set.
    fn build_uncertainty(
        &self,
        parameters: &LevelParameters,
    ) -> Result<Box<dyn UncertaintyEvaluator>, String>;
}
