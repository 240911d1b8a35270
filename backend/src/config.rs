//! Calibration configuration
//!
//! All options are read once at job start. Documents are JSON with camelCase
//! keys; every field has a default so partial documents are accepted.
//!
//! # Example
//!
//! ```rust
//! use jet_calib_core::{CalibrationConfig, CorrectionMode};
//!
//! let json = r#"{
//!     "applyCorrection": true,
//!     "mode": "fileList",
//!     "levels": ["L1FastJet", "L2Relative", "L3Absolute"],
//!     "levelFiles": ["L1.txt", "L2.txt", "L3.txt"],
//!     "residualByRun": true,
//!     "residualTable": ["1:100:ResA.txt", "100:-1:ResB.txt"]
//! }"#;
//!
//! let config = CalibrationConfig::from_json_str(json).unwrap();
//! assert_eq!(config.mode, CorrectionMode::FileList);
//! assert_eq!(config.residual_table.len(), 2);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;

/// Default name of the run-dependent residual level
pub const DEFAULT_RESIDUAL_LEVEL: &str = "L2L3Residual";

/// Level name under which a conditions snapshot stores the uncertainty source
pub const UNCERTAINTY_LEVEL: &str = "Uncertainty";

/// Where correction parameters come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CorrectionMode {
    /// Per-level parameter files shipped with the job
    #[default]
    #[serde(alias = "txt", alias = "file-list")]
    FileList,

    /// Externally supplied, versioned parameter bundle
    #[serde(alias = "es", alias = "conditions-snapshot")]
    ConditionsSnapshot,
}

impl CorrectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrectionMode::FileList => "file-list",
            CorrectionMode::ConditionsSnapshot => "conditions-snapshot",
        }
    }
}

/// Flavor-specific inputs, chosen once on the first record of the job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlavorBundle {
    /// Per-level parameter files (file-list mode)
    pub level_files: Vec<String>,

    /// Run-ranged residual files; empty disables per-run residuals
    pub residual_table: Vec<String>,

    /// Uncertainty parameter file
    pub uncertainty_file: Option<String>,

    /// Run-ranged or literal veto-map files
    pub veto_map_files: Vec<String>,

    /// Optional replacement for the global level list
    pub levels: Option<Vec<String>>,
}

/// Complete calibration configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalibrationConfig {
    /// Master switch for the multiplicative correction
    pub apply_correction: bool,

    /// Parameter-supply mode
    pub mode: CorrectionMode,

    /// Conditions payload name (snapshot mode), reported in banners otherwise
    pub payload_name: String,

    /// Ordered correction levels
    pub levels: Vec<String>,

    /// Ordered per-level files (file-list mode)
    pub level_files: Vec<String>,

    /// Choose a residual layer per run from `residual_table`
    pub residual_by_run: bool,

    /// Run-ranged residual directives
    pub residual_table: Vec<String>,

    /// Level name identifying the residual layer
    pub residual_level: String,

    /// Snapshot mode: take the residual from `residual_table` when the snapshot lacks it
    pub residual_fallback_allowed: bool,

    /// Compute relative uncertainties
    pub apply_uncertainty: bool,

    /// Uncertainty parameter file (file-list source, snapshot fallback)
    pub uncertainty_file: Option<String>,

    /// Snapshot mode: use `uncertainty_file` when the snapshot has no uncertainty
    pub uncertainty_fallback_allowed: bool,

    /// Annotate objects with the region-exclusion map
    pub apply_veto_map: bool,

    /// Run-ranged or literal veto-map files
    pub veto_map_files: Vec<String>,

    /// Inputs used when the first record is real data
    pub data: Option<FlavorBundle>,

    /// Inputs used when the first record is simulation
    pub simulation: Option<FlavorBundle>,

    /// Objects with corrected momentum at or below this are not emitted
    pub min_corrected_pt: f64,

    /// Number of evaluated objects to dump at debug level
    pub log_first_objects: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            apply_correction: false,
            mode: CorrectionMode::FileList,
            payload_name: String::new(),
            levels: Vec::new(),
            level_files: Vec::new(),
            residual_by_run: false,
            residual_table: Vec::new(),
            residual_level: DEFAULT_RESIDUAL_LEVEL.to_string(),
            residual_fallback_allowed: false,
            apply_uncertainty: false,
            uncertainty_file: None,
            uncertainty_fallback_allowed: false,
            apply_veto_map: false,
            veto_map_files: Vec::new(),
            data: None,
            simulation: None,
            min_corrected_pt: 0.0,
            log_first_objects: 0,
        }
    }
}

impl CalibrationConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, CalibrationError> {
        let config: CalibrationConfig =
            serde_json::from_str(json).map_err(|e| CalibrationError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CalibrationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CalibrationError::ConfigParse(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// Reject settings that cannot describe a working job.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.apply_correction
            && self.mode == CorrectionMode::ConditionsSnapshot
            && self.payload_name.trim().is_empty()
        {
            return Err(CalibrationError::InvalidConfig(
                "conditions-snapshot mode requires a non-empty payloadName".to_string(),
            ));
        }

        if self.apply_correction
            && self.mode == CorrectionMode::ConditionsSnapshot
            && self.levels.is_empty()
        {
            return Err(CalibrationError::InvalidConfig(
                "conditions-snapshot mode requires at least one level".to_string(),
            ));
        }

        if self.residual_level.trim().is_empty() {
            return Err(CalibrationError::InvalidConfig(
                "residualLevel must not be empty".to_string(),
            ));
        }

        if !self.min_corrected_pt.is_finite() {
            return Err(CalibrationError::InvalidConfig(format!(
                "minCorrectedPt must be finite, got {}",
                self.min_corrected_pt
            )));
        }

        Ok(())
    }

    /// Whether a data/simulation choice has to be made on the first record.
    pub fn has_flavor_bundles(&self) -> bool {
        self.data.is_some() || self.simulation.is_some()
    }

    /// Whether the configured level list asks for the residual layer.
    pub fn wants_residual(&self, levels: &[String]) -> bool {
        levels.iter().any(|l| l == &self.residual_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config = CalibrationConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CalibrationConfig::default());
        assert_eq!(config.residual_level, DEFAULT_RESIDUAL_LEVEL);
    }

    #[test]
    fn test_mode_aliases() {
        let config = CalibrationConfig::from_json_str(r#"{"mode": "txt"}"#).unwrap();
        assert_eq!(config.mode, CorrectionMode::FileList);

        let config = CalibrationConfig::from_json_str(
            r#"{"mode": "es", "payloadName": "AK4PFchs", "levels": ["L1FastJet"]}"#,
        )
        .unwrap();
        assert_eq!(config.mode, CorrectionMode::ConditionsSnapshot);
    }

    #[test]
    fn test_mode_display_names_parse() {
        for mode in [CorrectionMode::FileList, CorrectionMode::ConditionsSnapshot] {
            let json = format!(
                r#"{{"mode": "{}", "payloadName": "AK4PFchs", "levels": ["L1FastJet"]}}"#,
                mode.as_str()
            );
            let config = CalibrationConfig::from_json_str(&json).unwrap();
            assert_eq!(config.mode, mode);
        }
    }

    #[test]
    fn test_snapshot_mode_requires_payload() {
        let result = CalibrationConfig::from_json_str(
            r#"{"applyCorrection": true, "mode": "conditionsSnapshot", "levels": ["L1FastJet"]}"#,
        );
        assert!(matches!(result, Err(CalibrationError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_document() {
        let result = CalibrationConfig::from_json_str(r#"{"levels": 3}"#);
        assert!(matches!(result, Err(CalibrationError::ConfigParse(_))));
    }

    #[test]
    fn test_flavor_bundle_parse() {
        let config = CalibrationConfig::from_json_str(
            r#"{"simulation": {"levelFiles": ["mc_L1.txt"], "levels": ["L1FastJet"]}}"#,
        )
        .unwrap();
        let mc = config.simulation.unwrap();
        assert_eq!(mc.level_files, vec!["mc_L1.txt".to_string()]);
        assert_eq!(mc.levels, Some(vec!["L1FastJet".to_string()]));
        assert!(config.data.is_none());
    }
}
