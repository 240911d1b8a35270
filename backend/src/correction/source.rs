//! Correction parameter supply
//!
//! Produces the ordered parameter sets for the active run from one of two
//! modes:
//!
//! - **File list**: fixed per-level files plus an optional residual file picked
//!   per run from a run-range table. An empty effective list is fatal.
//! - **Conditions snapshot**: levels fetched by `(payload, level)`. A missing
//!   residual may be replaced by the run-range table (when allowed); if neither
//!   source has it the job continues without the residual layer.
//!
//! The cache key returned by [`CorrectionParameterSource::cache_key`] changes
//! exactly when the resolved parameter set would change, so callers rebuild
//! only on run-boundary transitions that matter.

use tracing::{info, warn};

use crate::config::{CalibrationConfig, CorrectionMode};
use crate::correction::conditions::ConditionsProvider;
use crate::correction::model::LevelParameters;
use crate::error::CalibrationError;
use crate::selector::ActiveInputs;

/// Composite identity of a built corrector
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub mode: CorrectionMode,
    pub payload: String,
    /// Residual file for the run, empty when none applies
    pub residual: String,
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let residual = if self.residual.is_empty() {
            "(none)"
        } else {
            self.residual.as_str()
        };
        write!(f, "{}|{}|{}", self.mode.as_str(), self.payload, residual)
    }
}

/// Which source supplied the residual layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidualSource {
    /// The level list does not ask for a residual (or no file covers the run)
    NotRequested,

    /// Residual file from the run-range table (file-list mode)
    File,

    /// Residual found in the conditions snapshot
    Snapshot,

    /// Snapshot lacked the residual, file from the run-range table used instead
    FileFallback,

    /// Requested but unavailable from every configured source
    Missing,
}

impl ResidualSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResidualSource::NotRequested => "n/a",
            ResidualSource::File => "file",
            ResidualSource::Snapshot => "snapshot",
            ResidualSource::FileFallback => "file fallback",
            ResidualSource::Missing => "none",
        }
    }
}

/// Parameter sets ready to hand to the correction model
#[derive(Debug, Clone)]
pub struct ResolvedParameters {
    pub key: CacheKey,
    pub levels: Vec<LevelParameters>,
    pub residual_source: ResidualSource,
    /// Set on the one resolution that reported the residual as unavailable
    pub residual_first_missing: bool,
}

impl ResolvedParameters {
    /// Level names in application order.
    pub fn level_names(&self) -> Vec<String> {
        self.levels.iter().map(|p| p.level.clone()).collect()
    }
}

/// Resolves correction parameters for a run in the configured mode
#[derive(Debug, Clone)]
pub struct CorrectionParameterSource {
    mode: CorrectionMode,
    payload_name: String,
    residual_level: String,
    residual_fallback_allowed: bool,
    missing_residual_reported: bool,
}

impl CorrectionParameterSource {
    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self {
            mode: config.mode,
            payload_name: config.payload_name.clone(),
            residual_level: config.residual_level.clone(),
            residual_fallback_allowed: config.residual_fallback_allowed,
            missing_residual_reported: false,
        }
    }

    pub fn mode(&self) -> CorrectionMode {
        self.mode
    }

    pub fn payload_name(&self) -> &str {
        &self.payload_name
    }

    /// Whether the missing residual layer has already been reported this job
    pub fn missing_residual_reported(&self) -> bool {
        self.missing_residual_reported
    }

    /// Key identifying the parameter set that `resolve` would produce for `run`.
    pub fn cache_key(&self, inputs: &ActiveInputs, run: u32) -> CacheKey {
        let residual = match self.mode {
            CorrectionMode::FileList => self.residual_file_for_run(inputs, run),
            CorrectionMode::ConditionsSnapshot => {
                if self.residual_fallback_allowed && self.wants_residual(inputs) {
                    self.residual_file_for_run(inputs, run)
                } else {
                    None
                }
            }
        };

        CacheKey {
            mode: self.mode,
            payload: self.payload_name.clone(),
            residual: residual.unwrap_or_default(),
        }
    }

    /// Gather the ordered parameter sets for `run`.
    ///
    /// # Errors
    ///
    /// * `EmptyParameterSet` - file-list mode has no files at all
    /// * `ParameterFile` - a configured file cannot be read
    /// * `MissingLevel` - a non-residual level is absent from the snapshot
    /// * `CorrectorBuildFailed` - snapshot mode without a snapshot
    pub fn resolve(
        &mut self,
        inputs: &ActiveInputs,
        conditions: Option<&dyn ConditionsProvider>,
        run: u32,
    ) -> Result<ResolvedParameters, CalibrationError> {
        match self.mode {
            CorrectionMode::FileList => self.resolve_file_list(inputs, run),
            CorrectionMode::ConditionsSnapshot => self.resolve_snapshot(inputs, conditions, run),
        }
    }

    fn resolve_file_list(
        &self,
        inputs: &ActiveInputs,
        run: u32,
    ) -> Result<ResolvedParameters, CalibrationError> {
        let known_levels = self.known_levels(inputs);
        let residual_file = self.residual_file_for_run(inputs, run);

        if inputs.level_files.is_empty() && residual_file.is_none() {
            return Err(CalibrationError::EmptyParameterSet {
                option: "levelFiles/residualTable".to_string(),
                run,
            });
        }

        let mut levels = inputs
            .level_files
            .iter()
            .map(|path| LevelParameters::from_file(path, &known_levels))
            .collect::<Result<Vec<_>, _>>()?;

        let residual_source = match &residual_file {
            Some(path) => {
                let mut residual = LevelParameters::from_file(path, &known_levels)?;
                residual.level = self.residual_level.clone();
                levels.push(residual);
                ResidualSource::File
            }
            None => ResidualSource::NotRequested,
        };

        Ok(ResolvedParameters {
            key: CacheKey {
                mode: self.mode,
                payload: self.payload_name.clone(),
                residual: residual_file.unwrap_or_default(),
            },
            levels,
            residual_source,
            residual_first_missing: false,
        })
    }

    fn resolve_snapshot(
        &mut self,
        inputs: &ActiveInputs,
        conditions: Option<&dyn ConditionsProvider>,
        run: u32,
    ) -> Result<ResolvedParameters, CalibrationError> {
        let Some(conditions) = conditions else {
            return Err(CalibrationError::CorrectorBuildFailed {
                payload: self.payload_name.clone(),
                run,
                reason: "no conditions snapshot supplied".to_string(),
            });
        };

        if inputs.levels.is_empty() {
            return Err(CalibrationError::CorrectorBuildFailed {
                payload: self.payload_name.clone(),
                run,
                reason: "level list is empty".to_string(),
            });
        }

        let key = self.cache_key(inputs, run);
        let mut levels = Vec::with_capacity(inputs.levels.len());
        let mut residual_source = ResidualSource::NotRequested;
        let mut residual_first_missing = false;

        for level in &inputs.levels {
            if let Some(params) = conditions.fetch(&self.payload_name, level) {
                if *level == self.residual_level {
                    residual_source = ResidualSource::Snapshot;
                }
                levels.push(params);
                continue;
            }

            if *level != self.residual_level {
                return Err(CalibrationError::MissingLevel {
                    payload: self.payload_name.clone(),
                    level: level.clone(),
                });
            }

            let fallback = if self.residual_fallback_allowed {
                self.residual_file_for_run(inputs, run)
            } else {
                None
            };

            match fallback {
                Some(path) => {
                    let mut residual = LevelParameters::from_file(&path, &self.known_levels(inputs))?;
                    residual.level = self.residual_level.clone();
                    info!(
                        payload = %self.payload_name,
                        run,
                        file = %path,
                        "residual level taken from file fallback"
                    );
                    levels.push(residual);
                    residual_source = ResidualSource::FileFallback;
                }
                None => {
                    if !self.missing_residual_reported {
                        residual_first_missing = true;
                        warn!(
                            payload = %self.payload_name,
                            level = %level,
                            run,
                            "residual level requested but unavailable; continuing without it"
                        );
                        self.missing_residual_reported = true;
                    }
                    residual_source = ResidualSource::Missing;
                }
            }
        }

        Ok(ResolvedParameters {
            key,
            levels,
            residual_source,
            residual_first_missing,
        })
    }

    fn wants_residual(&self, inputs: &ActiveInputs) -> bool {
        inputs.levels.iter().any(|l| *l == self.residual_level)
    }

    fn residual_file_for_run(&self, inputs: &ActiveInputs, run: u32) -> Option<String> {
        if !inputs.residual_by_run {
            return None;
        }
        inputs.residual_table.resolve(run).map(|m| m.payload)
    }

    fn known_levels(&self, inputs: &ActiveInputs) -> Vec<String> {
        let mut known = inputs.levels.clone();
        if !known.contains(&self.residual_level) {
            known.push(self.residual_level.clone());
        }
        known
    }
}
