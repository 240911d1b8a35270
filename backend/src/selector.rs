//! Data / simulation input selection
//!
//! The data type is constant within one input stream, so the flavor-specific
//! inputs are chosen on the first record and frozen for the rest of the job.

use tracing::info;

use crate::config::{CalibrationConfig, FlavorBundle};
use crate::core::run_range::RunRangeTable;

/// Record flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Data,
    Simulation,
}

impl Flavor {
    pub fn from_is_data(is_data: bool) -> Self {
        if is_data {
            Flavor::Data
        } else {
            Flavor::Simulation
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Flavor::Data => "data",
            Flavor::Simulation => "simulation",
        }
    }
}

/// Inputs in effect for the job, after flavor selection
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveInputs {
    pub levels: Vec<String>,
    pub level_files: Vec<String>,
    pub residual_by_run: bool,
    pub residual_table: RunRangeTable,
    pub uncertainty_file: Option<String>,
    pub veto_map_table: RunRangeTable,
}

impl ActiveInputs {
    /// Inputs taken directly from the top-level options.
    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self {
            levels: config.levels.clone(),
            level_files: config.level_files.clone(),
            residual_by_run: config.residual_by_run,
            residual_table: RunRangeTable::parse(&config.residual_table),
            uncertainty_file: config.uncertainty_file.clone(),
            veto_map_table: RunRangeTable::parse(&config.veto_map_files),
        }
    }

    /// Replace the flavor-specific parts with a bundle.
    ///
    /// Per-run residuals are enabled exactly when the bundle carries a
    /// residual table.
    pub fn apply_bundle(&mut self, bundle: &FlavorBundle) {
        self.level_files = bundle.level_files.clone();
        self.residual_table = RunRangeTable::parse(&bundle.residual_table);
        self.residual_by_run = !self.residual_table.is_empty();
        self.uncertainty_file = bundle.uncertainty_file.clone();
        self.veto_map_table = RunRangeTable::parse(&bundle.veto_map_files);
        if let Some(levels) = &bundle.levels {
            self.levels = levels.clone();
        }
    }
}

/// One-shot selector between the data and simulation bundles
#[derive(Debug, Clone)]
pub struct DataMcSelector {
    data: Option<FlavorBundle>,
    simulation: Option<FlavorBundle>,
    selected: Option<Flavor>,
}

impl DataMcSelector {
    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self {
            data: config.data.clone(),
            simulation: config.simulation.clone(),
            selected: None,
        }
    }

    /// Freeze the bundle matching `is_data` into `inputs`.
    ///
    /// Only the first call has an effect. Returns the flavor chosen by this
    /// call, or `None` when the selection was already made. When no bundles are
    /// configured the top-level inputs stay in place.
    pub fn select(&mut self, is_data: bool, inputs: &mut ActiveInputs) -> Option<Flavor> {
        if self.selected.is_some() {
            return None;
        }

        let flavor = Flavor::from_is_data(is_data);
        self.selected = Some(flavor);

        if self.data.is_none() && self.simulation.is_none() {
            return Some(flavor);
        }

        let bundle = match flavor {
            Flavor::Data => self.data.as_ref(),
            Flavor::Simulation => self.simulation.as_ref(),
        };

        match bundle {
            Some(bundle) => {
                inputs.apply_bundle(bundle);
                info!(
                    flavor = flavor.as_str(),
                    level_files = inputs.level_files.len(),
                    residual_rules = inputs.residual_table.len(),
                    veto_rules = inputs.veto_map_table.len(),
                    "calibration inputs selected"
                );
            }
            None => {
                info!(
                    flavor = flavor.as_str(),
                    "no bundle configured for flavor; keeping top-level inputs"
                );
            }
        }

        Some(flavor)
    }

    /// Flavor frozen on the first record, if any record was seen.
    pub fn selected(&self) -> Option<Flavor> {
        self.selected
    }
}
