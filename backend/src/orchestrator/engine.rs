//! Orchestrator Engine
//!
//! Per-event sequencing of the calibration caches:
//!
//! ```text
//! For each record:
//! 1. Missing object collection -> sentinel output, nothing else
//! 2. First record only: freeze the data/simulation bundle
//! 3. Refresh the corrector if the cache key changed (fatal on failure)
//! 4. Resolve the uncertainty source (first time only)
//! 5. Refresh the exclusion map if the run directive changed
//! 6. Evaluate every object, then order and filter by corrected momentum
//! ```
//!
//! All cache state is owned by one `Orchestrator` for the lifetime of the
//! job. Caches are mutated in steps 2-5 only, never while objects are being
//! evaluated.
//!
//! # Example
//!
//! ```rust
//! use jet_calib_core::correction::{
//!     CorrectionInputs, CorrectionModel, Corrector, LevelParameters, UncertaintyEvaluator,
//! };
//! use jet_calib_core::models::{EventRecord, RawObject};
//! use jet_calib_core::orchestrator::Orchestrator;
//! use jet_calib_core::CalibrationConfig;
//!
//! struct Unity;
//! impl Corrector for Unity {
//!     fn factor(&self, _inputs: &CorrectionInputs) -> f64 {
//!         1.0
//!     }
//! }
//!
//! struct UnityModel;
//! impl CorrectionModel for UnityModel {
//!     fn build_corrector(&self, _levels: &[LevelParameters]) -> Result<Box<dyn Corrector>, String> {
//!         Ok(Box::new(Unity))
//!     }
//!     fn build_uncertainty(
//!         &self,
//!         _params: &LevelParameters,
//!     ) -> Result<Box<dyn UncertaintyEvaluator>, String> {
//!         Err("not provided".to_string())
//!     }
//! }
//!
//! let mut orchestrator =
//!     Orchestrator::new(CalibrationConfig::default(), Box::new(UnityModel), None).unwrap();
//!
//! let record = EventRecord::new(1, 1, true).with_objects(vec![RawObject {
//!     pt: 40.0,
//!     eta: 0.5,
//!     phi: 1.0,
//!     mass: 5.0,
//!     area: 0.5,
//! }]);
//! let output = orchestrator.process_event(&record).unwrap();
//! assert_eq!(output.objects.len(), 1);
//! assert_eq!(output.objects[0].pt, 40.0);
//! ```

use tracing::{debug, info};

use crate::config::CalibrationConfig;
use crate::correction::apply::{apply_correction, CorrectionInputs};
use crate::correction::cache::CorrectorCache;
use crate::correction::conditions::ConditionsProvider;
use crate::correction::model::{CorrectionModel, Corrector};
use crate::correction::source::{CacheKey, CorrectionParameterSource, ResolvedParameters};
use crate::correction::uncertainty::{UncertaintyResolver, UncertaintySource};
use crate::error::CalibrationError;
use crate::models::event::{CalibrationEvent, CalibrationLog};
use crate::models::output::{EventOutput, ObjectOutput, MISSING_DENSITY};
use crate::models::record::{energy_from, EventRecord};
use crate::report::{BannerReporter, ConfigBanner};
use crate::selector::{ActiveInputs, DataMcSelector, Flavor};
use crate::veto::cache::{VetoMapCache, VetoTransition};

// ============================================================================
// Orchestrator
// ============================================================================

/// Owns every calibration cache of one job and sequences them per event
pub struct Orchestrator {
    config: CalibrationConfig,

    /// External correction mathematics
    model: Box<dyn CorrectionModel>,

    /// Conditions snapshot (snapshot mode)
    conditions: Option<Box<dyn ConditionsProvider>>,

    /// One-shot data/simulation selection
    selector: DataMcSelector,

    /// Inputs in effect after selection
    inputs: ActiveInputs,

    source: CorrectionParameterSource,
    correctors: CorrectorCache<CacheKey, Box<dyn Corrector>>,
    uncertainty: UncertaintyResolver,
    veto_maps: VetoMapCache,

    banners: BannerReporter,
    calibration_log: CalibrationLog,

    events_processed: u64,
    objects_logged: usize,
}

impl Orchestrator {
    /// Create an orchestrator for one job.
    ///
    /// # Errors
    ///
    /// * `InvalidConfig` - contradictory configuration
    pub fn new(
        config: CalibrationConfig,
        model: Box<dyn CorrectionModel>,
        conditions: Option<Box<dyn ConditionsProvider>>,
    ) -> Result<Self, CalibrationError> {
        config.validate()?;

        Ok(Self {
            selector: DataMcSelector::from_config(&config),
            inputs: ActiveInputs::from_config(&config),
            source: CorrectionParameterSource::from_config(&config),
            correctors: CorrectorCache::new(),
            uncertainty: UncertaintyResolver::from_config(&config),
            veto_maps: VetoMapCache::new(),
            banners: BannerReporter::new(),
            calibration_log: CalibrationLog::new(),
            events_processed: 0,
            objects_logged: 0,
            config,
            model,
            conditions,
        })
    }

    /// Calibrate one record.
    ///
    /// # Errors
    ///
    /// Corrector construction failures are fatal for the job:
    /// * `EmptyParameterSet` - file-list mode with nothing to build from
    /// * `MissingLevel` / `CorrectorBuildFailed` - snapshot mode cannot build
    /// * `ParameterFile` - a configured parameter file is unreadable
    pub fn process_event(&mut self, record: &EventRecord) -> Result<EventOutput, CalibrationError> {
        self.events_processed += 1;

        let mut output = EventOutput {
            run: record.run,
            lumi: record.lumi,
            event: record.event,
            density: record.density.unwrap_or(MISSING_DENSITY),
            vertex_count: record.vertex_count.unwrap_or(0),
            ..EventOutput::default()
        };

        let Some(objects) = &record.objects else {
            debug!(run = record.run, event = record.event, "no object collection; sentinel output");
            return Ok(output);
        };

        // STEP 1: FLAVOR SELECTION
        if let Some(flavor) = self.selector.select(record.is_data, &mut self.inputs) {
            self.calibration_log.log(CalibrationEvent::FlavorSelected {
                run: record.run,
                flavor: flavor.as_str().to_string(),
            });
        }

        // STEP 2: CORRECTOR AND UNCERTAINTY
        if self.config.apply_correction {
            let rebuilt = self.refresh_corrector(record.run)?;
            if self.config.apply_uncertainty {
                self.refresh_uncertainty(record.run);
            }
            if let Some(resolved) = rebuilt {
                self.report_banner(&resolved);
            }
        }

        // STEP 3: EXCLUSION MAP
        if self.config.apply_veto_map {
            self.refresh_veto_map(record.run);
        }

        // STEP 4: PER-OBJECT EVALUATION
        let corrector = if self.config.apply_correction {
            self.correctors.current().map(|c| c.as_ref())
        } else {
            None
        };
        let uncertainty = if self.config.apply_correction && self.config.apply_uncertainty {
            self.uncertainty.evaluator()
        } else {
            None
        };
        let vertex_count = record.vertex_count;

        for raw in objects {
            let inputs = CorrectionInputs {
                density: output.density,
                area: raw.area,
                raw_pt: raw.pt,
                eta: raw.eta,
                phi: raw.phi,
                raw_energy: raw.energy(),
                vertex_count,
            };
            let corrected = apply_correction(corrector, uncertainty, &inputs);
            let mass = raw.mass * corrected.factor;
            let veto = if self.config.apply_veto_map {
                self.veto_maps.query(raw.eta, raw.phi)
            } else {
                0
            };

            if self.objects_logged < self.config.log_first_objects {
                self.objects_logged += 1;
                debug!(
                    run = record.run,
                    event = record.event,
                    raw_pt = raw.pt,
                    eta = raw.eta,
                    phi = raw.phi,
                    area = raw.area,
                    density = output.density,
                    vertex_count,
                    factor = corrected.factor,
                    pt = corrected.corrected_pt,
                    relative_uncertainty = corrected.relative_uncertainty,
                    up = corrected.up_factor,
                    down = corrected.down_factor,
                    veto,
                    "object calibrated"
                );
            }

            output.objects.push(ObjectOutput {
                raw_pt: raw.pt,
                pt: corrected.corrected_pt,
                eta: raw.eta,
                phi: raw.phi,
                mass,
                energy: energy_from(corrected.corrected_pt, raw.eta, mass),
                factor: corrected.factor,
                relative_uncertainty: corrected.relative_uncertainty,
                up_factor: corrected.up_factor,
                down_factor: corrected.down_factor,
                veto,
            });
        }

        // STEP 5: ORDER AND FILTER
        output.objects.sort_by(|a, b| b.pt.total_cmp(&a.pt));
        let min_pt = self.config.min_corrected_pt;
        output.objects.retain(|o| o.pt > min_pt);
        output.vetoed_count = output.objects.iter().filter(|o| o.veto == 1).count();

        Ok(output)
    }

    /// Rebuild the corrector when the cache key for `run` changed.
    ///
    /// Returns the parameters used when a build happened.
    fn refresh_corrector(&mut self, run: u32) -> Result<Option<ResolvedParameters>, CalibrationError> {
        let key = self.source.cache_key(&self.inputs, run);
        if !self.correctors.needs_build(&key) {
            return Ok(None);
        }

        let source = &mut self.source;
        let inputs = &self.inputs;
        let conditions = self.conditions.as_deref();
        let model = self.model.as_ref();
        let mut resolved_out = None;

        self.correctors.ensure_current(&key, || {
            let resolved = source.resolve(inputs, conditions, run)?;
            let corrector = model.build_corrector(&resolved.levels).map_err(|reason| {
                CalibrationError::CorrectorBuildFailed {
                    payload: source.payload_name().to_string(),
                    run,
                    reason,
                }
            })?;
            resolved_out = Some(resolved);
            Ok::<_, CalibrationError>(Some(corrector))
        })?;

        if let Some(resolved) = &resolved_out {
            info!(
                run,
                key = %key,
                levels = ?resolved.level_names(),
                residual = resolved.residual_source.as_str(),
                "corrector built"
            );
            self.calibration_log.log(CalibrationEvent::CorrectorBuilt {
                run,
                key: key.to_string(),
                levels: resolved.level_names(),
                residual_source: resolved.residual_source.as_str().to_string(),
            });
            if resolved.residual_first_missing {
                self.calibration_log.log(CalibrationEvent::ResidualUnavailable {
                    run,
                    level: self.config.residual_level.clone(),
                });
            }
        }

        Ok(resolved_out)
    }

    fn refresh_uncertainty(&mut self, run: u32) {
        if self.uncertainty.is_resolved() {
            return;
        }

        let source = self.uncertainty.ensure_resolved(
            self.model.as_ref(),
            self.conditions.as_deref(),
            self.inputs.uncertainty_file.as_deref(),
        );

        let event = match source {
            Some(source) => CalibrationEvent::UncertaintyResolved {
                run,
                source: source.as_str().to_string(),
            },
            None => CalibrationEvent::UncertaintyUnavailable { run },
        };
        self.calibration_log.log(event);
    }

    fn refresh_veto_map(&mut self, run: u32) {
        let event = match self.veto_maps.ensure_current(run, &self.inputs.veto_map_table) {
            VetoTransition::Unchanged => return,
            VetoTransition::Loaded { .. } => match self.veto_maps.map() {
                Some(map) => CalibrationEvent::VetoMapLoaded {
                    run,
                    path: map.path().to_string(),
                    object: map.object_name().to_string(),
                    swapped_axes: map.roles().is_swapped(),
                },
                None => return,
            },
            VetoTransition::Failed { key, error } => CalibrationEvent::VetoMapUnavailable {
                run,
                key,
                reason: error.to_string(),
            },
            VetoTransition::Cleared => CalibrationEvent::VetoMapCleared { run },
        };
        self.calibration_log.log(event);
    }

    fn report_banner(&mut self, resolved: &ResolvedParameters) {
        let flavor = self.selector.selected().map_or("n/a", |f| f.as_str());
        let uncertainty = if !self.config.apply_uncertainty {
            "disabled"
        } else {
            self.uncertainty
                .source()
                .map_or("unavailable", |s| s.as_str())
        };
        let banner = ConfigBanner::new(
            self.source.mode().as_str(),
            self.source.payload_name(),
            flavor,
            &resolved.levels,
        )
        .with_residual_source(resolved.residual_source.as_str())
        .with_uncertainty_source(uncertainty);
        self.banners.report(&banner);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Inputs in effect (after flavor selection, once a record was seen)
    pub fn active_inputs(&self) -> &ActiveInputs {
        &self.inputs
    }

    pub fn selected_flavor(&self) -> Option<Flavor> {
        self.selector.selected()
    }

    /// Number of corrector builds so far
    pub fn corrector_build_count(&self) -> usize {
        self.correctors.build_count()
    }

    pub fn corrector_key(&self) -> Option<&CacheKey> {
        self.correctors.key()
    }

    pub fn uncertainty_source(&self) -> Option<UncertaintySource> {
        self.uncertainty.source()
    }

    pub fn veto_maps(&self) -> &VetoMapCache {
        &self.veto_maps
    }

    pub fn calibration_log(&self) -> &CalibrationLog {
        &self.calibration_log
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }
}

// Manual Debug implementation (model and conditions are trait objects)
impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("mode", &self.config.mode)
            .field("selected_flavor", &self.selector.selected())
            .field("corrector_key", &self.correctors.key())
            .field("corrector_builds", &self.correctors.build_count())
            .field("uncertainty", &self.uncertainty)
            .field("veto_map_key", &self.veto_maps.key())
            .field("events_processed", &self.events_processed)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
