//! Uncertainty evaluator resolution
//!
//! The uncertainty source is resolved once per job:
//!
//! - **File list**: the configured uncertainty file.
//! - **Conditions snapshot**: the snapshot's native `Uncertainty` level, then
//!   the configured file when fallback is allowed.
//!
//! When every path fails the resolver remembers the outcome and reports zero
//! uncertainty for the rest of the job without retrying.

use tracing::{info, warn};

use crate::config::{CalibrationConfig, CorrectionMode, UNCERTAINTY_LEVEL};
use crate::correction::conditions::ConditionsProvider;
use crate::correction::model::{CorrectionModel, LevelParameters, UncertaintyEvaluator};

/// Clamp interpolation artifacts below zero.
pub fn clamp_uncertainty(value: f64) -> f64 {
    if value.is_nan() || value < 0.0 {
        0.0
    } else {
        value
    }
}

/// Which source produced the uncertainty evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UncertaintySource {
    /// Configured uncertainty file (file-list mode)
    File,

    /// Native snapshot uncertainty
    Snapshot,

    /// Snapshot lacked it, configured file used instead
    FileFallback,
}

impl UncertaintySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            UncertaintySource::File => "file",
            UncertaintySource::Snapshot => "snapshot",
            UncertaintySource::FileFallback => "file fallback",
        }
    }
}

enum ResolverState {
    Unresolved,
    Ready {
        evaluator: Box<dyn UncertaintyEvaluator>,
        source: UncertaintySource,
    },
    Unavailable,
}

/// Resolves and owns the job's uncertainty evaluator
pub struct UncertaintyResolver {
    mode: CorrectionMode,
    payload_name: String,
    fallback_allowed: bool,
    state: ResolverState,
}

impl std::fmt::Debug for UncertaintyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.state {
            ResolverState::Unresolved => "unresolved",
            ResolverState::Ready { source, .. } => source.as_str(),
            ResolverState::Unavailable => "unavailable",
        };
        f.debug_struct("UncertaintyResolver")
            .field("mode", &self.mode)
            .field("payload_name", &self.payload_name)
            .field("fallback_allowed", &self.fallback_allowed)
            .field("state", &state)
            .finish()
    }
}

impl UncertaintyResolver {
    pub fn from_config(config: &CalibrationConfig) -> Self {
        Self {
            mode: config.mode,
            payload_name: config.payload_name.clone(),
            fallback_allowed: config.uncertainty_fallback_allowed,
            state: ResolverState::Unresolved,
        }
    }

    /// Resolve the evaluator on first call; later calls return the outcome
    /// of the first.
    ///
    /// Returns the source used, or `None` when no source is available.
    pub fn ensure_resolved(
        &mut self,
        model: &dyn CorrectionModel,
        conditions: Option<&dyn ConditionsProvider>,
        uncertainty_file: Option<&str>,
    ) -> Option<UncertaintySource> {
        if matches!(self.state, ResolverState::Unresolved) {
            self.state = self.build(model, conditions, uncertainty_file);
            match &self.state {
                ResolverState::Ready { source, .. } => {
                    info!(source = source.as_str(), "uncertainty evaluator ready");
                }
                _ => {
                    warn!(
                        mode = self.mode.as_str(),
                        payload = %self.payload_name,
                        file = uncertainty_file.unwrap_or("(none)"),
                        "no uncertainty source available; relative uncertainty is 0 for this job"
                    );
                }
            }
        }
        self.source()
    }

    fn build(
        &self,
        model: &dyn CorrectionModel,
        conditions: Option<&dyn ConditionsProvider>,
        uncertainty_file: Option<&str>,
    ) -> ResolverState {
        match self.mode {
            CorrectionMode::FileList => match from_file(model, uncertainty_file) {
                Some(evaluator) => ResolverState::Ready {
                    evaluator,
                    source: UncertaintySource::File,
                },
                None => ResolverState::Unavailable,
            },
            CorrectionMode::ConditionsSnapshot => {
                let native = conditions
                    .and_then(|c| c.fetch(&self.payload_name, UNCERTAINTY_LEVEL))
                    .and_then(|params| build_logged(model, &params));
                if let Some(evaluator) = native {
                    return ResolverState::Ready {
                        evaluator,
                        source: UncertaintySource::Snapshot,
                    };
                }

                if !self.fallback_allowed {
                    return ResolverState::Unavailable;
                }

                match from_file(model, uncertainty_file) {
                    Some(evaluator) => ResolverState::Ready {
                        evaluator,
                        source: UncertaintySource::FileFallback,
                    },
                    None => ResolverState::Unavailable,
                }
            }
        }
    }

    /// Relative uncertainty at (eta, corrected momentum), clamped at 0.
    ///
    /// Returns 0 when no evaluator is available.
    pub fn evaluate(&self, eta: f64, corrected_pt: f64) -> f64 {
        match &self.state {
            ResolverState::Ready { evaluator, .. } => {
                clamp_uncertainty(evaluator.relative_uncertainty(eta, corrected_pt))
            }
            _ => 0.0,
        }
    }

    /// Active evaluator, if resolution succeeded.
    pub fn evaluator(&self) -> Option<&dyn UncertaintyEvaluator> {
        match &self.state {
            ResolverState::Ready { evaluator, .. } => Some(evaluator.as_ref()),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<UncertaintySource> {
        match &self.state {
            ResolverState::Ready { source, .. } => Some(*source),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self.state, ResolverState::Unresolved)
    }

    /// Whether resolution ran and found nothing.
    pub fn is_unavailable(&self) -> bool {
        matches!(self.state, ResolverState::Unavailable)
    }
}

fn from_file(
    model: &dyn CorrectionModel,
    path: Option<&str>,
) -> Option<Box<dyn UncertaintyEvaluator>> {
    let path = path.filter(|p| !p.trim().is_empty())?;
    match LevelParameters::from_file(path, &[UNCERTAINTY_LEVEL.to_string()]) {
        Ok(mut params) => {
            params.level = UNCERTAINTY_LEVEL.to_string();
            build_logged(model, &params)
        }
        Err(e) => {
            warn!(error = %e, "uncertainty file unreadable");
            None
        }
    }
}

fn build_logged(
    model: &dyn CorrectionModel,
    params: &LevelParameters,
) -> Option<Box<dyn UncertaintyEvaluator>> {
    match model.build_uncertainty(params) {
        Ok(evaluator) => Some(evaluator),
        Err(reason) => {
            warn!(origin = %params.origin, %reason, "uncertainty evaluator build failed");
            None
        }
    }
}
