//! Correction resolution and application
//!
//! # Architecture
//!
//! - **model**: seams to the external correction model (`Corrector`,
//!   `UncertaintyEvaluator`, `CorrectionModel`)
//! - **conditions**: conditions-snapshot lookup
//! - **source**: per-run parameter resolution in file-list or snapshot mode
//! - **cache**: key-guarded evaluator cache
//! - **uncertainty**: one-time uncertainty source resolution
//! - **apply**: per-object factor and uncertainty evaluation

pub mod apply;
pub mod cache;
pub mod conditions;
pub mod model;
pub mod source;
pub mod uncertainty;

pub use apply::{apply_correction, CorrectionInputs, CorrectionOutput, UNCERTAINTY_MIN_PT};
pub use cache::CorrectorCache;
pub use conditions::{ConditionsProvider, JsonConditionsSnapshot};
pub use model::{
    level_from_file_name, CorrectionModel, Corrector, LevelParameters, ParameterOrigin,
    UncertaintyEvaluator,
};
pub use source::{CacheKey, CorrectionParameterSource, ResidualSource, ResolvedParameters};
pub use uncertainty::{clamp_uncertainty, UncertaintyResolver, UncertaintySource};
