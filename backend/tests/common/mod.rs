//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use jet_calib_core::correction::{
    CorrectionInputs, CorrectionModel, Corrector, LevelParameters, UncertaintyEvaluator,
};
use jet_calib_core::veto::{AxisSpec, MapContainer, StoredObject};

// ============================================================================
// Correction model double
// ============================================================================

/// Corrector whose factor is the product of the numeric level contents
pub struct ProductCorrector {
    factor: f64,
    seen: Rc<RefCell<Vec<CorrectionInputs>>>,
}

impl Corrector for ProductCorrector {
    fn factor(&self, inputs: &CorrectionInputs) -> f64 {
        self.seen.borrow_mut().push(*inputs);
        self.factor
    }
}

/// Uncertainty evaluator returning a constant
pub struct ConstantUncertainty(pub f64);

impl UncertaintyEvaluator for ConstantUncertainty {
    fn relative_uncertainty(&self, _eta: f64, _corrected_pt: f64) -> f64 {
        self.0
    }
}

/// Shared view of what a `CountingModel` was asked to build
#[derive(Clone, Default)]
pub struct BuildRecorder {
    /// Level names of every corrector build, in order
    pub corrector_builds: Rc<RefCell<Vec<Vec<String>>>>,

    /// Origins of every uncertainty build
    pub uncertainty_builds: Rc<RefCell<Vec<String>>>,

    /// Inputs seen by correctors
    pub corrector_inputs: Rc<RefCell<Vec<CorrectionInputs>>>,
}

impl BuildRecorder {
    pub fn corrector_build_count(&self) -> usize {
        self.corrector_builds.borrow().len()
    }

    pub fn uncertainty_build_count(&self) -> usize {
        self.uncertainty_builds.borrow().len()
    }

    pub fn last_levels(&self) -> Vec<String> {
        self.corrector_builds
            .borrow()
            .last()
            .cloned()
            .unwrap_or_default()
    }
}

/// Correction model that interprets each level's content as a number
///
/// The corrector factor is the product of all level contents; the
/// uncertainty is the content itself. Non-numeric content fails the build.
pub struct CountingModel {
    pub recorder: BuildRecorder,
}

impl CountingModel {
    /// Model plus a handle that stays readable after the model is boxed
    pub fn with_recorder() -> (Self, BuildRecorder) {
        let recorder = BuildRecorder::default();
        (
            Self {
                recorder: recorder.clone(),
            },
            recorder,
        )
    }
}

fn parse_number(params: &LevelParameters) -> Result<f64, String> {
    params
        .content
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("level {}: {}", params.level, e))
}

impl CorrectionModel for CountingModel {
    fn build_corrector(&self, levels: &[LevelParameters]) -> Result<Box<dyn Corrector>, String> {
        let mut factor = 1.0;
        for params in levels {
            factor *= parse_number(params)?;
        }
        self.recorder
            .corrector_builds
            .borrow_mut()
            .push(levels.iter().map(|p| p.level.clone()).collect());
        Ok(Box::new(ProductCorrector {
            factor,
            seen: self.recorder.corrector_inputs.clone(),
        }))
    }

    fn build_uncertainty(
        &self,
        parameters: &LevelParameters,
    ) -> Result<Box<dyn UncertaintyEvaluator>, String> {
        let value = parse_number(parameters)?;
        self.recorder
            .uncertainty_builds
            .borrow_mut()
            .push(parameters.origin.to_string());
        Ok(Box::new(ConstantUncertainty(value)))
    }
}

// ============================================================================
// File fixtures
// ============================================================================

pub fn write_file(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

/// Uniform-binned grid object
pub fn grid_object(
    name: &str,
    x: (usize, f64, f64),
    y: (usize, f64, f64),
    values: Vec<f64>,
) -> StoredObject {
    StoredObject {
        name: name.to_string(),
        kind: "TH2D".to_string(),
        x_axis: Some(AxisSpec::Uniform {
            bins: x.0,
            min: x.1,
            max: x.2,
        }),
        y_axis: Some(AxisSpec::Uniform {
            bins: y.0,
            min: y.1,
            max: y.2,
        }),
        values,
    }
}

/// 2 x 2 map over eta [-5, 5] and phi [-pi, pi] with one bad cell at
/// (eta < 0, phi < 0).
pub fn standard_grid(name: &str) -> StoredObject {
    grid_object(
        name,
        (2, -5.0, 5.0),
        (2, -3.1416, 3.1416),
        vec![0.0, 1.0, 1.0, 1.0],
    )
}

pub fn write_vmap(dir: &Path, name: &str, objects: Vec<StoredObject>) -> String {
    let container = MapContainer { objects };
    write_file(dir, name, &container.to_json_string().unwrap())
}
