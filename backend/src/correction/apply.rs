//! Per-object correction application

use crate::correction::model::{Corrector, UncertaintyEvaluator};
use crate::correction::uncertainty::clamp_uncertainty;

/// Momentum floor for uncertainty lookups, avoids low-momentum extrapolation
pub const UNCERTAINTY_MIN_PT: f64 = 1.0;

/// Inputs describing one object for the correction model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionInputs {
    /// Ambient energy density of the event
    pub density: f64,
    pub area: f64,
    pub raw_pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub raw_energy: f64,
    /// Reconstructed vertex count, `None` when the record lacks one
    pub vertex_count: Option<u32>,
}

impl CorrectionInputs {
    /// Inputs as handed to the corrector: density clamped at 0.
    pub fn sanitized(&self) -> CorrectionInputs {
        CorrectionInputs {
            density: self.density.max(0.0),
            ..*self
        }
    }
}

/// Result of correcting one object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionOutput {
    pub factor: f64,
    pub corrected_pt: f64,
    pub relative_uncertainty: f64,
    /// `1 + relative_uncertainty`
    pub up_factor: f64,
    /// `max(0, 1 - relative_uncertainty)`
    pub down_factor: f64,
}

impl CorrectionOutput {
    /// Output for an object left uncorrected.
    pub fn identity(raw_pt: f64) -> Self {
        Self {
            factor: 1.0,
            corrected_pt: raw_pt,
            relative_uncertainty: 0.0,
            up_factor: 1.0,
            down_factor: 1.0,
        }
    }
}

/// Correct one object.
///
/// Without a corrector the factor is 1 and the momentum is unchanged. Without
/// an uncertainty evaluator the relative uncertainty is 0.
///
/// # Example
///
/// ```rust
/// use jet_calib_core::correction::{apply_correction, CorrectionInputs};
///
/// let inputs = CorrectionInputs {
///     density: 20.0,
///     area: 0.5,
///     raw_pt: 100.0,
///     eta: 0.3,
///     phi: 1.2,
///     raw_energy: 104.5,
///     vertex_count: Some(30),
/// };
/// let out = apply_correction(None, None, &inputs);
/// assert_eq!(out.factor, 1.0);
/// assert_eq!(out.corrected_pt, 100.0);
/// ```
pub fn apply_correction(
    corrector: Option<&dyn Corrector>,
    uncertainty: Option<&dyn UncertaintyEvaluator>,
    inputs: &CorrectionInputs,
) -> CorrectionOutput {
    let Some(corrector) = corrector else {
        return CorrectionOutput::identity(inputs.raw_pt);
    };

    let factor = corrector.factor(&inputs.sanitized());
    let corrected_pt = inputs.raw_pt * factor;

    let relative_uncertainty = uncertainty
        .map(|unc| {
            clamp_uncertainty(
                unc.relative_uncertainty(inputs.eta, corrected_pt.max(UNCERTAINTY_MIN_PT)),
            )
        })
        .unwrap_or(0.0);

    CorrectionOutput {
        factor,
        corrected_pt,
        relative_uncertainty,
        up_factor: 1.0 + relative_uncertainty,
        down_factor: (1.0 - relative_uncertainty).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Fixed(f64);

    impl Corrector for Fixed {
        fn factor(&self, _inputs: &CorrectionInputs) -> f64 {
            self.0
        }
    }

    struct RecordingUnc {
        value: f64,
        seen_pt: Cell<f64>,
    }

    impl UncertaintyEvaluator for RecordingUnc {
        fn relative_uncertainty(&self, _eta: f64, corrected_pt: f64) -> f64 {
            self.seen_pt.set(corrected_pt);
            self.value
        }
    }

    struct DensitySpy(Cell<f64>);

    impl Corrector for DensitySpy {
        fn factor(&self, inputs: &CorrectionInputs) -> f64 {
            self.0.set(inputs.density);
            1.0
        }
    }

    fn inputs(raw_pt: f64) -> CorrectionInputs {
        CorrectionInputs {
            density: 15.0,
            area: 0.5,
            raw_pt,
            eta: 1.1,
            phi: -0.4,
            raw_energy: raw_pt * 1.7,
            vertex_count: Some(40),
        }
    }

    #[test]
    fn test_factor_scales_momentum() {
        let out = apply_correction(Some(&Fixed(1.05)), None, &inputs(100.0));
        assert_eq!(out.factor, 1.05);
        assert!((out.corrected_pt - 105.0).abs() < 1e-9);
        assert_eq!(out.relative_uncertainty, 0.0);
        assert_eq!(out.up_factor, 1.0);
        assert_eq!(out.down_factor, 1.0);
    }

    #[test]
    fn test_up_down_factors() {
        let unc = RecordingUnc {
            value: 0.03,
            seen_pt: Cell::new(0.0),
        };
        let out = apply_correction(Some(&Fixed(1.0)), Some(&unc), &inputs(50.0));
        assert!((out.up_factor - 1.03).abs() < 1e-12);
        assert!((out.down_factor - 0.97).abs() < 1e-12);
    }

    #[test]
    fn test_down_factor_never_negative() {
        let unc = RecordingUnc {
            value: 1.4,
            seen_pt: Cell::new(0.0),
        };
        let out = apply_correction(Some(&Fixed(1.0)), Some(&unc), &inputs(50.0));
        assert_eq!(out.down_factor, 0.0);
    }

    #[test]
    fn test_uncertainty_momentum_floor() {
        let unc = RecordingUnc {
            value: 0.1,
            seen_pt: Cell::new(0.0),
        };
        apply_correction(Some(&Fixed(0.5)), Some(&unc), &inputs(0.6));
        assert_eq!(unc.seen_pt.get(), UNCERTAINTY_MIN_PT);
    }

    #[test]
    fn test_negative_density_clamped() {
        let spy = DensitySpy(Cell::new(f64::NAN));
        let mut input = inputs(30.0);
        input.density = -999.0;
        apply_correction(Some(&spy), None, &input);
        assert_eq!(spy.0.get(), 0.0);
    }

    #[test]
    fn test_sanitized_keeps_vertex_count() {
        let mut input = inputs(30.0);
        assert_eq!(input.sanitized().vertex_count, Some(40));
        input.vertex_count = None;
        input.density = -1.0;
        let sanitized = input.sanitized();
        assert_eq!(sanitized.vertex_count, None);
        assert_eq!(sanitized.density, 0.0);
    }
}
