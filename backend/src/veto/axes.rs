//! Axis-role heuristics
//!
//! Exclusion maps are not guaranteed to store pseudorapidity on the first
//! axis. Roles are inferred from the axis ranges once per load:
//!
//! ```text
//! pseudorapidity-like:  min <= -4 and max >= 4
//! azimuth-like:         [-pi, pi]  ~ min in [-3.5, -3.0], max in [3.0, 3.5]
//!                       [0, 2pi]   ~ min >= -0.2, max in (5.8, 6.6)
//! ```
//!
//! Default is first axis = pseudorapidity, second = azimuth. The roles are
//! swapped only when the first axis looks azimuth-like AND the second looks
//! pseudorapidity-like.

use std::f64::consts::TAU;

/// Which grid axis a role was assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisId {
    X,
    Y,
}

/// Pseudorapidity-like range.
pub fn looks_like_eta(min: f64, max: f64) -> bool {
    min <= -4.0 && max >= 4.0
}

/// Azimuth-like range in either convention.
pub fn looks_like_phi(min: f64, max: f64) -> bool {
    let symmetric = (-3.5..=-3.0).contains(&min) && (3.0..=3.5).contains(&max);
    let positive = min >= -0.2 && max > 5.8 && max < 6.6;
    symmetric || positive
}

/// Whether an azimuth axis uses the `[0, 2pi]` convention.
pub fn uses_positive_azimuth(min: f64, max: f64) -> bool {
    min >= -0.2 && max > 5.8
}

/// Axis roles of a loaded map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRoles {
    pub eta: AxisId,
    pub phi: AxisId,
}

impl AxisRoles {
    pub const DEFAULT: AxisRoles = AxisRoles {
        eta: AxisId::X,
        phi: AxisId::Y,
    };

    pub const SWAPPED: AxisRoles = AxisRoles {
        eta: AxisId::Y,
        phi: AxisId::X,
    };

    pub fn is_swapped(&self) -> bool {
        self.eta == AxisId::Y
    }
}

/// Assign roles from the `(min, max)` ranges of the two axes.
pub fn detect_roles(x_range: (f64, f64), y_range: (f64, f64)) -> AxisRoles {
    if looks_like_phi(x_range.0, x_range.1) && looks_like_eta(y_range.0, y_range.1) {
        AxisRoles::SWAPPED
    } else {
        AxisRoles::DEFAULT
    }
}

/// Bring a query azimuth into the convention of an axis spanning `[min, max]`.
///
/// For `[0, 2pi]` axes a negative azimuth is shifted by 2pi and the result is
/// clamped into the axis to absorb edge rounding. Other axes are left alone.
pub fn to_axis_azimuth(phi: f64, min: f64, max: f64) -> f64 {
    if !uses_positive_azimuth(min, max) {
        return phi;
    }
    let wrapped = if phi < 0.0 { phi + TAU } else { phi };
    wrapped.clamp(min, max)
}
