//! Calibrated output records

use serde::{Deserialize, Serialize};

/// Density written when the record carries none
pub const MISSING_DENSITY: f64 = -999.0;

/// One calibrated object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectOutput {
    pub raw_pt: f64,
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub mass: f64,
    pub energy: f64,
    pub factor: f64,
    pub relative_uncertainty: f64,
    pub up_factor: f64,
    pub down_factor: f64,
    pub veto: u8,
}

/// Per-event output
///
/// [`EventOutput::default`] is the sentinel record emitted when an event
/// carries no object collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOutput {
    pub run: u32,
    pub lumi: u32,
    pub event: u64,
    pub density: f64,
    pub vertex_count: u32,

    /// Ordered by corrected transverse momentum, descending
    pub objects: Vec<ObjectOutput>,

    /// Emitted objects flagged by the exclusion map
    pub vetoed_count: usize,
}

impl Default for EventOutput {
    fn default() -> Self {
        Self {
            run: 0,
            lumi: 0,
            event: 0,
            density: MISSING_DENSITY,
            vertex_count: 0,
            objects: Vec::new(),
            vetoed_count: 0,
        }
    }
}

impl EventOutput {
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
