//! Upstream record types
//!
//! One [`EventRecord`] per detector event, as delivered by the record source.
//! Secondary inputs may be absent; the orchestrator substitutes sentinels.

use serde::{Deserialize, Serialize};

/// Raw reconstructed object before calibration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawObject {
    pub pt: f64,
    pub eta: f64,
    pub phi: f64,
    pub mass: f64,
    pub area: f64,
}

impl RawObject {
    /// Energy from (pt, eta, mass).
    pub fn energy(&self) -> f64 {
        energy_from(self.pt, self.eta, self.mass)
    }
}

/// Energy of an object with transverse momentum `pt`, pseudorapidity `eta`
/// and mass `mass`.
pub fn energy_from(pt: f64, eta: f64, mass: f64) -> f64 {
    let p = pt * eta.cosh();
    (p * p + mass * mass).sqrt()
}

/// One event from the upstream record source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub run: u32,
    pub lumi: u32,
    pub event: u64,
    pub is_data: bool,

    /// Ambient energy density
    #[serde(default)]
    pub density: Option<f64>,

    /// Number of reconstructed primary vertices
    #[serde(default)]
    pub vertex_count: Option<u32>,

    /// Primary object collection; `None` when the collection is missing
    #[serde(default)]
    pub objects: Option<Vec<RawObject>>,
}

impl EventRecord {
    pub fn new(run: u32, event: u64, is_data: bool) -> Self {
        Self {
            run,
            lumi: 0,
            event,
            is_data,
            density: None,
            vertex_count: None,
            objects: None,
        }
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = Some(density);
        self
    }

    pub fn with_vertex_count(mut self, count: u32) -> Self {
        self.vertex_count = Some(count);
        self
    }

    pub fn with_objects(mut self, objects: Vec<RawObject>) -> Self {
        self.objects = Some(objects);
        self
    }
}
