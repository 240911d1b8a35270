//! Native exclusion-map container
//!
//! A `.vmap` file is a JSON directory of named objects. Only 2-D grids are
//! usable as exclusion maps; other objects (1-D histograms, metadata) may sit
//! alongside them.
//!
//! ```json
//! {
//!   "objects": [
//!     { "name": "jetvetomap", "kind": "TH2D",
//!       "xAxis": { "bins": 82, "min": -5.191, "max": 5.191 },
//!       "yAxis": { "bins": 72, "min": -3.1416, "max": 3.1416 },
//!       "values": [ ... 82 * 72 entries, x fastest ... ] }
//!   ]
//! }
//! ```
//!
//! Grid lookup order: the canonical name, then the known fallback names, then
//! the first compatible 2-D object in directory order.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::veto::grid::{Axis, Grid2D};

/// Preferred object name
pub const CANONICAL_MAP_NAME: &str = "jetvetomap";

/// Names tried, in order, when the canonical object is absent
pub const FALLBACK_MAP_NAMES: [&str; 9] = [
    "jetvetomap_all",
    "jetvetomap_hotandcold",
    "jetvetomap_hot",
    "jetvetomap_cold",
    "jetvetomap_bpix",
    "jetvetomap_fpix",
    "vetoMap",
    "h2",
    "hJetVeto",
];

/// Object kinds that carry a 2-D grid
pub const GRID_KINDS: [&str; 4] = ["grid2d", "TH2F", "TH2D", "TH2I"];

/// On-disk format of a map file, judged by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapFormat {
    /// Native `.vmap` container
    Native,

    /// Correction-rule JSON, not evaluated by this engine
    CorrectionJson,

    Unknown,
}

impl MapFormat {
    pub fn detect(path: &str) -> Self {
        let extension = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("vmap") => MapFormat::Native,
            Some("json") => MapFormat::CorrectionJson,
            _ => MapFormat::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MapFormat::Native => "native",
            MapFormat::CorrectionJson => "correction-json",
            MapFormat::Unknown => "unknown",
        }
    }
}

/// Axis definition as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisSpec {
    Uniform { bins: usize, min: f64, max: f64 },
    Edges { edges: Vec<f64> },
}

impl AxisSpec {
    /// Declared bin count, without building the axis.
    pub fn bins(&self) -> Option<usize> {
        match self {
            AxisSpec::Uniform { bins, .. } => Some(*bins),
            AxisSpec::Edges { edges } => edges.len().checked_sub(1),
        }
    }

    pub fn to_axis(&self) -> Option<Axis> {
        match self {
            AxisSpec::Uniform { bins, min, max } => Axis::uniform(*bins, *min, *max),
            AxisSpec::Edges { edges } => Axis::from_edges(edges.clone()),
        }
    }
}

/// One named object in the container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub name: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<AxisSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_axis: Option<AxisSpec>,
    #[serde(default)]
    pub values: Vec<f64>,
}

impl StoredObject {
    /// View the object as a 2-D grid, if it is structurally one.
    pub fn as_grid(&self) -> Option<Grid2D> {
        if !GRID_KINDS.contains(&self.kind.as_str()) {
            return None;
        }
        let x_spec = self.x_axis.as_ref()?;
        let y_spec = self.y_axis.as_ref()?;
        // Declared shape must match the stored cells before any axis is built
        let cells = x_spec.bins()?.checked_mul(y_spec.bins()?)?;
        if cells != self.values.len() {
            return None;
        }
        Grid2D::new(x_spec.to_axis()?, y_spec.to_axis()?, self.values.clone())
    }
}

/// How the grid was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStep {
    Canonical,
    Fallback,
    FirstCompatible,
}

/// Grid picked from a container
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedGrid {
    pub name: String,
    pub step: LookupStep,
    pub grid: Grid2D,
}

/// Object directory of a native map file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapContainer {
    #[serde(default)]
    pub objects: Vec<StoredObject>,
}

impl MapContainer {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// First object with this name.
    pub fn get(&self, name: &str) -> Option<&StoredObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    /// Run the lookup chain; first success wins.
    pub fn locate_grid(&self) -> Option<LocatedGrid> {
        let by_name = |name: &str, step: LookupStep| {
            self.get(name).and_then(StoredObject::as_grid).map(|grid| LocatedGrid {
                name: name.to_string(),
                step,
                grid,
            })
        };

        if let Some(found) = by_name(CANONICAL_MAP_NAME, LookupStep::Canonical) {
            return Some(found);
        }

        if let Some(found) = FALLBACK_MAP_NAMES
            .iter()
            .find_map(|name| by_name(name, LookupStep::Fallback))
        {
            return Some(found);
        }

        self.objects.iter().find_map(|object| {
            object.as_grid().map(|grid| LocatedGrid {
                name: object.name.clone(),
                step: LookupStep::FirstCompatible,
                grid,
            })
        })
    }
}
