//! Run-keyed exclusion map cache
//!
//! The active map file is picked per run from a [`RunRangeTable`]. The map is
//! reloaded only when the matched directive changes; a file that cannot be
//! used leaves the cache empty (nothing vetoed) until the directive changes
//! again.

use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::core::RunRangeTable;
use crate::veto::axes::{detect_roles, to_axis_azimuth, AxisId, AxisRoles};
use crate::veto::container::{LookupStep, MapContainer, MapFormat};
use crate::veto::grid::Grid2D;

/// Cell values below this are "bad" regions.
pub const GOOD_CELL_THRESHOLD: f64 = 0.5;

/// Reasons a map file yields no usable map
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VetoLoadError {
    #[error("cannot read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("malformed map container {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("unsupported map format '{format}' for {path}")]
    UnsupportedFormat { path: String, format: &'static str },

    #[error("no 2-D grid found in {path}")]
    NoGrid { path: String },
}

/// Loaded exclusion map with its detected axis roles
#[derive(Debug, Clone, PartialEq)]
pub struct VetoMap {
    grid: Grid2D,
    roles: AxisRoles,
    path: String,
    object_name: String,
    lookup: LookupStep,
}

impl VetoMap {
    /// Load a map file. Only the native `.vmap` container is evaluated.
    pub fn load(path: &str) -> Result<Self, VetoLoadError> {
        let format = MapFormat::detect(path);
        if format != MapFormat::Native {
            return Err(VetoLoadError::UnsupportedFormat {
                path: path.to_string(),
                format: format.as_str(),
            });
        }

        let text = std::fs::read_to_string(Path::new(path)).map_err(|e| {
            VetoLoadError::Unreadable {
                path: path.to_string(),
                reason: e.to_string(),
            }
        })?;
        let container =
            MapContainer::from_json_str(&text).map_err(|e| VetoLoadError::Malformed {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        let located = container.locate_grid().ok_or_else(|| VetoLoadError::NoGrid {
            path: path.to_string(),
        })?;

        let mut map = Self::from_grid(located.grid, path);
        map.object_name = located.name;
        map.lookup = located.step;
        Ok(map)
    }

    /// Wrap an in-memory grid; roles are detected from its axis ranges.
    pub fn from_grid(grid: Grid2D, path: &str) -> Self {
        let roles = detect_roles(grid.x.range(), grid.y.range());
        Self {
            grid,
            roles,
            path: path.to_string(),
            object_name: String::new(),
            lookup: LookupStep::FirstCompatible,
        }
    }

    /// Veto flag at (eta, phi): 1 in a bad cell, 0 in a good cell or outside
    /// the map.
    pub fn flag(&self, eta: f64, phi: f64) -> u8 {
        let phi_axis = match self.roles.phi {
            AxisId::X => &self.grid.x,
            AxisId::Y => &self.grid.y,
        };
        let (phi_min, phi_max) = phi_axis.range();
        let phi = to_axis_azimuth(phi, phi_min, phi_max);

        let (x, y) = if self.roles.is_swapped() {
            (phi, eta)
        } else {
            (eta, phi)
        };

        match self.grid.value_at(x, y) {
            Some(value) if value < GOOD_CELL_THRESHOLD => 1,
            _ => 0,
        }
    }

    pub fn grid(&self) -> &Grid2D {
        &self.grid
    }

    pub fn roles(&self) -> AxisRoles {
        self.roles
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Container object the grid was read from
    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    pub fn lookup(&self) -> LookupStep {
        self.lookup
    }
}

/// Outcome of a cache refresh
#[derive(Debug, Clone, PartialEq)]
pub enum VetoTransition {
    /// Same directive as before; nothing done
    Unchanged,

    /// New directive, map loaded
    Loaded { key: String },

    /// New directive, map unusable; cache left empty
    Failed { key: String, error: VetoLoadError },

    /// No directive applies to the run; previous map dropped
    Cleared,
}

/// Holds at most one map, keyed by the directive that selected it
#[derive(Debug, Clone, Default)]
pub struct VetoMapCache {
    key: Option<String>,
    map: Option<VetoMap>,
    loads: usize,
}

impl VetoMapCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the cache hold the map for `run`.
    ///
    /// The key is recorded even when loading fails, so a broken file is
    /// attempted once per transition rather than once per event.
    pub fn ensure_current(&mut self, run: u32, table: &RunRangeTable) -> VetoTransition {
        let Some(matched) = table.resolve(run) else {
            if self.key.is_none() && self.map.is_none() {
                return VetoTransition::Unchanged;
            }
            self.key = None;
            self.map = None;
            info!(run, "no exclusion map applies to run; map cleared");
            return VetoTransition::Cleared;
        };

        if self.key.as_deref() == Some(matched.key.as_str()) {
            return VetoTransition::Unchanged;
        }

        self.map = None;
        self.key = Some(matched.key.clone());
        self.loads += 1;

        match VetoMap::load(&matched.payload) {
            Ok(map) => {
                info!(
                    run,
                    path = %map.path(),
                    object = %map.object_name(),
                    swapped_axes = map.roles().is_swapped(),
                    x_range = ?map.grid().x.range(),
                    y_range = ?map.grid().y.range(),
                    "exclusion map loaded"
                );
                self.map = Some(map);
                VetoTransition::Loaded { key: matched.key }
            }
            Err(error) => {
                warn!(run, %error, "exclusion map unavailable; nothing will be vetoed");
                VetoTransition::Failed {
                    key: matched.key,
                    error,
                }
            }
        }
    }

    /// Veto flag at (eta, phi); 0 when no map is loaded.
    pub fn query(&self, eta: f64, phi: f64) -> u8 {
        self.map.as_ref().map_or(0, |m| m.flag(eta, phi))
    }

    pub fn map(&self) -> Option<&VetoMap> {
        self.map.as_ref()
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Number of load attempts so far
    pub fn load_count(&self) -> usize {
        self.loads
    }
}
