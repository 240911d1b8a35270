//! Region-exclusion maps
//!
//! - **grid**: binned 2-D grid
//! - **axes**: pseudorapidity/azimuth role detection
//! - **container**: native `.vmap` container and named grid lookup
//! - **cache**: run-keyed map cache and point queries

pub mod axes;
pub mod cache;
pub mod container;
pub mod grid;

pub use axes::{detect_roles, looks_like_eta, looks_like_phi, AxisId, AxisRoles};
pub use cache::{VetoLoadError, VetoMap, VetoMapCache, VetoTransition, GOOD_CELL_THRESHOLD};
pub use container::{
    AxisSpec, LookupStep, MapContainer, MapFormat, StoredObject, CANONICAL_MAP_NAME,
    FALLBACK_MAP_NAMES,
};
pub use grid::{Axis, Grid2D};
