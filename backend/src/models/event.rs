//! Calibration event log
//!
//! Records every state transition of the job's calibration caches so tests and
//! downstream tooling can audit what was built, when, and from which source.
//!
//! # Event Types
//!
//! - **Selection**: data/simulation bundle frozen on the first record
//! - **Corrector**: correction evaluator (re)built for a new cache key, or the
//!   requested residual layer found unavailable
//! - **Uncertainty**: uncertainty source resolved, or found unavailable
//! - **Veto map**: map loaded, unusable, or cleared on a run transition
//!
//! # Example
//!
//! ```rust
//! use jet_calib_core::models::{CalibrationEvent, CalibrationLog};
//!
//! let mut log = CalibrationLog::new();
//! log.log(CalibrationEvent::VetoMapCleared { run: 362_000 });
//!
//! assert_eq!(log.events_of_type("VetoMapCleared").len(), 1);
//! assert_eq!(log.events_for_run(362_000).len(), 1);
//! ```

/// State transition of the calibration caches.
///
/// All events carry the run number of the record that triggered them.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationEvent {
    /// Flavor bundle frozen
    FlavorSelected { run: u32, flavor: String },

    /// Correction evaluator built (or found disabled) for a new key
    CorrectorBuilt {
        run: u32,
        key: String,
        levels: Vec<String>,
        residual_source: String,
    },

    /// Requested residual layer unavailable from every source; reported once
    ResidualUnavailable { run: u32, level: String },

    /// Uncertainty evaluator resolved
    UncertaintyResolved { run: u32, source: String },

    /// No uncertainty source; zero uncertainty for the job
    UncertaintyUnavailable { run: u32 },

    /// Exclusion map loaded for a new directive
    VetoMapLoaded {
        run: u32,
        path: String,
        object: String,
        swapped_axes: bool,
    },

    /// Exclusion map directive changed but the file was unusable
    VetoMapUnavailable { run: u32, key: String, reason: String },

    /// No directive matched the run
    VetoMapCleared { run: u32 },
}

impl CalibrationEvent {
    pub fn run(&self) -> u32 {
        match self {
            CalibrationEvent::FlavorSelected { run, .. } => *run,
            CalibrationEvent::CorrectorBuilt { run, .. } => *run,
            CalibrationEvent::ResidualUnavailable { run, .. } => *run,
            CalibrationEvent::UncertaintyResolved { run, .. } => *run,
            CalibrationEvent::UncertaintyUnavailable { run } => *run,
            CalibrationEvent::VetoMapLoaded { run, .. } => *run,
            CalibrationEvent::VetoMapUnavailable { run, .. } => *run,
            CalibrationEvent::VetoMapCleared { run } => *run,
        }
    }

    /// Short name of the event kind
    pub fn event_type(&self) -> &'static str {
        match self {
            CalibrationEvent::FlavorSelected { .. } => "FlavorSelected",
            CalibrationEvent::CorrectorBuilt { .. } => "CorrectorBuilt",
            CalibrationEvent::ResidualUnavailable { .. } => "ResidualUnavailable",
            CalibrationEvent::UncertaintyResolved { .. } => "UncertaintyResolved",
            CalibrationEvent::UncertaintyUnavailable { .. } => "UncertaintyUnavailable",
            CalibrationEvent::VetoMapLoaded { .. } => "VetoMapLoaded",
            CalibrationEvent::VetoMapUnavailable { .. } => "VetoMapUnavailable",
            CalibrationEvent::VetoMapCleared { .. } => "VetoMapCleared",
        }
    }
}

/// Ordered log of calibration events.
#[derive(Debug, Clone, Default)]
pub struct CalibrationLog {
    events: Vec<CalibrationEvent>,
}

impl CalibrationLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn log(&mut self, event: CalibrationEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[CalibrationEvent] {
        &self.events
    }

    /// Events triggered by records of a specific run
    pub fn events_for_run(&self, run: u32) -> Vec<&CalibrationEvent> {
        self.events.iter().filter(|e| e.run() == run).collect()
    }

    /// Events of a specific kind
    pub fn events_of_type(&self, event_type: &str) -> Vec<&CalibrationEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
