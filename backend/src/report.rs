//! Configuration banners
//!
//! A banner summarises the calibration in effect after a corrector build. The
//! same configuration is reported once per job, however many runs reuse it.

use std::collections::HashSet;
use std::fmt;

use tracing::info;

use crate::correction::model::LevelParameters;

/// Summary of the calibration in effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBanner {
    pub mode: String,
    pub payload: String,
    pub flavor: String,
    /// `(level, origin)` in application order
    pub levels: Vec<(String, String)>,
    pub residual_source: String,
    pub uncertainty_source: String,
}

impl ConfigBanner {
    pub fn new(mode: &str, payload: &str, flavor: &str, levels: &[LevelParameters]) -> Self {
        Self {
            mode: mode.to_string(),
            payload: payload.to_string(),
            flavor: flavor.to_string(),
            levels: levels
                .iter()
                .map(|p| (p.level.clone(), p.origin.to_string()))
                .collect(),
            residual_source: "n/a".to_string(),
            uncertainty_source: "unresolved".to_string(),
        }
    }

    pub fn with_residual_source(mut self, source: &str) -> Self {
        self.residual_source = source.to_string();
        self
    }

    pub fn with_uncertainty_source(mut self, source: &str) -> Self {
        self.uncertainty_source = source.to_string();
        self
    }

    /// Identity used to suppress repeats.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ConfigBanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "calibration configuration")?;
        writeln!(f, "  mode:        {}", self.mode)?;
        if !self.payload.is_empty() {
            writeln!(f, "  payload:     {}", self.payload)?;
        }
        writeln!(f, "  flavor:      {}", self.flavor)?;
        for (i, (level, origin)) in self.levels.iter().enumerate() {
            writeln!(f, "  level[{}]:    {} <- {}", i, level, origin)?;
        }
        writeln!(f, "  residual:    {}", self.residual_source)?;
        write!(f, "  uncertainty: {}", self.uncertainty_source)
    }
}

/// Emits each distinct banner once
#[derive(Debug, Clone, Default)]
pub struct BannerReporter {
    seen: HashSet<String>,
}

impl BannerReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log `banner` unless an identical one was already logged.
    ///
    /// Returns `true` when the banner was emitted.
    pub fn report(&mut self, banner: &ConfigBanner) -> bool {
        if !self.seen.insert(banner.key()) {
            return false;
        }
        info!("{}", banner);
        true
    }

    /// Number of distinct banners emitted
    pub fn emitted(&self) -> usize {
        self.seen.len()
    }
}
