//! Conditions-snapshot providers
//!
//! A conditions snapshot is a versioned parameter bundle addressed by
//! `(payload name, level name)`. The engine only needs keyed lookup.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::correction::model::{LevelParameters, ParameterOrigin};
use crate::error::CalibrationError;

/// Keyed access to a conditions snapshot
pub trait ConditionsProvider {
    /// Fetch the parameters stored for `level` under `payload`, if any.
    fn fetch(&self, payload: &str, level: &str) -> Option<LevelParameters>;
}

#[derive(Debug, Deserialize)]
struct SnapshotDocument {
    #[serde(default)]
    payloads: HashMap<String, HashMap<String, String>>,
}

/// Snapshot held in memory, loaded from a JSON document
///
/// ```json
/// { "payloads": { "AK4PFPuppi": { "L1FastJet": "...", "Uncertainty": "..." } } }
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonConditionsSnapshot {
    payloads: HashMap<String, HashMap<String, String>>,
}

impl JsonConditionsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, CalibrationError> {
        let doc: SnapshotDocument = serde_json::from_str(json)
            .map_err(|e| CalibrationError::ConfigParse(format!("conditions snapshot: {}", e)))?;
        Ok(Self {
            payloads: doc.payloads,
        })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CalibrationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| CalibrationError::ParameterFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&text)
    }

    /// Insert or replace one level of a payload.
    pub fn insert(&mut self, payload: &str, level: &str, content: impl Into<String>) {
        self.payloads
            .entry(payload.to_string())
            .or_default()
            .insert(level.to_string(), content.into());
    }

    /// Level names present for a payload, sorted.
    pub fn levels(&self, payload: &str) -> Vec<String> {
        let mut levels: Vec<String> = self
            .payloads
            .get(payload)
            .map(|levels| levels.keys().cloned().collect())
            .unwrap_or_default();
        levels.sort();
        levels
    }
}

impl ConditionsProvider for JsonConditionsSnapshot {
    fn fetch(&self, payload: &str, level: &str) -> Option<LevelParameters> {
        let content = self.payloads.get(payload)?.get(level)?;
        Some(LevelParameters::new(
            level,
            ParameterOrigin::Snapshot {
                payload: payload.to_string(),
            },
            content.clone(),
        ))
    }
}
