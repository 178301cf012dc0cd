//! Runtime configuration.
//!
//! Every field has a default, so a partial JSON file (or none at all) is
//! a valid configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::StowageError;

/// Charge fractions and timing for EVA suit upkeep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaThresholds {
    /// Below this a consumable is swapped when a replacement is at hand.
    pub normal: f64,
    /// Below this the search widens to owned docked vessels and the helmet
    /// may come off.
    pub emergency: f64,
    /// Minimum charge of a replacement.
    pub replacement_min: f64,
    /// Seconds between checks for one character.
    pub cooldown_secs: f64,
}

impl Default for EvaThresholds {
    fn default() -> Self {
        Self {
            normal: 0.25,
            emergency: 0.05,
            replacement_min: 0.5,
            cooldown_secs: 30.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StowageConfig {
    /// Emit per-candidate hauling diagnostics at debug level.
    pub debug_logging: bool,
    /// Maximum hits returned by the definition search.
    pub search_limit: usize,
    pub eva: EvaThresholds,
}

impl Default for StowageConfig {
    fn default() -> Self {
        Self {
            debug_logging: false,
            search_limit: 50,
            eva: EvaThresholds::default(),
        }
    }
}

impl StowageConfig {
    pub fn from_json_str(json: &str) -> Result<Self, StowageError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, StowageError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = StowageConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StowageConfig::default());
        assert_eq!(config.search_limit, 50);
        assert_eq!(config.eva.cooldown_secs, 30.0);
    }

    #[test]
    fn partial_eva_section_keeps_other_defaults() {
        let config =
            StowageConfig::from_json_str(r#"{"debug_logging":true,"eva":{"emergency":0.1}}"#)
                .unwrap();
        assert!(config.debug_logging);
        assert_eq!(config.eva.emergency, 0.1);
        assert_eq!(config.eva.normal, 0.25);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            StowageConfig::from_json_str("{"),
            Err(StowageError::Json(_))
        ));
    }
}
