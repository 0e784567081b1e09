//! # Engine Configuration
//!
//! The few knobs that may differ between deployments. Detection and scoring
//! thresholds are constants in their own modules and are not configurable.
//!
//! Configuration is stored as JSON, every field is optional and falls back to
//! its default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::pitch::FRAME_SIZE;
use crate::tuning::A4_FREQUENCY;

/// Settings for the offline dominant-note scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DominantNoteConfig {
    /// Samples per analysed frame.
    pub frame_size: usize,
    /// Samples between the starts of consecutive frames.
    pub hop_size: usize,
    /// Only the first `max_seconds` of the track are scanned.
    pub max_seconds: f32,
}

impl Default for DominantNoteConfig {
    fn default() -> Self {
        Self {
            frame_size: FRAME_SIZE,
            hop_size: FRAME_SIZE / 2,
            max_seconds: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Static target used when neither a reference track nor a key is available.
    pub default_target_hz: f32,
    /// Ticks kept for the live graph.
    pub history_capacity: usize,
    pub dominant_note: DominantNoteConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_target_hz: A4_FREQUENCY,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            dominant_note: DominantNoteConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::debug!("Loaded engine config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.default_target_hz.is_finite() && self.default_target_hz > 0.0) {
            return Err(invalid(
                "default_target_hz",
                format!("must be positive and finite, got {}", self.default_target_hz),
            ));
        }
        if self.history_capacity == 0 {
            return Err(invalid("history_capacity", "must be at least 1".into()));
        }
        let scan = &self.dominant_note;
        if scan.frame_size < 2 {
            return Err(invalid(
                "dominant_note.frame_size",
                format!("must be at least 2, got {}", scan.frame_size),
            ));
        }
        if scan.hop_size == 0 {
            return Err(invalid("dominant_note.hop_size", "must be at least 1".into()));
        }
        if !(scan.max_seconds.is_finite() && scan.max_seconds > 0.0) {
            return Err(invalid(
                "dominant_note.max_seconds",
                format!("must be positive and finite, got {}", scan.max_seconds),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_target_hz, 440.0);
        assert_eq!(config.history_capacity, 200);
        assert_eq!(config.dominant_note.frame_size, 2048);
        assert_eq!(config.dominant_note.hop_size, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = EngineConfig::from_json_str(r#"{"history_capacity": 64}"#).unwrap();
        assert_eq!(config.history_capacity, 64);
        assert_eq!(config.default_target_hz, 440.0);

        let config =
            EngineConfig::from_json_str(r#"{"dominant_note": {"max_seconds": 5.0}}"#).unwrap();
        assert_eq!(config.dominant_note.max_seconds, 5.0);
        assert_eq!(config.dominant_note.hop_size, 1024);
    }

    #[test]
    fn rejects_invalid_fields() {
        let err = EngineConfig::from_json_str(r#"{"default_target_hz": 0.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "default_target_hz", .. }));

        let err = EngineConfig::from_json_str(r#"{"history_capacity": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "history_capacity", .. }));

        let err = EngineConfig::from_json_str(r#"{"dominant_note": {"hop_size": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "dominant_note.hop_size", .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = EngineConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn json_round_trip() {
        let config = EngineConfig {
            default_target_hz: 261.63,
            ..EngineConfig::default()
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(EngineConfig::from_json_str(&json).unwrap(), config);
    }
}
