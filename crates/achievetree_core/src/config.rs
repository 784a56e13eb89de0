//! Editor tuning configuration.
//!
//! # Responsibility
//! - Group the numeric constants of layout, camera, history and shrinking.
//! - Load overrides from JSON (string or file) with per-field defaults.
//!
//! # Invariants
//! - `EditorConfig::default()` reproduces the built-in editor behavior.
//! - Unknown keys are rejected so typos surface instead of being ignored.
//! - Loaded configs are validated before use.

use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::store::shrink::DEFAULT_TITLE_MAX_CHARS;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Errors from configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io(std::io::Error),
    /// Config text is not valid JSON for [`EditorConfig`].
    Parse(serde_json::Error),
    /// A value is outside its supported range.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Layout spacing units.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Distance between adjacent siblings (vertical axis).
    pub sibling_spacing: f64,
    /// Distance between depth levels (horizontal axis).
    pub depth_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            sibling_spacing: 96.0,
            depth_spacing: 256.0,
        }
    }
}

/// Camera easing, momentum and zoom constants.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// Per-frame interpolation factor for translation.
    pub translate_ease: f64,
    /// Per-frame interpolation factor for scale.
    pub scale_ease: f64,
    /// Per-frame momentum decay multiplier.
    pub momentum_decay: f64,
    /// Velocity magnitude below which momentum stops.
    pub momentum_threshold: f64,
    /// Exponential zoom factor per wheel delta unit.
    pub wheel_zoom_rate: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Distance under which `current` snaps onto `target`.
    pub settle_epsilon: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            translate_ease: 0.22,
            scale_ease: 0.18,
            momentum_decay: 0.9,
            momentum_threshold: 0.05,
            wheel_zoom_rate: 0.0014,
            min_scale: 0.25,
            max_scale: 2.8,
            settle_epsilon: 0.01,
        }
    }
}

/// Shrink-to-budget parameters for share URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShrinkConfig {
    /// Title length kept by the lossy truncation step.
    pub title_max_chars: usize,
    /// Maximum share query length before shrinking kicks in.
    pub url_budget: usize,
}

impl Default for ShrinkConfig {
    fn default() -> Self {
        Self {
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
            url_budget: 2000,
        }
    }
}

/// Complete editor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub layout: LayoutConfig,
    pub camera: CameraConfig,
    /// Maximum undo steps kept.
    pub history_limit: usize,
    pub shrink: ShrinkConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            camera: CameraConfig::default(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            shrink: ShrinkConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Parses and validates a JSON config. Missing fields keep defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.layout.sibling_spacing > 0.0 && self.layout.depth_spacing > 0.0) {
            return Err(ConfigError::Invalid(
                "layout spacing must be positive".to_string(),
            ));
        }
        let camera = &self.camera;
        for (name, value) in [
            ("translate_ease", camera.translate_ease),
            ("scale_ease", camera.scale_ease),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::Invalid(format!(
                    "camera.{name} must be in (0, 1], got {value}"
                )));
            }
        }
        if !(camera.momentum_decay >= 0.0 && camera.momentum_decay < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.momentum_decay must be in [0, 1), got {}",
                camera.momentum_decay
            )));
        }
        if !(camera.min_scale > 0.0 && camera.min_scale <= camera.max_scale) {
            return Err(ConfigError::Invalid(format!(
                "camera scale range [{}, {}] is empty or non-positive",
                camera.min_scale, camera.max_scale
            )));
        }
        if camera.momentum_threshold < 0.0 || camera.settle_epsilon <= 0.0 {
            return Err(ConfigError::Invalid(
                "camera thresholds must be positive".to_string(),
            ));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid(
                "history_limit must be at least 1".to_string(),
            ));
        }
        if self.shrink.title_max_chars < 4 {
            return Err(ConfigError::Invalid(
                "shrink.title_max_chars must be at least 4".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, EditorConfig};

    #[test]
    fn defaults_are_valid() {
        EditorConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = EditorConfig::from_json_str(r#"{"camera":{"max_scale":4.0}}"#).unwrap();
        assert_eq!(config.camera.max_scale, 4.0);
        assert_eq!(config.camera.min_scale, 0.25);
        assert_eq!(config.layout.depth_spacing, 256.0);
        assert_eq!(config.history_limit, 50);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = EditorConfig::from_json_str(r#"{"histroy_limit":3}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = EditorConfig::from_json_str(r#"{"camera":{"momentum_decay":1.5}}"#).unwrap_err();
        assert!(err.to_string().contains("momentum_decay"));
    }
}
