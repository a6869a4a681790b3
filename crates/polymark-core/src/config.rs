//! Engine configuration.

use crate::style::{HandleStyle, PolygonStyle};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables for drawing and editing. Every field has a default, so a config
/// file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// A click closer than this to the first point finishes the polygon.
    /// Measured in scene units; not scaled by zoom.
    pub closure_radius: f64,
    /// Key that finishes a polygon with at least three points.
    pub confirm_key: String,
    /// Labels are named "{label_prefix} {n}".
    pub label_prefix: String,
    pub guide_style: PolygonStyle,
    pub preview_style: PolygonStyle,
    pub label_style: PolygonStyle,
    pub handle: HandleStyle,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            closure_radius: 10.0,
            confirm_key: "Enter".to_string(),
            label_prefix: "Label".to_string(),
            guide_style: PolygonStyle::guide(),
            preview_style: PolygonStyle::preview(),
            label_style: PolygonStyle::label(),
            handle: HandleStyle::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a JSON configuration file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// Reject values the sessions cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        let lengths = [
            ("closure_radius", self.closure_radius),
            ("handle.size", self.handle.size),
            ("handle.hit_radius", self.handle.hit_radius),
            ("guide_style.stroke_width", self.guide_style.stroke_width),
            ("preview_style.stroke_width", self.preview_style.stroke_width),
            ("label_style.stroke_width", self.label_style.stroke_width),
        ];
        if let Some((name, value)) = lengths
            .iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(ConfigError::Invalid(format!(
                "{name} must be a finite, non-negative number (got {value})"
            )));
        }
        if self.confirm_key.is_empty() {
            return Err(ConfigError::Invalid("confirm_key must not be empty".to_string()));
        }
        Ok(())
    }
}
