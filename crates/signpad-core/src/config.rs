//! Pad configuration.

use crate::ink::InkStyle;
use crate::validate::ValidationRules;
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid color: {0}")]
    Color(String),
}

/// Signature pad configuration.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PadConfig {
    pub ink: InkStyle,
    pub rules: ValidationRules,
    /// Ink color as `#rrggbb`.
    pub ink_color: String,
    /// Background color as `#rrggbb`. The surface is always opaque.
    pub background_color: String,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            ink: InkStyle::default(),
            rules: ValidationRules::default(),
            ink_color: "#000000".to_string(),
            background_color: "#ffffff".to_string(),
        }
    }
}

impl PadConfig {
    /// Parse from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.ink_color()?;
        config.background_color()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded pad config from {}", path.display());
        Ok(config)
    }

    pub fn ink_color(&self) -> Result<Color, ConfigError> {
        parse_color(&self.ink_color).ok_or_else(|| ConfigError::Color(self.ink_color.clone()))
    }

    pub fn background_color(&self) -> Result<Color, ConfigError> {
        parse_color(&self.background_color)
            .ok_or_else(|| ConfigError::Color(self.background_color.clone()))
    }
}

/// Parse a CSS hex color string like "#ff0000".
pub fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::from_rgba8(r, g, b, 255))
}
