#![forbid(unsafe_code)]

//! Tunables for slot list nodes, loadable from TOML or JSON.
//!
//! # Loading
//!
//! ```toml
//! # slotkit.toml
//! [gesture]
//! double_click_window_ms = 400
//!
//! [layout]
//! row_height = 22.0
//!
//! [node]
//! default_mode = "Dual"
//! ```
//!
//! ```rust,ignore
//! let config = SlotKitConfig::from_toml_file("slotkit.toml")?;
//! let config = SlotKitConfig::load_validated_json(json)?;
//! ```
//!
//! # Defaults
//!
//! Every field defaults to the built-in behavior, so an empty file and
//! `SlotKitConfig::default()` are equivalent.

use std::path::Path;

use serde::{Deserialize, Serialize};
use slotkit_core::gesture::GestureConfig;
use slotkit_core::record::{STRENGTH_DEFAULT, STRENGTH_MAX, STRENGTH_MIN, STRENGTH_STEP, StrengthMode};
use slotkit_layout::LayoutMetrics;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Everything a slot list node can be tuned with.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotKitConfig {
    /// Drag threshold, drag scale, double-click window.
    pub gesture: GestureConfig,
    /// Row zone metrics.
    pub layout: LayoutMetrics,
    /// Arrow step and new-slot strength.
    pub strength: StrengthConfig,
    /// Node defaults.
    pub node: NodeConfig,
}

/// Strength editing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrengthConfig {
    /// Arrow click increment (default: 0.05).
    pub step: f32,
    /// Strength of newly added slots (default: 1.0).
    pub initial: f32,
}

impl Default for StrengthConfig {
    fn default() -> Self {
        Self {
            step: STRENGTH_STEP,
            initial: STRENGTH_DEFAULT,
        }
    }
}

/// Node-level defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Width a fresh node is created with.
    pub default_width: f32,
    /// Strength mode a fresh node starts in.
    pub default_mode: StrengthMode,
    /// Width of the inline number entry overlay.
    pub number_entry_width: f32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            default_width: 340.0,
            default_mode: StrengthMode::Single,
            number_entry_width: 64.0,
        }
    }
}

impl SlotKitConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Parse TOML and reject invalid values.
    pub fn load_validated_toml(s: &str) -> Result<Self, ConfigError> {
        Self::from_toml_str(s)?.into_validated()
    }

    /// Parse JSON and reject invalid values.
    pub fn load_validated_json(s: &str) -> Result<Self, ConfigError> {
        Self::from_json_str(s)?.into_validated()
    }

    fn into_validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.gesture.double_click_window_ms == 0 {
            errors.push("gesture.double_click_window_ms must be > 0".into());
        }
        if !self.gesture.drag_threshold.is_finite() || self.gesture.drag_threshold < 0.0 {
            errors.push(format!(
                "gesture.drag_threshold must be finite and >= 0, got {}",
                self.gesture.drag_threshold
            ));
        }
        if !self.gesture.drag_scale.is_finite() || self.gesture.drag_scale <= 0.0 {
            errors.push(format!(
                "gesture.drag_scale must be finite and > 0, got {}",
                self.gesture.drag_scale
            ));
        }

        errors.extend(self.layout.validate());

        if !self.strength.step.is_finite()
            || self.strength.step <= 0.0
            || self.strength.step > STRENGTH_MAX
        {
            errors.push(format!(
                "strength.step must be in (0, {STRENGTH_MAX}], got {}",
                self.strength.step
            ));
        }
        if !(STRENGTH_MIN..=STRENGTH_MAX).contains(&self.strength.initial) {
            errors.push(format!(
                "strength.initial must be in [{STRENGTH_MIN}, {STRENGTH_MAX}], got {}",
                self.strength.initial
            ));
        }

        let min_width = self.layout.min_width(StrengthMode::Dual);
        if !(self.node.default_width >= min_width) {
            errors.push(format!(
                "node.default_width must be >= {min_width} (dual-mode row minimum), got {}",
                self.node.default_width
            ));
        }
        if !self.node.number_entry_width.is_finite() || self.node.number_entry_width <= 0.0 {
            errors.push(format!(
                "node.number_entry_width must be finite and > 0, got {}",
                self.node.number_entry_width
            ));
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from loading a [`SlotKitConfig`].
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
