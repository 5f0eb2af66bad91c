#![forbid(unsafe_code)]

//! The value shape held by one slot.
//!
//! Wire keys are the ones the backend loader reads: `on`, `lora`,
//! `strength`, and `strengthTwo`. `strengthTwo` is only written in dual mode,
//! while the in-memory record may keep a stale secondary value around so a
//! mode switch can be undone without losing it.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::selector::Selector;

/// Lowest accepted strength.
pub const STRENGTH_MIN: f32 = -20.0;
/// Highest accepted strength.
pub const STRENGTH_MAX: f32 = 20.0;
/// Arrow click increment.
pub const STRENGTH_STEP: f32 = 0.05;
/// Strength given to new and upgraded slots.
pub const STRENGTH_DEFAULT: f32 = 1.0;

/// Clamp into `[STRENGTH_MIN, STRENGTH_MAX]`. NaN collapses to the default.
#[inline]
#[must_use]
pub fn clamp_strength(value: f32) -> f32 {
    if value.is_nan() {
        return STRENGTH_DEFAULT;
    }
    value.clamp(STRENGTH_MIN, STRENGTH_MAX)
}

/// Round to two decimals.
#[inline]
#[must_use]
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Clamp then round: the coercion every interactive edit goes through.
#[inline]
#[must_use]
pub fn coerce_strength(value: f32) -> f32 {
    round2(clamp_strength(value))
}

/// Node-level strength mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StrengthMode {
    /// One strength per slot (model and clip share it).
    #[default]
    Single,
    /// Separate model and clip strengths.
    Dual,
}

impl StrengthMode {
    /// Channels shown and persisted in this mode, left to right.
    pub fn channels(self) -> &'static [StrengthChannel] {
        match self {
            Self::Single => &[StrengthChannel::Primary],
            Self::Dual => &[StrengthChannel::Primary, StrengthChannel::Secondary],
        }
    }

    /// Parse the property value. Unknown strings are rejected.
    pub fn from_property(value: &str) -> Option<Self> {
        match value {
            "Single" => Some(Self::Single),
            "Dual" => Some(Self::Dual),
            _ => None,
        }
    }

    /// The property spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "Single",
            Self::Dual => "Dual",
        }
    }
}

impl fmt::Display for StrengthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One strength channel of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrengthChannel {
    /// Model strength (`strength`).
    Primary,
    /// Clip strength (`strengthTwo`), dual mode only.
    Secondary,
}

/// One slot's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotRecord {
    #[serde(rename = "on", default = "default_enabled")]
    pub enabled: bool,
    #[serde(rename = "lora", default)]
    pub selection: Selector,
    #[serde(rename = "strength", default = "default_strength")]
    pub strength_primary: f32,
    #[serde(
        rename = "strengthTwo",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub strength_secondary: Option<f32>,
}

fn default_enabled() -> bool {
    true
}

fn default_strength() -> f32 {
    STRENGTH_DEFAULT
}

impl Default for SlotRecord {
    fn default() -> Self {
        Self::new(Selector::None, StrengthMode::Single)
    }
}

impl SlotRecord {
    /// A fresh slot for `selection`: enabled iff something is selected,
    /// default strengths, secondary present only in dual mode.
    pub fn new(selection: Selector, mode: StrengthMode) -> Self {
        Self {
            enabled: !selection.is_none(),
            selection,
            strength_primary: STRENGTH_DEFAULT,
            strength_secondary: (mode == StrengthMode::Dual).then_some(STRENGTH_DEFAULT),
        }
    }

    /// Current value of a channel. A secondary that was never set reads as
    /// the primary, which is what the loader does with a missing `strengthTwo`.
    pub fn strength(&self, channel: StrengthChannel) -> f32 {
        match channel {
            StrengthChannel::Primary => self.strength_primary,
            StrengthChannel::Secondary => self.strength_secondary.unwrap_or(self.strength_primary),
        }
    }

    /// Set a channel through clamp + round.
    pub fn set_strength(&mut self, channel: StrengthChannel, value: f32) {
        let value = coerce_strength(value);
        match channel {
            StrengthChannel::Primary => self.strength_primary = value,
            StrengthChannel::Secondary => self.strength_secondary = Some(value),
        }
    }

    /// Add `delta` to a channel through clamp + round.
    pub fn nudge(&mut self, channel: StrengthChannel, delta: f32) {
        self.set_strength(channel, self.strength(channel) + delta);
    }

    /// Replace the selection; enables iff the new selection is not `None`.
    pub fn select(&mut self, selection: Selector) {
        self.enabled = !selection.is_none();
        self.selection = selection;
    }

    /// The record as it should be persisted in `mode`.
    pub fn to_wire(&self, mode: StrengthMode) -> Value {
        let mut map = Map::with_capacity(4);
        map.insert("on".into(), Value::Bool(self.enabled));
        map.insert("lora".into(), Value::String(self.selection.to_string()));
        map.insert("strength".into(), number(self.strength_primary));
        if mode == StrengthMode::Dual {
            map.insert(
                "strengthTwo".into(),
                number(self.strength(StrengthChannel::Secondary)),
            );
        }
        Value::Object(map)
    }

    /// Leniently read a record-shaped value.
    ///
    /// Returns `None` unless `value` is an object carrying a `lora` key.
    /// Missing or mistyped fields fall back to defaults (`on = true`,
    /// `strength = 1.0`, no secondary); numbers are clamped but not rounded.
    pub fn from_wire(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let lora = obj.get("lora")?;
        let selection = lora.as_str().map(Selector::from).unwrap_or_default();
        let enabled = obj.get("on").and_then(Value::as_bool).unwrap_or(true);
        let strength_primary = obj
            .get("strength")
            .and_then(Value::as_f64)
            .map_or(STRENGTH_DEFAULT, |v| clamp_strength(v as f32));
        let strength_secondary = obj
            .get("strengthTwo")
            .and_then(Value::as_f64)
            .map(|v| clamp_strength(v as f32));
        Some(Self {
            enabled,
            selection,
            strength_primary,
            strength_secondary,
        })
    }
}

fn number(value: f32) -> Value {
    serde_json::Number::from_f64(f64::from(value)).map_or(Value::Null, |n| {
        // Re-read through the shortest f32 form so 0.8f32 is written as 0.8.
        format!("{value:?}")
            .parse::<serde_json::Number>()
            .map_or(Value::Number(n), Value::Number)
    })
}
