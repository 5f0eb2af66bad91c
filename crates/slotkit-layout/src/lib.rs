#![forbid(unsafe_code)]

//! Layout for slot rows and the node column that stacks them.
//!
//! Two pure solvers live here:
//!
//! - [`zones_for`] splits one slot row into its interactive zones (toggle,
//!   name, and a decrement/number/increment group per strength channel).
//! - [`ColumnLayout`] stacks widget rows vertically and maps a y coordinate
//!   back to a row index.
//!
//! Both are deterministic: the same inputs always give the same rectangles,
//! so painting and hit testing agree without sharing state.

pub mod column;
pub mod zones;

pub use column::ColumnLayout;
pub use slotkit_core::geometry::{Point, Rect};
pub use zones::{StrengthGroup, Zone, ZoneMap, zones_for};

use serde::{Deserialize, Serialize};
use slotkit_core::record::StrengthMode;

/// Pixel metrics shared by every slot-row layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutMetrics {
    /// Gap between the node edge and the row container.
    pub margin: f32,
    /// Padding inside the container, and between adjacent zones.
    pub inner_padding: f32,
    /// Height of one slot row.
    pub row_height: f32,
    /// Width of the toggle switch zone.
    pub toggle_width: f32,
    /// Width of each arrow zone.
    pub arrow_width: f32,
    /// Width of the numeric value zone.
    pub number_width: f32,
    /// Horizontal gap between two strength groups.
    pub group_gap: f32,
    /// Container corner radius.
    pub corner_radius: f32,
    /// Vertical gap between stacked rows.
    pub row_gap: f32,
    /// Space above the first row (title bar, property area).
    pub header_height: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            margin: 10.0,
            inner_padding: 4.0,
            row_height: 20.0,
            toggle_width: 28.0,
            arrow_width: 9.0,
            number_width: 32.0,
            group_gap: 6.0,
            corner_radius: 6.0,
            row_gap: 4.0,
            header_height: 6.0,
        }
    }
}

impl LayoutMetrics {
    /// Width of one decrement/number/increment group.
    #[inline]
    pub fn group_width(&self) -> f32 {
        self.arrow_width * 2.0 + self.number_width
    }

    /// Smallest row width at which no zones overlap and the name zone is
    /// exactly empty. Narrower rows still lay out, but groups may slide under
    /// the toggle.
    pub fn min_width(&self, mode: StrengthMode) -> f32 {
        let groups = mode.channels().len() as f32;
        self.margin * 2.0
            + self.inner_padding * 4.0
            + self.toggle_width
            + groups * self.group_width()
            + (groups - 1.0).max(0.0) * self.group_gap
    }

    /// Problems that would make layouts degenerate.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let fields = [
            ("margin", self.margin),
            ("inner_padding", self.inner_padding),
            ("group_gap", self.group_gap),
            ("corner_radius", self.corner_radius),
            ("row_gap", self.row_gap),
            ("header_height", self.header_height),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!("layout.{name} must be finite and >= 0, got {value}"));
            }
        }
        let sizes = [
            ("row_height", self.row_height),
            ("toggle_width", self.toggle_width),
            ("arrow_width", self.arrow_width),
            ("number_width", self.number_width),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value <= 0.0 {
                errors.push(format!("layout.{name} must be finite and > 0, got {value}"));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_min_widths() {
        let m = LayoutMetrics::default();
        assert_eq!(m.group_width(), 50.0);
        assert_eq!(m.min_width(StrengthMode::Single), 114.0);
        assert_eq!(m.min_width(StrengthMode::Dual), 170.0);
    }

    #[test]
    fn validate_flags_bad_values() {
        let m = LayoutMetrics {
            row_height: 0.0,
            margin: -1.0,
            ..LayoutMetrics::default()
        };
        let errors = m.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("row_height")));
        assert!(LayoutMetrics::default().validate().is_empty());
    }

    #[test]
    fn metrics_deserialize_with_defaults() {
        let m: LayoutMetrics =
            serde_json::from_str(r#"{"row_height": 24.0}"#).unwrap_or_default();
        assert_eq!(m.row_height, 24.0);
        assert_eq!(m.margin, 10.0);
    }
}
