#![forbid(unsafe_code)]

//! The painting surface widgets draw onto.
//!
//! Hosts implement [`Canvas`] over their own 2D context. [`DisplayList`] is a
//! recording implementation with deterministic text metrics; tests assert on
//! its commands, and headless hosts can replay them.

use slotkit_core::geometry::{Point, Rect};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::theme::Rgba;

/// Horizontal anchoring of a text run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Minimal 2D drawing interface.
///
/// Text is positioned by its vertical center (`y`) and the anchor given by
/// `align` (`x`).
pub trait Canvas {
    fn fill_round_rect(&mut self, rect: Rect, radius: f32, color: Rgba);
    fn stroke_round_rect(&mut self, rect: Rect, radius: f32, color: Rgba, line_width: f32);
    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba);
    fn fill_triangle(&mut self, points: [Point; 3], color: Rgba);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, align: TextAlign, color: Rgba);

    /// Advance width of `text` in pixels.
    fn measure_text(&self, text: &str) -> f32;

    /// Multiply subsequent draws by `alpha` (0..=1).
    fn set_global_alpha(&mut self, alpha: f32);
    fn global_alpha(&self) -> f32;
}

/// One recorded draw call, with the global alpha it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    FillRoundRect {
        rect: Rect,
        radius: f32,
        color: Rgba,
        alpha: f32,
    },
    StrokeRoundRect {
        rect: Rect,
        radius: f32,
        color: Rgba,
        line_width: f32,
        alpha: f32,
    },
    Circle {
        center: Point,
        radius: f32,
        color: Rgba,
        alpha: f32,
    },
    Triangle {
        points: [Point; 3],
        color: Rgba,
        alpha: f32,
    },
    Text {
        text: String,
        x: f32,
        y: f32,
        align: TextAlign,
        color: Rgba,
        alpha: f32,
    },
}

impl DrawCmd {
    /// Alpha the command was recorded with.
    pub fn alpha(&self) -> f32 {
        match self {
            Self::FillRoundRect { alpha, .. }
            | Self::StrokeRoundRect { alpha, .. }
            | Self::Circle { alpha, .. }
            | Self::Triangle { alpha, .. }
            | Self::Text { alpha, .. } => *alpha,
        }
    }
}

/// Recording canvas with fixed-advance text metrics.
#[derive(Debug, Clone)]
pub struct DisplayList {
    cmds: Vec<DrawCmd>,
    alpha: f32,
    cell_width: f32,
}

impl Default for DisplayList {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayList {
    /// Empty list; one terminal column of text is 7px wide.
    pub fn new() -> Self {
        Self {
            cmds: Vec::new(),
            alpha: 1.0,
            cell_width: 7.0,
        }
    }

    /// Builder: pixel advance per display column.
    #[must_use]
    pub fn with_cell_width(mut self, cell_width: f32) -> Self {
        self.cell_width = cell_width;
        self
    }

    /// Recorded commands in issue order.
    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }

    /// Text runs in issue order.
    pub fn texts(&self) -> Vec<&str> {
        self.cmds
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Find a text command by exact content.
    pub fn text_cmd(&self, needle: &str) -> Option<&DrawCmd> {
        self.cmds
            .iter()
            .find(|c| matches!(c, DrawCmd::Text { text, .. } if text == needle))
    }

    /// Drop all commands and reset alpha.
    pub fn clear(&mut self) {
        self.cmds.clear();
        self.alpha = 1.0;
    }
}

impl Canvas for DisplayList {
    fn fill_round_rect(&mut self, rect: Rect, radius: f32, color: Rgba) {
        self.cmds.push(DrawCmd::FillRoundRect {
            rect,
            radius,
            color,
            alpha: self.alpha,
        });
    }

    fn stroke_round_rect(&mut self, rect: Rect, radius: f32, color: Rgba, line_width: f32) {
        self.cmds.push(DrawCmd::StrokeRoundRect {
            rect,
            radius,
            color,
            line_width,
            alpha: self.alpha,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f32, color: Rgba) {
        self.cmds.push(DrawCmd::Circle {
            center,
            radius,
            color,
            alpha: self.alpha,
        });
    }

    fn fill_triangle(&mut self, points: [Point; 3], color: Rgba) {
        self.cmds.push(DrawCmd::Triangle {
            points,
            color,
            alpha: self.alpha,
        });
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, align: TextAlign, color: Rgba) {
        self.cmds.push(DrawCmd::Text {
            text: text.to_owned(),
            x,
            y,
            align,
            color,
            alpha: self.alpha,
        });
    }

    fn measure_text(&self, text: &str) -> f32 {
        let columns: usize = text.graphemes(true).map(UnicodeWidthStr::width).sum();
        columns as f32 * self.cell_width
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn global_alpha(&self) -> f32 {
        self.alpha
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_alpha_per_command() {
        let mut list = DisplayList::new();
        list.fill_text("a", 0.0, 0.0, TextAlign::Left, Rgba::rgb(1, 2, 3));
        list.set_global_alpha(0.4);
        list.fill_text("b", 0.0, 0.0, TextAlign::Left, Rgba::rgb(1, 2, 3));
        assert_eq!(list.commands()[0].alpha(), 1.0);
        assert_eq!(list.commands()[1].alpha(), 0.4);
        assert_eq!(list.texts(), vec!["a", "b"]);
    }

    #[test]
    fn measure_uses_display_columns() {
        let list = DisplayList::new().with_cell_width(10.0);
        assert_eq!(list.measure_text("abc"), 30.0);
        assert_eq!(list.measure_text("日本"), 40.0);
        assert_eq!(list.measure_text(""), 0.0);
    }

    #[test]
    fn alpha_is_clamped() {
        let mut list = DisplayList::new();
        list.set_global_alpha(3.0);
        assert_eq!(list.global_alpha(), 1.0);
        list.clear();
        assert!(list.commands().is_empty());
    }
}
