#![forbid(unsafe_code)]

//! Vertical stacking of a node's widget rows.

use slotkit_core::geometry::Rect;

use crate::LayoutMetrics;

/// Row rectangles for one node, top to bottom, plus the total content height.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnLayout {
    rows: Vec<Rect>,
    height: f32,
}

impl ColumnLayout {
    /// Stack rows of the given heights inside a node of `width`.
    ///
    /// Rows span the full node width; each row draws its own margins.
    pub fn stack(width: f32, heights: &[f32], metrics: &LayoutMetrics) -> Self {
        let mut rows = Vec::with_capacity(heights.len());
        let mut y = metrics.header_height;
        for &h in heights {
            rows.push(Rect::new(0.0, y, width, h));
            y += h + metrics.row_gap;
        }
        Self { rows, height: y }
    }

    /// Row rectangles in stacking order.
    #[inline]
    pub fn rows(&self) -> &[Rect] {
        &self.rows
    }

    /// Total content height including the header and trailing gap.
    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Index of the row under node-local `y`. Gaps belong to no row.
    pub fn row_at(&self, y: f32) -> Option<usize> {
        self.rows
            .iter()
            .position(|r| y >= r.top() && y < r.bottom())
    }
}
