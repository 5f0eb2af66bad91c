#![forbid(unsafe_code)]

//! Anchored placement for floating overlays (the inline number entry).
//!
//! An overlay is placed next to an anchor rectangle, flipped to the other
//! side when the preferred side lacks room, and clamped horizontally so it
//! stays inside the viewport.

use slotkit_core::geometry::Rect;

/// Preferred side relative to the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    Above,
    #[default]
    Below,
}

impl Placement {
    fn flip(self) -> Self {
        match self {
            Self::Above => Self::Below,
            Self::Below => Self::Above,
        }
    }
}

/// Overlay geometry request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlay {
    pub anchor: Rect,
    pub placement: Placement,
    pub width: f32,
    pub height: f32,
    /// Gap between anchor and overlay.
    pub gap: f32,
}

impl Overlay {
    /// Overlay of the given size below `anchor`.
    pub fn new(anchor: Rect, width: f32, height: f32) -> Self {
        Self {
            anchor,
            placement: Placement::Below,
            width,
            height,
            gap: 2.0,
        }
    }

    /// Set the preferred side.
    #[must_use]
    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Set the anchor gap.
    #[must_use]
    pub fn gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    /// Where the overlay lands inside `viewport`, or `None` for a zero-size
    /// request.
    pub fn compute_area(&self, viewport: Rect) -> Option<Rect> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        let placement = self.resolve_placement(viewport);
        let width = self.width.min(viewport.width);
        let x = clamp_x(self.anchor.x, width, viewport);
        let y = match placement {
            Placement::Below => self.anchor.bottom() + self.gap,
            Placement::Above => self.anchor.top() - self.gap - self.height,
        };
        let y = y.clamp(viewport.top(), (viewport.bottom() - self.height).max(viewport.top()));
        Some(Rect::new(x, y, width, self.height))
    }

    fn resolve_placement(&self, viewport: Rect) -> Placement {
        let needed = self.height + self.gap;
        let primary = self.placement;
        let available = self.available_space(primary, viewport);
        if available >= needed {
            return primary;
        }
        let flipped = primary.flip();
        let flipped_available = self.available_space(flipped, viewport);
        if flipped_available >= needed || flipped_available > available {
            flipped
        } else {
            primary
        }
    }

    fn available_space(&self, placement: Placement, viewport: Rect) -> f32 {
        match placement {
            Placement::Above => self.anchor.top() - viewport.top(),
            Placement::Below => viewport.bottom() - self.anchor.bottom(),
        }
    }
}

fn clamp_x(x: f32, width: f32, viewport: Rect) -> f32 {
    if x + width > viewport.right() {
        (viewport.right() - width).max(viewport.left())
    } else {
        x.max(viewport.left())
    }
}
