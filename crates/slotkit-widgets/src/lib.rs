#![forbid(unsafe_code)]

//! Canvas-drawn widgets for slot list nodes.
//!
//! Every row a node shows is a widget: the base-model filter row, the
//! toggle-all switch, one [`slot::SlotWidget`] per LoRA slot, the Add button,
//! and any auxiliary host widgets. Widgets paint through the [`Canvas`] trait
//! and never talk to the host directly; pointer handlers return responses
//! that the owning node turns into host calls.

pub mod canvas;
pub mod menu;
pub mod number_entry;
pub mod placement;
pub mod rows;
pub mod slot;
pub mod text;
pub mod theme;
pub mod toggle;
pub mod toggle_all;

pub use canvas::{Canvas, DisplayList, DrawCmd, TextAlign};
pub use menu::{BaseModelFilter, ContextAction, Menu, MenuCache, MenuChoice, MenuItem};
pub use number_entry::{EntryOutcome, NumberEntry};
pub use rows::{AddButton, AuxRow, FilterRow};
pub use slot::{SlotInteraction, SlotResponse, SlotValue, SlotWidget};
pub use theme::{Rgba, Theme};
pub use toggle::ToggleState;
pub use toggle_all::ToggleAllWidget;

use slotkit_core::geometry::Rect;
use slotkit_core::record::StrengthMode;
use slotkit_layout::LayoutMetrics;

/// Shared paint-time inputs for one node.
#[derive(Debug, Clone, Copy)]
pub struct DrawContext<'a> {
    pub mode: StrengthMode,
    pub metrics: &'a LayoutMetrics,
    pub theme: &'a Theme,
    /// Aggregate enabled state of the node's slots.
    pub aggregate: ToggleState,
}

/// A row-shaped widget painted onto a [`Canvas`].
///
/// `area` is the row rectangle in node-local coordinates; widgets lay out
/// their own margins inside it.
pub trait Widget {
    /// Paint the widget.
    fn draw(&self, area: Rect, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>);

    /// Height this row wants.
    fn height(&self, metrics: &LayoutMetrics) -> f32 {
        metrics.row_height
    }
}
