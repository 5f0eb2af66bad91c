#![forbid(unsafe_code)]

//! Simple button-like rows: the base-model filter, the Add button, and
//! auxiliary host widgets.

use serde_json::Value;
use slotkit_core::event::{PointerButton, PointerEvent, PointerEventKind};
use slotkit_core::geometry::Rect;

use crate::canvas::{Canvas, TextAlign};
use crate::menu::BaseModelFilter;
use crate::{DrawContext, Widget};

/// Label of the Add affordance.
pub const ADD_LABEL: &str = "+ Add LoRA";

/// Press/release tracking shared by the button rows.
#[derive(Debug, Clone, Copy, Default)]
struct Press {
    held: bool,
}

impl Press {
    /// `true` when a press inside `area` is released inside it.
    fn feed(&mut self, event: &PointerEvent, area: Rect) -> bool {
        match event.kind {
            PointerEventKind::Down(PointerButton::Left) => {
                self.held = area.contains(event.x, event.y);
                false
            }
            PointerEventKind::Up(PointerButton::Left) => {
                std::mem::take(&mut self.held) && area.contains(event.x, event.y)
            }
            _ => false,
        }
    }
}

fn button_rect(area: Rect, ctx_margin: f32) -> Rect {
    area.inset(ctx_margin, 0.0)
}

fn draw_button(area: Rect, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>, label: &str) {
    let rect = button_rect(area, ctx.metrics.margin);
    canvas.fill_round_rect(rect, ctx.metrics.corner_radius, ctx.theme.row_background);
    canvas.stroke_round_rect(rect, ctx.metrics.corner_radius, ctx.theme.row_outline, 1.0);
    canvas.fill_text(
        label,
        rect.center_x(),
        rect.center_y(),
        TextAlign::Center,
        ctx.theme.text,
    );
}

/// The Add button row. Always the last structural row of a node.
#[derive(Debug, Clone, Default)]
pub struct AddButton {
    press: Press,
}

impl AddButton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Widget-local pointer event inside a row of `width` x `height`.
    /// Returns `true` on a completed click.
    pub fn handle_pointer(&mut self, event: &PointerEvent, width: f32, height: f32, margin: f32) -> bool {
        let area = button_rect(Rect::new(0.0, 0.0, width, height), margin);
        self.press.feed(event, area)
    }
}

impl Widget for AddButton {
    fn draw(&self, area: Rect, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) {
        draw_button(area, canvas, ctx, ADD_LABEL);
    }
}

/// The base-model filter row; shows the current filter.
#[derive(Debug, Clone, Default)]
pub struct FilterRow {
    filter: BaseModelFilter,
    press: Press,
}

impl FilterRow {
    pub fn new(filter: BaseModelFilter) -> Self {
        Self {
            filter,
            press: Press::default(),
        }
    }

    pub fn filter(&self) -> &BaseModelFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: BaseModelFilter) {
        self.filter = filter;
    }

    /// Label as drawn.
    pub fn label(&self) -> String {
        format!("Base model: {}", self.filter)
    }

    /// Same contract as [`AddButton::handle_pointer`].
    pub fn handle_pointer(&mut self, event: &PointerEvent, width: f32, height: f32, margin: f32) -> bool {
        let area = button_rect(Rect::new(0.0, 0.0, width, height), margin);
        self.press.feed(event, area)
    }
}

impl Widget for FilterRow {
    fn draw(&self, area: Rect, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) {
        draw_button(area, canvas, ctx, &self.label());
    }
}

/// A host widget that is not part of the slot list (seed inputs, notes, ...).
///
/// The node keeps these after the Add button and persists their values
/// positionally.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxRow {
    pub name: String,
    pub value: Value,
}

impl AuxRow {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl Widget for AuxRow {
    fn draw(&self, area: Rect, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) {
        let rect = area.inset(ctx.metrics.margin, 0.0);
        let value = match &self.value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        canvas.fill_text(&self.name, rect.x, rect.center_y(), TextAlign::Left, ctx.theme.text_secondary);
        canvas.fill_text(&value, rect.right(), rect.center_y(), TextAlign::Right, ctx.theme.text);
    }
}
