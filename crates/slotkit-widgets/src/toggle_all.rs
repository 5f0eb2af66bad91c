#![forbid(unsafe_code)]

//! The aggregate "toggle all" row.
//!
//! Its state is derived from the slots on every read and never stored, so it
//! cannot drift from the slots it summarizes. It is not persisted.

use slotkit_core::event::{PointerButton, PointerEvent, PointerEventKind};
use slotkit_core::geometry::Rect;
use slotkit_core::record::StrengthMode;
use slotkit_layout::{LayoutMetrics, Zone, zones_for};

use crate::canvas::{Canvas, TextAlign};
use crate::slot::SlotValue;
use crate::toggle::{ToggleState, draw_toggle};
use crate::{DrawContext, Widget};

/// Label drawn next to the switch.
pub const TOGGLE_ALL_LABEL: &str = "Toggle All";

/// The toggle-all row.
#[derive(Debug, Clone, Default)]
pub struct ToggleAllWidget {
    pressed: bool,
}

impl ToggleAllWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// `On` iff every slot is enabled, `Partial` iff some are, `Off` for none
    /// or an empty list.
    pub fn state_of<'a>(slots: impl IntoIterator<Item = &'a SlotValue>) -> ToggleState {
        let mut total = 0usize;
        let mut enabled = 0usize;
        for slot in slots {
            total += 1;
            if slot.is_enabled() {
                enabled += 1;
            }
        }
        match (total, enabled) {
            (0, _) | (_, 0) => ToggleState::Off,
            (t, e) if t == e => ToggleState::On,
            _ => ToggleState::Partial,
        }
    }

    /// Set every slot's enabled flag to "not all on". Returns the new flag.
    pub fn apply<'a>(
        slots: impl IntoIterator<Item = &'a mut SlotValue>,
        current: ToggleState,
        mode: StrengthMode,
    ) -> bool {
        let target = current != ToggleState::On;
        for slot in slots {
            slot.record_mut(mode).enabled = target;
        }
        target
    }

    /// Feed a widget-local pointer event. Returns `true` when the release
    /// completed a click on the switch.
    pub fn handle_pointer(&mut self, event: &PointerEvent, width: f32, metrics: &LayoutMetrics) -> bool {
        let on_toggle = || {
            zones_for(width, StrengthMode::Single, metrics).hit(event.x, event.y)
                == Some(Zone::Toggle)
        };
        match event.kind {
            PointerEventKind::Down(PointerButton::Left) => {
                self.pressed = on_toggle();
                false
            }
            PointerEventKind::Up(PointerButton::Left) => std::mem::take(&mut self.pressed),
            _ => false,
        }
    }
}

impl Widget for ToggleAllWidget {
    fn draw(&self, area: Rect, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) {
        let zones = zones_for(area.width, StrengthMode::Single, ctx.metrics);
        let toggle = zones.toggle.translate(area.x, area.y);
        let name = zones.name.translate(area.x, area.y);
        draw_toggle(canvas, toggle, ctx.aggregate, ctx.theme);
        canvas.fill_text(
            TOGGLE_ALL_LABEL,
            name.x,
            name.center_y(),
            TextAlign::Left,
            ctx.theme.text_secondary,
        );
    }
}
