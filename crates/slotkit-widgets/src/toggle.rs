#![forbid(unsafe_code)]

//! The pill-shaped on/off switch drawn in slot and toggle-all rows.

use slotkit_core::geometry::{Point, Rect};

use crate::canvas::Canvas;
use crate::theme::Theme;

/// Visual state of a switch. `Partial` only appears on the toggle-all row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToggleState {
    On,
    #[default]
    Off,
    Partial,
}

impl From<bool> for ToggleState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

/// Draw a switch centered vertically in `zone`.
pub fn draw_toggle(canvas: &mut dyn Canvas, zone: Rect, state: ToggleState, theme: &Theme) {
    let height = (zone.height * 0.6).min(zone.width * 0.5);
    let track = Rect::new(
        zone.x,
        zone.center_y() - height * 0.5,
        zone.width,
        height,
    );
    let radius = height * 0.5;
    let fill = match state {
        ToggleState::On => theme.toggle_on,
        ToggleState::Off => theme.toggle_off,
        ToggleState::Partial => theme.toggle_partial,
    };
    canvas.fill_round_rect(track, radius, fill);

    let knob_r = (radius - 2.0).max(1.0);
    let knob_x = match state {
        ToggleState::On => track.right() - radius,
        ToggleState::Off => track.left() + radius,
        ToggleState::Partial => track.center_x(),
    };
    canvas.fill_circle(Point::new(knob_x, track.center_y()), knob_r, theme.toggle_knob);
}
