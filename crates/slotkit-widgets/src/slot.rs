#![forbid(unsafe_code)]

//! The slot widget: one LoRA slot row.
//!
//! Renders a toggle, the model name, and one `< value >` group per active
//! strength channel, and runs the slot's pointer state machine.
//!
//! # Pointer state machine
//!
//! ```text
//!            press(number)                 move |dx| > threshold
//!   Idle ───────────────────▶ Armed ────────────────────────────▶ Dragging
//!    ▲  press(other zone)       │ release                          │ release
//!    │─────────▶ Pressed ───────┼────────▶ click(press zone)       │
//!    │                          ▼                                  ▼
//!    └───────────────────── Idle ◀────────────────────────── Consumed
//! ```
//!
//! A click on a number zone arms the double-click window; a second click on
//! the same channel inside the window asks the node to open the number
//! entry. A host-delivered double click does the same directly.
//!
//! # Invariants
//!
//! 1. A press that turned into a drag never also produces a click.
//! 2. Every value mutation goes through clamp + round.
//! 3. Disabled slots stay fully interactive.

use slotkit_core::event::{PointerButton, PointerEvent, PointerEventKind};
use slotkit_core::geometry::{Point, Rect};
use slotkit_core::gesture::{ClickWindow, DragSession, GestureConfig, ReleaseOutcome};
use slotkit_core::record::{SlotRecord, StrengthChannel, StrengthMode};
use slotkit_core::selector::Selector;
use slotkit_layout::{LayoutMetrics, Zone, ZoneMap, zones_for};
use serde_json::Value;
use web_time::Instant;

use crate::canvas::{Canvas, TextAlign};
use crate::text::fit_text;
use crate::theme::Theme;
use crate::toggle::{ToggleState, draw_toggle};
use crate::{DrawContext, Widget};

// ---------------------------------------------------------------------------
// Slot value
// ---------------------------------------------------------------------------

/// What a slot widget currently holds.
///
/// `Legacy` is a bare selection string written by a degraded load path; it
/// becomes a record on upgrade or on first interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotValue {
    Record(SlotRecord),
    Legacy(String),
}

impl Default for SlotValue {
    fn default() -> Self {
        Self::Record(SlotRecord::default())
    }
}

impl SlotValue {
    /// The record view of this value. Legacy strings read as a default record
    /// carrying that selection.
    pub fn to_record(&self, mode: StrengthMode) -> SlotRecord {
        match self {
            Self::Record(rec) => rec.clone(),
            Self::Legacy(raw) => SlotRecord::new(Selector::from(raw.as_str()), mode),
        }
    }

    /// Whether this is still a bare string.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    /// Convert a legacy string in place. Returns `true` if anything changed.
    pub fn upgrade(&mut self, mode: StrengthMode) -> bool {
        if let Self::Legacy(raw) = self {
            *self = Self::Record(SlotRecord::new(Selector::from(raw.as_str()), mode));
            true
        } else {
            false
        }
    }

    /// Mutable record, upgrading a legacy value first.
    pub fn record_mut(&mut self, mode: StrengthMode) -> &mut SlotRecord {
        self.upgrade(mode);
        match self {
            Self::Record(rec) => rec,
            Self::Legacy(_) => unreachable!("legacy value upgraded above"),
        }
    }

    /// Enabled flag as painted.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Record(rec) => rec.enabled,
            Self::Legacy(raw) => !Selector::from(raw.as_str()).is_none(),
        }
    }
}

// ---------------------------------------------------------------------------
// Interaction types
// ---------------------------------------------------------------------------

/// Per-event inputs a slot needs beyond the event itself.
#[derive(Debug, Clone, Copy)]
pub struct SlotInteraction<'a> {
    pub mode: StrengthMode,
    /// Row width (the node width).
    pub width: f32,
    pub metrics: &'a LayoutMetrics,
    pub gesture: &'a GestureConfig,
    /// Arrow click increment.
    pub step: f32,
}

/// What the node should do after a slot handled a pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlotResponse {
    /// Not for this slot.
    Ignored,
    /// Handled, nothing changed.
    Consumed,
    /// The slot value changed; mark the host dirty.
    Changed,
    /// Show the selection menu at this widget-local point.
    OpenMenu(Point),
    /// Open the number entry over `channel` at this widget-local point.
    EditNumber { channel: StrengthChannel, at: Point },
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

/// One slot row.
#[derive(Debug, Clone)]
pub struct SlotWidget {
    name: String,
    value: SlotValue,
    drag: Option<DragSession<StrengthChannel>>,
    press_zone: Option<Zone>,
    clicks: ClickWindow<StrengthChannel>,
}

impl SlotWidget {
    /// Create a slot with the given widget name and value.
    pub fn new(name: impl Into<String>, value: SlotValue) -> Self {
        Self {
            name: name.into(),
            value,
            drag: None,
            press_zone: None,
            clicks: ClickWindow::new(),
        }
    }

    /// Widget name (`lora_N`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename (used by the node's renumber pass).
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn value(&self) -> &SlotValue {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut SlotValue {
        &mut self.value
    }

    /// Replace the value and drop any in-flight gesture.
    pub fn set_value(&mut self, value: SlotValue) {
        self.value = value;
        self.reset_gesture();
    }

    /// Record view of the current value.
    pub fn record(&self, mode: StrengthMode) -> SlotRecord {
        self.value.to_record(mode)
    }

    /// Whether a first number click is waiting for its second click.
    pub fn is_double_click_armed(
        &self,
        channel: StrengthChannel,
        now: Instant,
        gesture: &GestureConfig,
    ) -> bool {
        self.clicks
            .is_armed_for(channel, now, gesture.double_click_window())
    }

    /// Whether a press is currently held on this slot.
    pub fn is_pressed(&self) -> bool {
        self.press_zone.is_some()
    }

    /// Forget any drag session and pending click.
    pub fn reset_gesture(&mut self) {
        self.drag = None;
        self.press_zone = None;
        self.clicks.reset();
    }

    /// Apply a menu choice: replace the selection, enable iff not `None`.
    pub fn select(&mut self, selection: Selector, mode: StrengthMode) {
        self.value.record_mut(mode).select(selection);
    }

    /// Apply a committed number entry value (clamped and rounded).
    pub fn commit_number(&mut self, channel: StrengthChannel, value: f32, mode: StrengthMode) {
        self.value.record_mut(mode).set_strength(channel, value);
    }

    /// The value persisted for this slot in `mode`. Legacy strings are
    /// written as the record they upgrade to.
    pub fn serialize_value(&self, mode: StrengthMode) -> Value {
        self.value.to_record(mode).to_wire(mode)
    }

    /// Zone map for a row of `width`.
    pub fn zones(&self, width: f32, mode: StrengthMode, metrics: &LayoutMetrics) -> ZoneMap {
        zones_for(width, mode, metrics)
    }

    /// Feed a widget-local pointer event.
    pub fn handle_pointer(
        &mut self,
        event: &PointerEvent,
        now: Instant,
        ctx: &SlotInteraction<'_>,
    ) -> SlotResponse {
        match event.kind {
            PointerEventKind::Down(PointerButton::Left) => self.on_press(event, ctx),
            PointerEventKind::Move => self.on_move(event, ctx),
            PointerEventKind::Up(PointerButton::Left) => self.on_release(event, now, ctx),
            PointerEventKind::DoubleClick(PointerButton::Left) => {
                let zones = zones_for(ctx.width, ctx.mode, ctx.metrics);
                match zones.hit(event.x, event.y) {
                    Some(Zone::Number(channel)) => {
                        self.clicks.reset();
                        SlotResponse::EditNumber {
                            channel,
                            at: event.position(),
                        }
                    }
                    _ => SlotResponse::Ignored,
                }
            }
            _ => SlotResponse::Ignored,
        }
    }

    fn on_press(&mut self, event: &PointerEvent, ctx: &SlotInteraction<'_>) -> SlotResponse {
        let zones = zones_for(ctx.width, ctx.mode, ctx.metrics);
        let Some(zone) = zones.hit(event.x, event.y) else {
            return SlotResponse::Ignored;
        };
        self.press_zone = Some(zone);
        self.drag = match zone {
            Zone::Number(channel) => {
                let start = self.value.to_record(ctx.mode).strength(channel);
                Some(DragSession::arm(channel, event.x, start))
            }
            _ => None,
        };
        SlotResponse::Consumed
    }

    fn on_move(&mut self, event: &PointerEvent, ctx: &SlotInteraction<'_>) -> SlotResponse {
        let Some(session) = self.drag.as_mut() else {
            return SlotResponse::Ignored;
        };
        let was_dragged = session.is_dragged();
        let Some(raw) = session.update(event.x, ctx.gesture) else {
            return SlotResponse::Consumed;
        };
        let channel = session.target();
        if !was_dragged {
            let _span = tracing::debug_span!(
                "slot.drag",
                slot = %self.name,
                channel = ?channel,
                start_value = session.start_value()
            )
            .entered();
            tracing::debug!("drag threshold crossed");
        }
        let record = self.value.record_mut(ctx.mode);
        let before = record.clone();
        record.set_strength(channel, raw);
        if *record == before {
            SlotResponse::Consumed
        } else {
            SlotResponse::Changed
        }
    }

    fn on_release(
        &mut self,
        event: &PointerEvent,
        now: Instant,
        ctx: &SlotInteraction<'_>,
    ) -> SlotResponse {
        let Some(zone) = self.press_zone.take() else {
            return SlotResponse::Ignored;
        };
        if let Some(session) = self.drag.take() {
            let channel = session.target();
            if session.finish() == ReleaseOutcome::Consumed {
                tracing::debug!(
                    slot = %self.name,
                    channel = ?channel,
                    value = self.value.to_record(ctx.mode).strength(channel),
                    "drag finished"
                );
                return SlotResponse::Consumed;
            }
        }
        self.click(zone, event.position(), now, ctx)
    }

    fn click(
        &mut self,
        zone: Zone,
        at: Point,
        now: Instant,
        ctx: &SlotInteraction<'_>,
    ) -> SlotResponse {
        if !matches!(zone, Zone::Number(_)) {
            self.clicks.reset();
        }
        match zone {
            Zone::Toggle => {
                let record = self.value.record_mut(ctx.mode);
                record.enabled = !record.enabled;
                SlotResponse::Changed
            }
            Zone::Decrement(channel) => self.nudge(channel, -ctx.step, ctx.mode),
            Zone::Increment(channel) => self.nudge(channel, ctx.step, ctx.mode),
            Zone::Number(channel) => {
                if self
                    .clicks
                    .register(channel, now, ctx.gesture.double_click_window())
                {
                    SlotResponse::EditNumber { channel, at }
                } else {
                    SlotResponse::Consumed
                }
            }
            Zone::Name => SlotResponse::OpenMenu(at),
        }
    }

    fn nudge(&mut self, channel: StrengthChannel, delta: f32, mode: StrengthMode) -> SlotResponse {
        let record = self.value.record_mut(mode);
        let before = record.clone();
        record.nudge(channel, delta);
        if *record == before {
            SlotResponse::Consumed
        } else {
            SlotResponse::Changed
        }
    }
}

impl Widget for SlotWidget {
    fn draw(&self, area: Rect, canvas: &mut dyn Canvas, ctx: &DrawContext<'_>) {
        let record = self.value.to_record(ctx.mode);
        let zones = zones_for(area.width, ctx.mode, ctx.metrics);
        draw_slot_row(canvas, &zones, area, &record, ctx);
    }
}

fn draw_slot_row(
    canvas: &mut dyn Canvas,
    zones: &ZoneMap,
    area: Rect,
    record: &SlotRecord,
    ctx: &DrawContext<'_>,
) {
    let theme: &Theme = ctx.theme;
    let place = |r: Rect| r.translate(area.x, area.y);

    canvas.fill_round_rect(place(zones.container), ctx.metrics.corner_radius, theme.row_background);
    canvas.stroke_round_rect(
        place(zones.container),
        ctx.metrics.corner_radius,
        theme.row_outline,
        1.0,
    );
    draw_toggle(canvas, place(zones.toggle), ToggleState::from(record.enabled), theme);

    let base_alpha = canvas.global_alpha();
    if !record.enabled {
        canvas.set_global_alpha(base_alpha * theme.disabled_opacity);
    }

    let name = place(zones.name);
    let label = fit_text(canvas, record.selection.display_name(), name.width);
    canvas.fill_text(&label, name.x, name.center_y(), TextAlign::Left, theme.text);

    for (channel, group) in &zones.groups {
        let dec = place(group.dec);
        let inc = place(group.inc);
        let number = place(group.number);
        canvas.fill_triangle(arrow_points(dec, false), theme.arrow);
        let value = format!("{:.2}", record.strength(*channel));
        canvas.fill_text(&value, number.center_x(), number.center_y(), TextAlign::Center, theme.text);
        canvas.fill_triangle(arrow_points(inc, true), theme.arrow);
    }

    canvas.set_global_alpha(base_alpha);
}

/// A small arrow centered in `zone`, pointing right when `right` is set.
fn arrow_points(zone: Rect, right: bool) -> [Point; 3] {
    let half_w = (zone.width * 0.3).max(1.0);
    let half_h = (zone.height * 0.25).max(1.0);
    let cx = zone.center_x();
    let cy = zone.center_y();
    if right {
        [
            Point::new(cx - half_w, cy - half_h),
            Point::new(cx + half_w, cy),
            Point::new(cx - half_w, cy + half_h),
        ]
    } else {
        [
            Point::new(cx + half_w, cy - half_h),
            Point::new(cx - half_w, cy),
            Point::new(cx + half_w, cy + half_h),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DisplayList, DrawCmd};
    use serde_json::json;
    use std::time::Duration;

    const P: StrengthChannel = StrengthChannel::Primary;
    const S: StrengthChannel = StrengthChannel::Secondary;

    struct Fixture {
        metrics: LayoutMetrics,
        gesture: GestureConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                metrics: LayoutMetrics::default(),
                gesture: GestureConfig::default(),
            }
        }

        fn ctx(&self, mode: StrengthMode) -> SlotInteraction<'_> {
            SlotInteraction {
                mode,
                width: 300.0,
                metrics: &self.metrics,
                gesture: &self.gesture,
                step: 0.05,
            }
        }
    }

    fn slot(sel: &str, mode: StrengthMode) -> SlotWidget {
        SlotWidget::new("lora_1", SlotValue::Record(SlotRecord::new(Selector::from(sel), mode)))
    }

    fn click(w: &mut SlotWidget, x: f32, now: Instant, ctx: &SlotInteraction<'_>) -> SlotResponse {
        w.handle_pointer(&PointerEvent::down(x, 10.0), now, ctx);
        w.handle_pointer(&PointerEvent::up(x, 10.0), now, ctx)
    }

    // Single mode, width 300: toggle 14..42, name 46..232, dec 236..245,
    // number 245..277, inc 277..286.

    #[test]
    fn toggle_click_flips_enabled_and_keeps_values() {
        let f = Fixture::new();
        let ctx = f.ctx(StrengthMode::Single);
        let mut w = slot("1:a", StrengthMode::Single);
        assert_eq!(click(&mut w, 20.0, Instant::now(), &ctx), SlotResponse::Changed);
        let rec = w.record(StrengthMode::Single);
        assert!(!rec.enabled);
        assert_eq!(rec.selection, Selector::from("1:a"));
        assert_eq!(rec.strength_primary, 1.0);
    }

    #[test]
    fn arrows_step_and_clamp() {
        let f = Fixture::new();
        let ctx = f.ctx(StrengthMode::Single);
        let mut w = slot("1:a", StrengthMode::Single);
        let now = Instant::now();
        assert_eq!(click(&mut w, 280.0, now, &ctx), SlotResponse::Changed);
        assert_eq!(w.record(StrengthMode::Single).strength_primary, 1.05);
        click(&mut w, 240.0, now, &ctx);
        click(&mut w, 240.0, now, &ctx);
        assert_eq!(w.record(StrengthMode::Single).strength_primary, 0.95);

        w.commit_number(P, 20.0, StrengthMode::Single);
        assert_eq!(click(&mut w, 280.0, now, &ctx), SlotResponse::Consumed);
        assert_eq!(w.record(StrengthMode::Single).strength_primary, 20.0);
    }

    #[test]
    fn drag_past_threshold_changes_value_without_click() {
        let f = Fixture::new();
        let ctx = f.ctx(StrengthMode::Single);
        let mut w = slot("1:a", StrengthMode::Single);
        let now = Instant::now();
        assert_eq!(w.handle_pointer(&PointerEvent::down(260.0, 10.0), now, &ctx), SlotResponse::Consumed);
        assert_eq!(w.handle_pointer(&PointerEvent::moved(262.0, 10.0), now, &ctx), SlotResponse::Consumed);
        assert_eq!(w.handle_pointer(&PointerEvent::moved(310.0, 10.0), now, &ctx), SlotResponse::Changed);
        assert_eq!(w.record(StrengthMode::Single).strength_primary, 1.5);
        assert_eq!(w.handle_pointer(&PointerEvent::up(310.0, 10.0), now, &ctx), SlotResponse::Consumed);
        // The release was not a click, so no double-click window is armed.
        assert!(!w.is_double_click_armed(P, now, &f.gesture));
    }

    #[test]
    fn drag_clamps_to_range() {
        let f = Fixture::new();
        let ctx = f.ctx(StrengthMode::Single);
        let mut w = slot("1:a", StrengthMode::Single);
        let now = Instant::now();
        w.handle_pointer(&PointerEvent::down(260.0, 10.0), now, &ctx);
        w.handle_pointer(&PointerEvent::moved(-5000.0, 10.0), now, &ctx);
        assert_eq!(w.record(StrengthMode::Single).strength_primary, -20.0);
    }

    #[test]
    fn small_wiggle_is_a_click() {
        let f = Fixture::new();
        let ctx = f.ctx(StrengthMode::Single);
        let mut w = slot("1:a", StrengthMode::Single);
        let now = Instant::now();
        w.handle_pointer(&PointerEvent::down(260.0, 10.0), now, &ctx);
        w.handle_pointer(&PointerEvent::moved(262.0, 10.0), now, &ctx);
        assert_eq!(w.handle_pointer(&PointerEvent::up(262.0, 10.0), now, &ctx), SlotResponse::Consumed);
        assert!(w.is_double_click_armed(P, now, &f.gesture));
        assert_eq!(w.record(StrengthMode::Single).strength_primary, 1.0);
    }

    #[test]
    fn second_number_click_opens_entry() {
        let f = Fixture::new();
        let ctx = f.ctx(StrengthMode::Single);
        let mut w = slot("1:a", StrengthMode::Single);
        let t = Instant::now();
        assert_eq!(click(&mut w, 260.0, t, &ctx), SlotResponse::Consumed);
        let second = click(&mut w, 261.0, t + Duration::from_millis(200), &ctx);
        assert_eq!(
            second,
            SlotResponse::EditNumber {
                channel: P,
                at: Point::new(261.0, 10.0)
            }
        );
        assert!(!w.is_double_click_armed(P, t, &f.gesture));
    }

    #[test]
    fn late_second_click_rearms() {
        let f = Fixture::new();
        let ctx = f.ctx(StrengthMode::Single);
        let mut w = slot("1:a", StrengthMode::Single);
        let t = Instant::now();
        click(&mut w, 260.0, t, &ctx);
        let late = t + Duration::from_millis(700);
        assert_eq!(click(&mut w, 260.0, late, &ctx), SlotResponse::Consumed);
        assert!(w.is_double_click_armed(P, late, &f.gesture));
    }

    #[test]
    fn clicks_on_different_channels_do_not_pair() {
        let f = Fixture::new();
        let ctx = f.ctx(StrengthMode::Dual);
        let mut w = slot("1:a", StrengthMode::Dual);
        let t = Instant::now();
        // Dual: primary number 189..221, secondary number 245..277.
        click(&mut w, 200.0, t, &ctx);
        assert_eq!(click(&mut w, 260.0, t, &ctx), SlotResponse::Consumed);
        assert!(w.is_double_click_armed(S, t, &f.gesture));
    }

    #[test]
    fn host_double_click_opens_entry() {
        let f = Fixture::new();
        let ctx = f.ctx(StrengthMode::Single);
        let mut w = slot("1:a", StrengthMode::Single);
        let resp = w.handle_pointer(&PointerEvent::double_click(250.0, 5.0), Instant::now(), &ctx);
        assert!(matches!(resp, SlotResponse::EditNumber { channel: P, .. }));
        let on_name = w.handle_pointer(&PointerEvent::double_click(100.0, 5.0), Instant::now(), &ctx);
        assert_eq!(on_name, SlotResponse::Ignored);
    }

    #[test]
    fn name_click_requests_menu_and_select_applies() {
        let f = Fixture::new();
        let ctx = f.ctx(StrengthMode::Single);
        let mut w = slot("None", StrengthMode::Single);
        assert_eq!(
            click(&mut w, 100.0, Instant::now(), &ctx),
            SlotResponse::OpenMenu(Point::new(100.0, 10.0))
        );
        w.select(Selector::from("5:x"), StrengthMode::Single);
        assert!(w.record(StrengthMode::Single).enabled);
        w.select(Selector::None, StrengthMode::Single);
        assert!(!w.record(StrengthMode::Single).enabled);
    }

    #[test]
    fn disabled_slot_is_still_interactive() {
        let f = Fixture::new();
        let ctx = f.ctx(StrengthMode::Single);
        let mut w = slot("1:a", StrengthMode::Single);
        w.value_mut().record_mut(StrengthMode::Single).enabled = false;
        assert_eq!(click(&mut w, 280.0, Instant::now(), &ctx), SlotResponse::Changed);
        assert_eq!(w.record(StrengthMode::Single).strength_primary, 1.05);
    }

    #[test]
    fn press_outside_zones_is_ignored() {
        let f = Fixture::new();
        let ctx = f.ctx(StrengthMode::Single);
        let mut w = slot("1:a", StrengthMode::Single);
        assert_eq!(
            w.handle_pointer(&PointerEvent::down(2.0, 10.0), Instant::now(), &ctx),
            SlotResponse::Ignored
        );
        assert!(!w.is_pressed());
    }

    #[test]
    fn serialize_value_follows_mode() {
        let mut w = slot("123:foo", StrengthMode::Dual);
        w.commit_number(P, 0.8, StrengthMode::Dual);
        w.commit_number(S, 0.5, StrengthMode::Dual);
        assert_eq!(
            w.serialize_value(StrengthMode::Single),
            json!({"on": true, "lora": "123:foo", "strength": 0.8})
        );
        assert_eq!(
            w.serialize_value(StrengthMode::Dual),
            json!({"on": true, "lora": "123:foo", "strength": 0.8, "strengthTwo": 0.5})
        );
    }

    #[test]
    fn legacy_values_upgrade_on_interaction() {
        let f = Fixture::new();
        let ctx = f.ctx(StrengthMode::Single);
        let mut w = SlotWidget::new("lora_1", SlotValue::Legacy("7:legacy".into()));
        assert!(w.value().is_enabled());
        assert_eq!(
            w.serialize_value(StrengthMode::Single),
            json!({"on": true, "lora": "7:legacy", "strength": 1.0})
        );
        click(&mut w, 20.0, Instant::now(), &ctx);
        assert!(!w.value().is_legacy());
        assert!(!w.record(StrengthMode::Single).enabled);
    }

    #[test]
    fn draw_dims_disabled_text_but_not_toggle() {
        let metrics = LayoutMetrics::default();
        let theme = Theme::default();
        let ctx = DrawContext {
            mode: StrengthMode::Dual,
            metrics: &metrics,
            theme: &theme,
            aggregate: ToggleState::Off,
        };
        let mut w = slot("12@3:Detail Tweaker", StrengthMode::Dual);
        w.value_mut().record_mut(StrengthMode::Dual).enabled = false;
        let mut list = DisplayList::new();
        w.draw(Rect::new(0.0, 30.0, 300.0, 20.0), &mut list, &ctx);

        assert_eq!(list.texts(), vec!["Detail Tweaker", "1.00", "1.00"]);
        let name = list.text_cmd("Detail Tweaker");
        assert!(matches!(name, Some(DrawCmd::Text { alpha, y, .. }) if (*alpha - 0.4).abs() < 1e-6 && *y == 40.0));
        let knob = list
            .commands()
            .iter()
            .find(|c| matches!(c, DrawCmd::Circle { .. }));
        assert_eq!(knob.map(DrawCmd::alpha), Some(1.0));
        assert_eq!(list.global_alpha(), 1.0);
    }

    #[test]
    fn draw_truncates_long_names() {
        let metrics = LayoutMetrics::default();
        let theme = Theme::default();
        let ctx = DrawContext {
            mode: StrengthMode::Single,
            metrics: &metrics,
            theme: &theme,
            aggregate: ToggleState::On,
        };
        let w = slot("1:an extremely long model name that cannot possibly fit", StrengthMode::Single);
        let mut list = DisplayList::new();
        w.draw(Rect::new(0.0, 0.0, 200.0, 20.0), &mut list, &ctx);
        let name = list.texts()[0];
        assert!(name.ends_with('…'));
        // Name zone is 46..132 at this width.
        assert!(list.measure_text(name) <= 86.0);
    }
}
