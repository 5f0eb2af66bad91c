#![forbid(unsafe_code)]

//! The slot list node.
//!
//! [`SlotListNode`] owns the rows of one multi-LoRA node and is the only
//! place structural edits happen. Hosts drive it through the lifecycle
//! methods (`on_created`, `configure`, `serialize`, `on_property_changed`,
//! `extra_menu_options`, `handle_pointer`, `handle_key`, `draw`,
//! `on_menu_choice`) and give it a [`NodeHost`] to talk back through.
//!
//! # Pointer routing
//!
//! A left press picks the row under the pointer and captures it; moves and
//! the release go to the captured row even if the pointer leaves it, so a
//! strength drag keeps working past the row edge. A right press over a slot
//! opens that slot's context menu. Host double clicks go to the row under
//! the pointer.
//!
//! # Number entry
//!
//! At most one entry overlay is open. Keys go to it while it is open; a press
//! outside it commits, the same as focus loss. Structural edits and mode
//! switches drop it without applying.

use serde_json::Value;
use slotkit_core::event::{Event, PointerButton, PointerEvent, PointerEventKind};
use slotkit_core::geometry::{Point, Rect};
use slotkit_core::record::{SlotRecord, StrengthChannel, StrengthMode};
use slotkit_core::selector::Selector;
use slotkit_layout::{ColumnLayout, zones_for};
use slotkit_widgets::menu::{
    BaseModelFilter, ContextAction, Menu, MenuCache, MenuChoice, build_context_menu,
    build_filter_menu,
};
use slotkit_widgets::number_entry::{EntryOutcome, NumberEntry};
use slotkit_widgets::placement::Overlay;
use slotkit_widgets::rows::AuxRow;
use slotkit_widgets::slot::{SlotInteraction, SlotResponse, SlotValue, SlotWidget};
use slotkit_widgets::theme::Theme;
use slotkit_widgets::toggle::ToggleState;
use slotkit_widgets::toggle_all::ToggleAllWidget;
use slotkit_widgets::{Canvas, DrawContext};
use web_time::Instant;

use crate::config::SlotKitConfig;
use crate::host::{MenuTarget, NodeHost};
use crate::lifecycle::{ExtensionChain, NodeExtension};
use crate::migration;
use crate::persist::{self, NodeProperties, RestoreShape, SavedNode};
use crate::widget_list::{NodeWidget, OrderViolation, WidgetList};

/// Property holding the strength mode.
pub const MODE_PROPERTY: &str = "mode";
/// Property holding the base-model filter.
pub const FILTER_PROPERTY: &str = "base_model_filter";

#[derive(Debug, Clone)]
struct OpenEditor {
    slot: usize,
    channel: StrengthChannel,
    entry: NumberEntry,
    area: Rect,
}

/// A multi-LoRA node.
#[derive(Debug)]
pub struct SlotListNode {
    config: SlotKitConfig,
    theme: Theme,
    widgets: WidgetList,
    mode: StrengthMode,
    filter: BaseModelFilter,
    width: f32,
    capture: Option<usize>,
    editor: Option<OpenEditor>,
    menu_cache: MenuCache,
    extensions: ExtensionChain,
}

impl Default for SlotListNode {
    fn default() -> Self {
        Self::new(SlotKitConfig::default())
    }
}

impl SlotListNode {
    /// A node with no slots yet; [`Self::on_created`] or [`Self::configure`]
    /// fills it.
    pub fn new(config: SlotKitConfig) -> Self {
        Self {
            theme: Theme::default(),
            widgets: WidgetList::standard(BaseModelFilter::All),
            mode: config.node.default_mode,
            filter: BaseModelFilter::All,
            width: config.node.default_width,
            capture: None,
            editor: None,
            menu_cache: MenuCache::new(),
            extensions: ExtensionChain::new(),
            config,
        }
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Register a lifecycle extension.
    #[must_use]
    pub fn with_extension(mut self, extension: impl NodeExtension + 'static) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &SlotKitConfig {
        &self.config
    }

    pub fn mode(&self) -> StrengthMode {
        self.mode
    }

    pub fn filter(&self) -> &BaseModelFilter {
        &self.filter
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn widgets(&self) -> &WidgetList {
        &self.widgets
    }

    pub fn extensions(&self) -> &ExtensionChain {
        &self.extensions
    }

    pub fn slot_count(&self) -> usize {
        self.widgets.slot_count()
    }

    pub fn slot(&self, index: usize) -> Option<&SlotWidget> {
        self.widgets.slot(index)
    }

    /// Record view of every slot, in order.
    pub fn records(&self) -> Vec<SlotRecord> {
        self.widgets.slots().map(|s| s.record(self.mode)).collect()
    }

    /// Aggregate enabled state shown by the toggle-all row.
    pub fn toggle_all_state(&self) -> ToggleState {
        ToggleAllWidget::state_of(self.widgets.slot_values())
    }

    /// Text of the open number entry.
    pub fn editor_text(&self) -> Option<&str> {
        self.editor.as_ref().map(|e| e.entry.value())
    }

    /// Slot and channel the open number entry edits.
    pub fn editor_target(&self) -> Option<(usize, StrengthChannel)> {
        self.editor.as_ref().map(|e| (e.slot, e.channel))
    }

    /// Row rectangles for the current rows and width.
    pub fn layout(&self) -> ColumnLayout {
        let heights: Vec<f32> = self
            .widgets
            .iter()
            .map(|w| w.height(&self.config.layout))
            .collect();
        ColumnLayout::stack(self.width, &heights, &self.config.layout)
    }

    /// Verify row order and slot naming.
    pub fn check_invariants(&self) -> Result<(), OrderViolation> {
        self.widgets.check_invariants()
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Called once when the host creates the node. Ensures one slot exists
    /// and upgrades any bare strings a loader already wrote into slot rows.
    pub fn on_created(&mut self, host: &mut dyn NodeHost) {
        self.upgrade_legacy_slots(host);
        if self.widgets.slot_count() == 0 {
            let add = self.widgets.add_position().unwrap_or(self.widgets.len());
            self.widgets.insert_before(add, self.new_slot(Selector::None));
            self.widgets.renumber();
        }
        self.recompute_height(host);
        self.debug_check();
        tracing::debug!(slot_count = self.slot_count(), mode = %self.mode, "slot list node created");
        self.run_extensions(|ext, node| ext.on_created(node, &mut *host));
    }

    /// Restore from a saved node.
    pub fn configure(&mut self, saved: &SavedNode, host: &mut dyn NodeHost) -> RestoreShape {
        self.mode = saved.properties.mode;
        self.filter = saved.properties.base_model_filter.clone();
        self.editor = None;
        self.capture = None;
        let shape = persist::restore(
            &mut self.widgets,
            &saved.widgets_values,
            self.mode,
            self.filter.clone(),
        );
        if matches!(shape, RestoreShape::Degraded(_)) {
            host.set_dirty();
        }
        self.recompute_height(host);
        self.debug_check();
        self.run_extensions(|ext, node| ext.on_configure(node, saved, shape, &mut *host));
        shape
    }

    /// The node as it should be saved. Slots still holding a bare string are
    /// written as their upgraded records, so the result is always canonical.
    pub fn serialize(&self) -> SavedNode {
        let mut saved = SavedNode {
            properties: NodeProperties {
                mode: self.mode,
                base_model_filter: self.filter.clone(),
            },
            widgets_values: persist::serialize_values(&self.widgets, self.mode),
        };
        self.extensions.for_each(|ext| ext.on_serialize(self, &mut saved));
        saved
    }

    /// Write saved values straight into the existing rows, as a generic host
    /// loader does. Bare strings stay legacy until [`Self::on_created`],
    /// [`Self::upgrade_legacy_slots`] or the first interaction with the slot.
    pub fn apply_widget_values(&mut self, values: &[Value]) -> usize {
        persist::apply_widget_values(&mut self.widgets, values)
    }

    /// Convert legacy slot values to records. Idempotent.
    pub fn upgrade_legacy_slots(&mut self, host: &mut dyn NodeHost) -> usize {
        let upgraded = persist::upgrade_legacy_slots(&mut self.widgets, self.mode);
        if upgraded > 0 {
            host.set_dirty();
        }
        upgraded
    }

    /// React to a node property edit. Returns `true` if the property is one
    /// the node understands.
    pub fn on_property_changed(&mut self, name: &str, value: &Value, host: &mut dyn NodeHost) -> bool {
        let handled = match name {
            MODE_PROPERTY => match value.as_str().and_then(StrengthMode::from_property) {
                Some(mode) => {
                    self.set_mode(mode, host);
                    true
                }
                None => {
                    tracing::warn!(value = %value, "ignoring unknown strength mode");
                    false
                }
            },
            FILTER_PROPERTY => {
                let filter = value
                    .as_str()
                    .map_or(BaseModelFilter::All, BaseModelFilter::from_property);
                self.set_filter(filter, host);
                true
            }
            _ => false,
        };
        self.run_extensions(|ext, node| ext.on_property_changed(node, name, value, &mut *host));
        handled
    }

    /// Context menu for the row at node-local `at`, if it is a slot.
    pub fn extra_menu_options(&self, at: Point) -> Option<(Menu, MenuTarget)> {
        let position = self.layout().row_at(at.y)?;
        let index = self.widgets.slot_index_of(position)?;
        let target = MenuTarget::Context(index);
        let mut menu = build_context_menu(index, self.slot_count());
        self.extensions
            .for_each(|ext| ext.extra_menu_options(self, at, target, &mut menu));
        Some((menu, target))
    }

    fn run_extensions(&mut self, mut f: impl FnMut(&mut dyn NodeExtension, &mut Self)) {
        if self.extensions.is_empty() {
            return;
        }
        let mut chain = std::mem::take(&mut self.extensions);
        chain.for_each_mut(|ext| f(ext, self));
        self.extensions = chain;
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    /// Switch strength mode, migrating every slot.
    pub fn set_mode(&mut self, mode: StrengthMode, host: &mut dyn NodeHost) {
        let from = self.mode;
        migration::migrate(self.widgets.slot_values_mut(), from, mode);
        if from == mode {
            return;
        }
        self.mode = mode;
        self.editor = None;
        self.recompute_height(host);
        host.set_dirty();
    }

    /// Change the base-model filter used by selection menus.
    pub fn set_filter(&mut self, filter: BaseModelFilter, host: &mut dyn NodeHost) {
        if let Some(row) = self.widgets.filter_row_mut() {
            row.set_filter(filter.clone());
        }
        tracing::debug!(filter = %filter, "base model filter changed");
        self.filter = filter;
        host.set_dirty();
    }

    /// Change the node width.
    pub fn set_width(&mut self, width: f32, host: &mut dyn NodeHost) {
        self.width = width;
        self.editor = None;
        self.recompute_height(host);
    }

    // -----------------------------------------------------------------------
    // Structural edits
    // -----------------------------------------------------------------------

    fn new_slot(&self, selection: Selector) -> NodeWidget {
        let mut record = SlotRecord::new(selection, self.mode);
        for &channel in self.mode.channels() {
            record.set_strength(channel, self.config.strength.initial);
        }
        NodeWidget::Slot(SlotWidget::new("", SlotValue::Record(record)))
    }

    /// Append a slot before the Add row. Returns its index.
    pub fn add(&mut self, selection: Selector, host: &mut dyn NodeHost) -> usize {
        let slot = self.new_slot(selection);
        let position = self.widgets.add_position().unwrap_or(self.widgets.len());
        self.widgets.insert_before(position, slot);
        let index = self.widgets.slot_count().saturating_sub(1);
        self.after_structural_change("add", index, host);
        index
    }

    /// Delete slot `index`. Out of range is a no-op.
    pub fn remove(&mut self, index: usize, host: &mut dyn NodeHost) -> bool {
        let Some(position) = self.widgets.slot_position(index) else {
            return false;
        };
        self.widgets.remove_at(position);
        self.after_structural_change("remove", index, host);
        true
    }

    /// Swap slot `index` with the one above it.
    pub fn move_up(&mut self, index: usize, host: &mut dyn NodeHost) -> bool {
        if index == 0 {
            return false;
        }
        self.swap_slots(index - 1, index, "move_up", host)
    }

    /// Swap slot `index` with the one below it.
    pub fn move_down(&mut self, index: usize, host: &mut dyn NodeHost) -> bool {
        self.swap_slots(index, index + 1, "move_down", host)
    }

    fn swap_slots(&mut self, upper: usize, lower: usize, op: &'static str, host: &mut dyn NodeHost) -> bool {
        let (Some(a), Some(b)) = (self.widgets.slot_position(upper), self.widgets.slot_position(lower))
        else {
            return false;
        };
        self.widgets.swap(a, b);
        self.after_structural_change(op, upper, host);
        true
    }

    /// Name slots `lora_1..lora_N` in order.
    pub fn renumber(&mut self) {
        self.widgets.renumber();
    }

    /// Resize the host to fit the current rows.
    pub fn recompute_height(&mut self, host: &mut dyn NodeHost) {
        let height = self.layout().height();
        host.set_size(self.width, height);
    }

    /// Append an auxiliary host row after the Add row.
    pub fn push_aux(&mut self, row: AuxRow, host: &mut dyn NodeHost) {
        self.widgets.push(NodeWidget::Aux(row));
        self.recompute_height(host);
        self.debug_check();
    }

    fn after_structural_change(&mut self, op: &'static str, index: usize, host: &mut dyn NodeHost) {
        self.editor = None;
        self.capture = None;
        self.widgets.renumber();
        self.recompute_height(host);
        host.set_dirty();
        tracing::debug!(op, index, slot_count = self.slot_count(), mode = %self.mode, "slot list changed");
        self.debug_check();
    }

    fn debug_check(&self) {
        if let Err(violation) = self.widgets.check_invariants() {
            tracing::error!(%violation, "slot list order broken");
            debug_assert!(false, "slot list order broken: {violation}");
        }
    }

    // -----------------------------------------------------------------------
    // Menus
    // -----------------------------------------------------------------------

    /// Apply a pick from a menu this node asked the host to show.
    /// Returns `false` when the choice does not fit the target.
    pub fn on_menu_choice(&mut self, target: MenuTarget, choice: MenuChoice, host: &mut dyn NodeHost) -> bool {
        match (target, choice) {
            (MenuTarget::Slot(index), MenuChoice::Select(selection)) => {
                let mode = self.mode;
                let Some(slot) = self.widgets.slot_mut(index) else {
                    return false;
                };
                slot.select(selection, mode);
                host.set_dirty();
                true
            }
            (MenuTarget::AddSlot, MenuChoice::Select(selection)) => {
                self.add(selection, host);
                true
            }
            (MenuTarget::Filter, MenuChoice::Filter(filter)) => {
                self.set_filter(filter, host);
                true
            }
            (MenuTarget::Context(index), MenuChoice::Context(action)) => {
                self.apply_context_action(index, action, host)
            }
            (target, choice) => {
                tracing::debug!(?target, ?choice, "menu choice does not match its target");
                false
            }
        }
    }

    /// Run a context menu action on slot `index`.
    pub fn apply_context_action(&mut self, index: usize, action: ContextAction, host: &mut dyn NodeHost) -> bool {
        match action {
            ContextAction::Toggle => {
                let mode = self.mode;
                let Some(slot) = self.widgets.slot_mut(index) else {
                    return false;
                };
                let record = slot.value_mut().record_mut(mode);
                record.enabled = !record.enabled;
                host.set_dirty();
                true
            }
            ContextAction::MoveUp => self.move_up(index, host),
            ContextAction::MoveDown => self.move_down(index, host),
            ContextAction::Remove => self.remove(index, host),
        }
    }

    fn on_add_clicked(&mut self, at: Point, host: &mut dyn NodeHost) {
        let menu = self.menu_cache.get(&host.catalog(), &self.filter);
        if menu.is_none_only() {
            self.add(Selector::None, host);
        } else {
            host.show_menu(&menu, at, MenuTarget::AddSlot);
        }
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Feed a node-local pointer event. Returns `true` if it was consumed.
    pub fn handle_pointer(&mut self, event: &PointerEvent, now: Instant, host: &mut dyn NodeHost) -> bool {
        if let Some(editor) = &self.editor
            && matches!(event.kind, PointerEventKind::Down(_))
        {
            if editor.area.contains(event.x, event.y) {
                return true;
            }
            self.handle_key(&Event::Focus(false), host);
        }

        let layout = self.layout();
        let position = match event.kind {
            PointerEventKind::Down(PointerButton::Right) => {
                return match self.extra_menu_options(event.position()) {
                    Some((menu, target)) => {
                        host.show_menu(&menu, event.position(), target);
                        true
                    }
                    None => false,
                };
            }
            PointerEventKind::Down(PointerButton::Left) => {
                self.capture = layout.row_at(event.y);
                self.capture
            }
            PointerEventKind::Move => self.capture,
            PointerEventKind::Up(PointerButton::Left) => self.capture.take(),
            PointerEventKind::DoubleClick(PointerButton::Left) => layout.row_at(event.y),
            _ => None,
        };
        let Some(position) = position else {
            return false;
        };
        let Some(row) = layout.rows().get(position).copied() else {
            return false;
        };
        let local = event.translated(-row.x, -row.y);
        self.dispatch(position, row, &local, now, host)
    }

    fn dispatch(
        &mut self,
        position: usize,
        row: Rect,
        local: &PointerEvent,
        now: Instant,
        host: &mut dyn NodeHost,
    ) -> bool {
        let to_node = |p: Point| p.offset(row.x, row.y);
        let width = self.width;
        let slot_index = self.widgets.slot_index_of(position);

        match self.widgets.get_mut(position) {
            Some(NodeWidget::Slot(slot)) => {
                let ctx = SlotInteraction {
                    mode: self.mode,
                    width,
                    metrics: &self.config.layout,
                    gesture: &self.config.gesture,
                    step: self.config.strength.step,
                };
                let response = slot.handle_pointer(local, now, &ctx);
                let Some(index) = slot_index else {
                    return false;
                };
                match response {
                    SlotResponse::Ignored => false,
                    SlotResponse::Consumed => true,
                    SlotResponse::Changed => {
                        host.set_dirty();
                        true
                    }
                    SlotResponse::OpenMenu(at) => {
                        let menu = self.menu_cache.get(&host.catalog(), &self.filter);
                        host.show_menu(&menu, to_node(at), MenuTarget::Slot(index));
                        true
                    }
                    SlotResponse::EditNumber { channel, at } => {
                        self.open_editor(index, channel, row, to_node(at), host);
                        true
                    }
                }
            }
            Some(NodeWidget::ToggleAll(toggle)) => {
                if toggle.handle_pointer(local, width, &self.config.layout) {
                    self.toggle_all(host);
                }
                true
            }
            Some(NodeWidget::Add(add)) => {
                if add.handle_pointer(local, width, row.height, self.config.layout.margin) {
                    self.on_add_clicked(to_node(local.position()), host);
                }
                true
            }
            Some(NodeWidget::Filter(filter)) => {
                if filter.handle_pointer(local, width, row.height, self.config.layout.margin) {
                    let menu = build_filter_menu(&host.catalog());
                    host.show_menu(&menu, to_node(local.position()), MenuTarget::Filter);
                }
                true
            }
            Some(NodeWidget::Aux(_)) | None => false,
        }
    }

    fn toggle_all(&mut self, host: &mut dyn NodeHost) {
        let state = self.toggle_all_state();
        let enabled = ToggleAllWidget::apply(self.widgets.slot_values_mut(), state, self.mode);
        tracing::debug!(enabled, slot_count = self.slot_count(), "toggle all applied");
        host.set_dirty();
    }

    fn open_editor(&mut self, index: usize, channel: StrengthChannel, row: Rect, at: Point, host: &mut dyn NodeHost) {
        let Some(slot) = self.widgets.slot(index) else {
            return;
        };
        let initial = slot.record(self.mode).strength(channel);
        let zones = zones_for(self.width, self.mode, &self.config.layout);
        let Some(group) = zones.group(channel) else {
            return;
        };
        let entry_width = self.config.node.number_entry_width;
        let number = group.number.translate(row.x, row.y);
        let anchor = Rect::new(at.x - entry_width / 2.0, number.y, entry_width, number.height);
        let viewport = Rect::new(0.0, 0.0, self.width, self.layout().height());
        let Some(area) = Overlay::new(anchor, entry_width, self.config.layout.row_height).compute_area(viewport)
        else {
            return;
        };
        tracing::debug!(index, channel = ?channel, initial, "number entry opened");
        self.editor = Some(OpenEditor {
            slot: index,
            channel,
            entry: NumberEntry::new(initial),
            area,
        });
        host.set_dirty();
    }

    /// Feed a key or focus event to the open number entry. Returns `false`
    /// when no entry is open.
    pub fn handle_key(&mut self, event: &Event, host: &mut dyn NodeHost) -> bool {
        let Some(editor) = self.editor.as_mut() else {
            return false;
        };
        match editor.entry.handle_event(event) {
            EntryOutcome::Pending { changed } => {
                if changed {
                    host.set_dirty();
                }
            }
            EntryOutcome::Commit(value) => {
                let mode = self.mode;
                if let Some(editor) = self.editor.take() {
                    match value {
                        Some(v) => {
                            if let Some(slot) = self.widgets.slot_mut(editor.slot) {
                                slot.commit_number(editor.channel, v, mode);
                            }
                        }
                        None => tracing::debug!(text = editor.entry.value(), "number entry ignored"),
                    }
                }
                host.set_dirty();
            }
            EntryOutcome::Cancel => {
                self.editor = None;
                host.set_dirty();
            }
        }
        true
    }

    // -----------------------------------------------------------------------
    // Paint
    // -----------------------------------------------------------------------

    /// Paint every row, then the number entry on top.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        let layout = self.layout();
        let ctx = DrawContext {
            mode: self.mode,
            metrics: &self.config.layout,
            theme: &self.theme,
            aggregate: self.toggle_all_state(),
        };
        for (widget, row) in self.widgets.iter().zip(layout.rows()) {
            widget.as_widget().draw(*row, canvas, &ctx);
        }
        if let Some(editor) = &self.editor {
            editor.entry.draw(editor.area, canvas, &self.theme);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;
    use serde_json::json;
    use slotkit_core::catalog::{CatalogEntry, CatalogSnapshot, ModelFolder};
    use slotkit_core::event::{KeyCode, KeyEvent};
    use slotkit_widgets::canvas::DisplayList;
    use std::sync::Arc;

    const P: StrengthChannel = StrengthChannel::Primary;

    fn created() -> (SlotListNode, RecordingHost) {
        let mut host = RecordingHost::new();
        let mut node = SlotListNode::default();
        node.on_created(&mut host);
        (node, host)
    }

    fn slot_row(node: &SlotListNode, index: usize) -> Rect {
        let position = node.widgets().slot_position(index).unwrap();
        node.layout().rows()[position]
    }

    fn row_of<F: Fn(&NodeWidget) -> bool>(node: &SlotListNode, pred: F) -> Rect {
        let position = node.widgets().iter().position(pred).unwrap();
        node.layout().rows()[position]
    }

    fn click(node: &mut SlotListNode, host: &mut RecordingHost, x: f32, y: f32) -> bool {
        let now = Instant::now();
        node.handle_pointer(&PointerEvent::down(x, y), now, host);
        node.handle_pointer(&PointerEvent::up(x, y), now, host)
    }

    fn key(node: &mut SlotListNode, host: &mut RecordingHost, code: KeyCode) {
        node.handle_key(&Event::Key(KeyEvent::new(code)), host);
    }

    fn names(node: &SlotListNode) -> Vec<String> {
        node.widgets().slots().map(|s| s.name().to_owned()).collect()
    }

    fn selections(node: &SlotListNode) -> Vec<String> {
        node.records().iter().map(|r| r.selection.to_string()).collect()
    }

    #[test]
    fn created_node_has_one_empty_slot_and_a_size() {
        let (node, host) = created();
        assert_eq!(node.slot_count(), 1);
        let rec = &node.records()[0];
        assert!(!rec.enabled);
        assert!(rec.selection.is_none());
        assert_eq!(host.last_size(), Some((node.width(), node.layout().height())));
        node.check_invariants().unwrap();
    }

    #[test]
    fn add_remove_and_moves_renumber() {
        let (mut node, mut host) = created();
        node.add(Selector::from("1:a"), &mut host);
        node.add(Selector::from("2:b"), &mut host);
        assert_eq!(names(&node), ["lora_1", "lora_2", "lora_3"]);

        assert!(node.move_up(2, &mut host));
        assert_eq!(selections(&node), ["None", "2:b", "1:a"]);
        assert!(!node.move_up(0, &mut host));
        assert!(!node.move_down(2, &mut host));
        assert!(node.move_down(0, &mut host));
        assert_eq!(selections(&node), ["2:b", "None", "1:a"]);

        assert!(node.remove(1, &mut host));
        assert!(!node.remove(5, &mut host));
        assert_eq!(selections(&node), ["2:b", "1:a"]);
        assert_eq!(names(&node), ["lora_1", "lora_2"]);
        node.check_invariants().unwrap();
    }

    #[test]
    fn height_follows_slot_count() {
        let (mut node, mut host) = created();
        let before = host.last_size().unwrap().1;
        node.add(Selector::None, &mut host);
        let after = host.last_size().unwrap().1;
        let m = &node.config().layout;
        assert_eq!(after - before, m.row_height + m.row_gap);
    }

    #[test]
    fn add_in_dual_mode_sets_secondary() {
        let (mut node, mut host) = created();
        node.set_mode(StrengthMode::Dual, &mut host);
        node.add(Selector::from("1:a"), &mut host);
        let rec = &node.records()[1];
        assert!(rec.enabled);
        assert_eq!(rec.strength_secondary, Some(1.0));
    }

    #[test]
    fn add_with_empty_catalog_adds_none_directly() {
        let (mut node, mut host) = created();
        let add = row_of(&node, |w| matches!(w, NodeWidget::Add(_)));
        click(&mut node, &mut host, add.center_x(), add.center_y());
        assert_eq!(node.slot_count(), 2);
        assert!(host.menus().is_empty());
    }

    #[test]
    fn add_with_catalog_asks_host_for_a_choice() {
        let catalog = CatalogSnapshot::with_entries(
            ModelFolder::Loras,
            vec![CatalogEntry::new(12, Some(3), "Detail").with_base_model("SDXL")],
        );
        let mut host = RecordingHost::new().with_catalog(Arc::new(catalog));
        let mut node = SlotListNode::default();
        node.on_created(&mut host);

        let add = row_of(&node, |w| matches!(w, NodeWidget::Add(_)));
        click(&mut node, &mut host, add.center_x(), add.center_y());
        assert_eq!(node.slot_count(), 1);
        let shown = host.take_last_menu().unwrap();
        assert_eq!(shown.target, MenuTarget::AddSlot);
        assert_eq!(shown.menu.labels(), ["None", "Detail"]);

        let pick = shown.menu.choices()[1].clone();
        assert!(node.on_menu_choice(shown.target, pick, &mut host));
        assert_eq!(selections(&node), ["None", "12@3:Detail"]);
        assert!(node.records()[1].enabled);
    }

    #[test]
    fn name_click_opens_selection_menu_for_that_slot() {
        let (mut node, mut host) = created();
        node.add(Selector::from("1:a"), &mut host);
        let row = slot_row(&node, 1);
        click(&mut node, &mut host, 100.0, row.center_y());
        let shown = host.take_last_menu().unwrap();
        assert_eq!(shown.target, MenuTarget::Slot(1));
        assert_eq!(shown.at, Point::new(100.0, row.center_y()));

        node.on_menu_choice(MenuTarget::Slot(1), MenuChoice::Select(Selector::None), &mut host);
        assert!(!node.records()[1].enabled);
    }

    #[test]
    fn toggle_click_routes_to_the_right_slot() {
        let (mut node, mut host) = created();
        node.add(Selector::from("1:a"), &mut host);
        let row = slot_row(&node, 1);
        let dirty = host.dirty_count();
        assert!(click(&mut node, &mut host, 20.0, row.center_y()));
        assert!(!node.records()[1].enabled);
        assert!(host.dirty_count() > dirty);
    }

    #[test]
    fn toggle_all_row_sets_every_slot() {
        let (mut node, mut host) = created();
        node.add(Selector::from("1:a"), &mut host);
        assert_eq!(node.toggle_all_state(), ToggleState::Partial);
        let row = row_of(&node, |w| matches!(w, NodeWidget::ToggleAll(_)));
        click(&mut node, &mut host, 20.0, row.center_y());
        assert_eq!(node.toggle_all_state(), ToggleState::On);
        click(&mut node, &mut host, 20.0, row.center_y());
        assert_eq!(node.toggle_all_state(), ToggleState::Off);
        assert!(node.records().iter().all(|r| !r.enabled));
    }

    #[test]
    fn right_click_shows_context_menu_and_actions_apply() {
        let (mut node, mut host) = created();
        node.add(Selector::from("1:a"), &mut host);
        let row = slot_row(&node, 1);
        let now = Instant::now();
        let right = PointerEvent::new(PointerEventKind::Down(PointerButton::Right), 50.0, row.center_y());
        assert!(node.handle_pointer(&right, now, &mut host));
        let shown = host.take_last_menu().unwrap();
        assert_eq!(shown.target, MenuTarget::Context(1));
        assert_eq!(shown.menu.labels(), ["Toggle", "Move Up", "Move Down", "Remove"]);

        assert!(node.on_menu_choice(shown.target, MenuChoice::Context(ContextAction::MoveUp), &mut host));
        assert_eq!(selections(&node), ["1:a", "None"]);
        assert!(node.apply_context_action(0, ContextAction::Toggle, &mut host));
        assert!(!node.records()[0].enabled);
        assert!(node.apply_context_action(0, ContextAction::Remove, &mut host));
        assert_eq!(node.slot_count(), 1);

        let toggle_all = row_of(&node, |w| matches!(w, NodeWidget::ToggleAll(_)));
        let right = PointerEvent::new(PointerEventKind::Down(PointerButton::Right), 50.0, toggle_all.center_y());
        assert!(!node.handle_pointer(&right, now, &mut host));
    }

    #[test]
    fn mismatched_menu_choice_is_rejected() {
        let (mut node, mut host) = created();
        assert!(!node.on_menu_choice(
            MenuTarget::Filter,
            MenuChoice::Select(Selector::None),
            &mut host
        ));
        assert!(!node.on_menu_choice(
            MenuTarget::Slot(9),
            MenuChoice::Select(Selector::None),
            &mut host
        ));
    }

    fn open_entry(node: &mut SlotListNode, host: &mut RecordingHost) {
        let row = slot_row(node, 0);
        let zones = zones_for(node.width(), node.mode(), &node.config().layout);
        let number = zones.group(P).unwrap().number;
        let ev = PointerEvent::double_click(number.center_x(), row.center_y());
        assert!(node.handle_pointer(&ev, Instant::now(), host));
    }

    #[test]
    fn number_entry_commits_typed_value() {
        let (mut node, mut host) = created();
        open_entry(&mut node, &mut host);
        assert_eq!(node.editor_text(), Some("1.00"));
        assert_eq!(node.editor_target(), Some((0, P)));
        for c in ['0', '.', '4', '2', '1'] {
            key(&mut node, &mut host, KeyCode::Char(c));
        }
        key(&mut node, &mut host, KeyCode::Enter);
        assert_eq!(node.editor_text(), None);
        assert_eq!(node.records()[0].strength_primary, 0.42);
    }

    #[test]
    fn number_entry_clamps_and_ignores_garbage() {
        let (mut node, mut host) = created();
        open_entry(&mut node, &mut host);
        for c in ['9', '9'] {
            key(&mut node, &mut host, KeyCode::Char(c));
        }
        key(&mut node, &mut host, KeyCode::Enter);
        assert_eq!(node.records()[0].strength_primary, 20.0);

        open_entry(&mut node, &mut host);
        key(&mut node, &mut host, KeyCode::Char('x'));
        key(&mut node, &mut host, KeyCode::Enter);
        assert_eq!(node.records()[0].strength_primary, 20.0);
        assert_eq!(node.editor_text(), None);
    }

    #[test]
    fn number_entry_escape_and_outside_press() {
        let (mut node, mut host) = created();
        open_entry(&mut node, &mut host);
        key(&mut node, &mut host, KeyCode::Char('3'));
        key(&mut node, &mut host, KeyCode::Escape);
        assert_eq!(node.records()[0].strength_primary, 1.0);

        open_entry(&mut node, &mut host);
        key(&mut node, &mut host, KeyCode::Char('3'));
        let filter = row_of(&node, |w| matches!(w, NodeWidget::Filter(_)));
        node.handle_pointer(&PointerEvent::down(2.0, filter.y), Instant::now(), &mut host);
        assert_eq!(node.editor_text(), None);
        assert_eq!(node.records()[0].strength_primary, 3.0);
    }

    #[test]
    fn keys_without_entry_are_not_consumed() {
        let (mut node, mut host) = created();
        assert!(!node.handle_key(&Event::Key(KeyEvent::new(KeyCode::Enter)), &mut host));
    }

    #[test]
    fn drag_keeps_capture_outside_the_row() {
        let (mut node, mut host) = created();
        let row = slot_row(&node, 0);
        let zones = zones_for(node.width(), node.mode(), &node.config().layout);
        let x = zones.group(P).unwrap().number.center_x();
        let now = Instant::now();
        node.handle_pointer(&PointerEvent::down(x, row.center_y()), now, &mut host);
        node.handle_pointer(&PointerEvent::moved(x + 50.0, row.center_y() + 200.0), now, &mut host);
        node.handle_pointer(&PointerEvent::up(x + 50.0, row.center_y() + 200.0), now, &mut host);
        assert_eq!(node.records()[0].strength_primary, 1.5);
    }

    #[test]
    fn mode_property_migrates_slots() {
        let (mut node, mut host) = created();
        node.add(Selector::from("1:a"), &mut host);
        assert!(node.on_property_changed(MODE_PROPERTY, &json!("Dual"), &mut host));
        assert_eq!(node.mode(), StrengthMode::Dual);
        assert!(node.records().iter().all(|r| r.strength_secondary == Some(1.0)));
        assert!(!node.on_property_changed(MODE_PROPERTY, &json!("Triple"), &mut host));
        assert!(node.on_property_changed(MODE_PROPERTY, &json!("Single"), &mut host));
        assert!(node.records().iter().all(|r| r.strength_secondary.is_none()));
        assert!(!node.on_property_changed("title", &json!("x"), &mut host));
    }

    #[test]
    fn filter_property_narrows_menus() {
        let catalog = CatalogSnapshot::with_entries(
            ModelFolder::Loras,
            vec![
                CatalogEntry::new(1, None, "a").with_base_model("SD 1.5"),
                CatalogEntry::new(2, None, "b").with_base_model("SDXL"),
            ],
        );
        let mut host = RecordingHost::new().with_catalog(Arc::new(catalog));
        let mut node = SlotListNode::default();
        node.on_created(&mut host);
        node.on_property_changed(FILTER_PROPERTY, &json!("SDXL"), &mut host);
        assert_eq!(node.filter(), &BaseModelFilter::Only("SDXL".into()));

        let row = slot_row(&node, 0);
        click(&mut node, &mut host, 100.0, row.center_y());
        assert_eq!(host.take_last_menu().unwrap().menu.labels(), ["None", "b"]);

        let filter_row = row_of(&node, |w| matches!(w, NodeWidget::Filter(_)));
        click(&mut node, &mut host, filter_row.center_x(), filter_row.center_y());
        let shown = host.take_last_menu().unwrap();
        assert_eq!(shown.target, MenuTarget::Filter);
        assert_eq!(shown.menu.labels(), ["All", "SD 1.5", "SDXL"]);
        node.on_menu_choice(shown.target, MenuChoice::Filter(BaseModelFilter::All), &mut host);
        assert_eq!(node.filter(), &BaseModelFilter::All);
    }

    #[test]
    fn serialize_configure_round_trip() {
        let (mut node, mut host) = created();
        node.set_mode(StrengthMode::Dual, &mut host);
        node.add(Selector::from("123:foo"), &mut host);
        node.push_aux(AuxRow::new("seed", json!(7)), &mut host);
        let saved = node.serialize();
        assert_eq!(saved.widgets_values.len(), 6);
        assert_eq!(saved.widgets_values[0], Value::Null);
        assert_eq!(saved.widgets_values[4], Value::Null);
        assert_eq!(saved.widgets_values[5], json!(7));

        let mut restored = SlotListNode::default();
        restored.on_created(&mut host);
        restored.push_aux(AuxRow::new("seed", json!(0)), &mut host);
        let shape = restored.configure(&saved, &mut host);
        assert_eq!(shape, RestoreShape::Canonical(2));
        assert_eq!(restored.mode(), StrengthMode::Dual);
        assert_eq!(restored.records(), node.records());
        assert_eq!(restored.serialize(), saved);
    }

    #[test]
    fn degraded_load_then_upgrade() {
        let (mut node, mut host) = created();
        node.apply_widget_values(&[Value::Null, Value::Null, json!("4:old")]);
        assert!(node.slot(0).unwrap().value().is_legacy());
        assert_eq!(node.upgrade_legacy_slots(&mut host), 1);
        assert_eq!(node.upgrade_legacy_slots(&mut host), 0);
        assert!(node.records()[0].enabled);
    }

    #[test]
    fn degraded_saved_values_configure_into_records() {
        let (mut node, mut host) = created();
        let saved = SavedNode::from_value(json!({
            "properties": {"mode": "Single"},
            "widgets_values": [null, null, "123:foo", "None", null]
        }))
        .unwrap();
        let dirty_before = host.dirty_count();
        assert_eq!(node.configure(&saved, &mut host), RestoreShape::Degraded(2));
        assert!(host.dirty_count() > dirty_before);
        node.check_invariants().unwrap();

        let records = node.records();
        assert_eq!(records.len(), 2);
        assert!(records[0].enabled);
        assert_eq!(records[0].selection, Selector::from("123:foo"));
        assert!(!records[1].enabled);
        assert!(records[1].selection.is_none());
        assert!(node.widgets().slot_values().all(|v| !v.is_legacy()));
    }

    #[test]
    fn applied_strings_survive_save_and_reload() {
        let (mut node, mut host) = created();
        node.apply_widget_values(&[Value::Null, Value::Null, json!("4:old")]);
        let saved = node.serialize();
        assert_eq!(saved.widgets_values[2], json!({"on": true, "lora": "4:old", "strength": 1.0}));

        let mut reloaded = SlotListNode::default();
        reloaded.on_created(&mut host);
        assert_eq!(reloaded.configure(&saved, &mut host), RestoreShape::Canonical(1));
        assert_eq!(reloaded.records()[0].selection, Selector::from("4:old"));
        assert!(reloaded.records()[0].enabled);
    }

    #[test]
    fn creation_upgrades_strings_written_before_it() {
        let mut host = RecordingHost::new();
        let mut node = SlotListNode::default();
        node.add(Selector::None, &mut host);
        node.apply_widget_values(&[Value::Null, Value::Null, json!("5:early")]);
        node.on_created(&mut host);
        assert_eq!(node.slot_count(), 1);
        assert!(!node.slot(0).unwrap().value().is_legacy());
        assert_eq!(node.records()[0].selection, Selector::from("5:early"));
    }

    #[test]
    fn draw_paints_rows_and_entry() {
        let (mut node, mut host) = created();
        node.add(Selector::from("1:Detail"), &mut host);
        let mut list = DisplayList::new();
        node.draw(&mut list);
        let texts = list.texts();
        assert!(texts.contains(&"Base model: All"));
        assert!(texts.contains(&"Toggle All"));
        assert!(texts.contains(&"Detail"));
        assert!(texts.contains(&"+ Add LoRA"));

        open_entry(&mut node, &mut host);
        list.clear();
        node.draw(&mut list);
        assert_eq!(list.texts().last(), Some(&"1.00"));
    }

    struct Stamp;

    impl NodeExtension for Stamp {
        fn name(&self) -> &str {
            "stamp"
        }

        fn on_created(&mut self, node: &mut SlotListNode, host: &mut dyn NodeHost) {
            node.add(Selector::from("9:stamped"), host);
        }

        fn on_serialize(&self, _node: &SlotListNode, saved: &mut SavedNode) {
            saved.widgets_values.push(json!("stamp"));
        }

        fn extra_menu_options(&self, _node: &SlotListNode, _at: Point, _target: MenuTarget, menu: &mut Menu) {
            menu.items.push(slotkit_widgets::menu::MenuItem::entry(
                "Stamp",
                MenuChoice::Select(Selector::None),
            ));
        }
    }

    #[test]
    fn extensions_run_after_core_hooks() {
        let mut host = RecordingHost::new();
        let mut node = SlotListNode::default().with_extension(Stamp);
        node.on_created(&mut host);
        assert_eq!(selections(&node), ["None", "9:stamped"]);
        assert_eq!(node.extensions().names(), ["stamp"]);
        assert_eq!(node.serialize().widgets_values.last(), Some(&json!("stamp")));

        let row = slot_row(&node, 0);
        let (menu, _) = node.extra_menu_options(Point::new(10.0, row.center_y())).unwrap();
        assert_eq!(menu.labels().last(), Some(&"Stamp"));
    }
}
