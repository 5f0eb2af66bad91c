#![forbid(unsafe_code)]

//! Ordered widget rows of a node.
//!
//! # Row order
//!
//! ```text
//! [Filter] [ToggleAll] Slot* Add Aux*
//! ```
//!
//! Slots sit directly before the Add row, and only auxiliary host rows may
//! follow it. [`WidgetList::check_invariants`] verifies this; the node runs
//! it after every structural edit.

use slotkit_layout::LayoutMetrics;
use slotkit_widgets::menu::BaseModelFilter;
use slotkit_widgets::rows::{AddButton, AuxRow, FilterRow};
use slotkit_widgets::slot::{SlotValue, SlotWidget};
use slotkit_widgets::toggle_all::ToggleAllWidget;
use slotkit_widgets::Widget;

/// Widget name prefix of slot rows.
pub const SLOT_PREFIX: &str = "lora_";

/// Name of the `n`th slot (1-based).
pub fn slot_name(n: usize) -> String {
    format!("{SLOT_PREFIX}{n}")
}

/// One row of a node.
#[derive(Debug, Clone)]
pub enum NodeWidget {
    Filter(FilterRow),
    ToggleAll(ToggleAllWidget),
    Slot(SlotWidget),
    Add(AddButton),
    Aux(AuxRow),
}

impl NodeWidget {
    /// The row as a paintable widget.
    pub fn as_widget(&self) -> &dyn Widget {
        match self {
            Self::Filter(w) => w,
            Self::ToggleAll(w) => w,
            Self::Slot(w) => w,
            Self::Add(w) => w,
            Self::Aux(w) => w,
        }
    }

    /// Row height under `metrics`.
    pub fn height(&self, metrics: &LayoutMetrics) -> f32 {
        self.as_widget().height(metrics)
    }

    pub fn as_slot(&self) -> Option<&SlotWidget> {
        match self {
            Self::Slot(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_slot_mut(&mut self) -> Option<&mut SlotWidget> {
        match self {
            Self::Slot(w) => Some(w),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Filter(_) => "filter",
            Self::ToggleAll(_) => "toggle_all",
            Self::Slot(_) => "slot",
            Self::Add(_) => "add",
            Self::Aux(_) => "aux",
        }
    }
}

/// Row order violation reported by [`WidgetList::check_invariants`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderViolation {
    pub position: usize,
    pub message: String,
}

impl std::fmt::Display for OrderViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "widget {}: {}", self.position, self.message)
    }
}

impl std::error::Error for OrderViolation {}

/// The ordered rows of one node.
#[derive(Debug, Clone)]
pub struct WidgetList {
    widgets: Vec<NodeWidget>,
}

impl WidgetList {
    /// Filter row, toggle-all, and the Add button; no slots.
    pub fn standard(filter: BaseModelFilter) -> Self {
        Self {
            widgets: vec![
                NodeWidget::Filter(FilterRow::new(filter)),
                NodeWidget::ToggleAll(ToggleAllWidget::new()),
                NodeWidget::Add(AddButton::new()),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeWidget> {
        self.widgets.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, NodeWidget> {
        self.widgets.iter_mut()
    }

    pub fn get(&self, position: usize) -> Option<&NodeWidget> {
        self.widgets.get(position)
    }

    pub fn get_mut(&mut self, position: usize) -> Option<&mut NodeWidget> {
        self.widgets.get_mut(position)
    }

    /// Insert `widget` so that it lands at `position`.
    /// Positions past the end append.
    pub fn insert_before(&mut self, position: usize, widget: NodeWidget) {
        let position = position.min(self.widgets.len());
        self.widgets.insert(position, widget);
    }

    /// Remove the row at `position`.
    pub fn remove_at(&mut self, position: usize) -> Option<NodeWidget> {
        (position < self.widgets.len()).then(|| self.widgets.remove(position))
    }

    /// Swap two rows. Returns `false` if either position is out of range.
    pub fn swap(&mut self, a: usize, b: usize) -> bool {
        if a < self.widgets.len() && b < self.widgets.len() {
            self.widgets.swap(a, b);
            true
        } else {
            false
        }
    }

    /// Append a row at the very end.
    pub fn push(&mut self, widget: NodeWidget) {
        self.widgets.push(widget);
    }

    /// Position of the Add row.
    pub fn add_position(&self) -> Option<usize> {
        self.widgets
            .iter()
            .position(|w| matches!(w, NodeWidget::Add(_)))
    }

    /// Row positions of the slots, in slot order.
    pub fn slot_positions(&self) -> Vec<usize> {
        self.widgets
            .iter()
            .enumerate()
            .filter_map(|(i, w)| matches!(w, NodeWidget::Slot(_)).then_some(i))
            .collect()
    }

    /// Row position of slot `index`.
    pub fn slot_position(&self, index: usize) -> Option<usize> {
        self.widgets
            .iter()
            .enumerate()
            .filter(|(_, w)| matches!(w, NodeWidget::Slot(_)))
            .nth(index)
            .map(|(i, _)| i)
    }

    /// Slot index of the row at `position`.
    pub fn slot_index_of(&self, position: usize) -> Option<usize> {
        if !matches!(self.widgets.get(position), Some(NodeWidget::Slot(_))) {
            return None;
        }
        Some(
            self.widgets[..position]
                .iter()
                .filter(|w| matches!(w, NodeWidget::Slot(_)))
                .count(),
        )
    }

    pub fn slot_count(&self) -> usize {
        self.slots().count()
    }

    pub fn slots(&self) -> impl Iterator<Item = &SlotWidget> {
        self.widgets.iter().filter_map(NodeWidget::as_slot)
    }

    pub fn slots_mut(&mut self) -> impl Iterator<Item = &mut SlotWidget> {
        self.widgets.iter_mut().filter_map(NodeWidget::as_slot_mut)
    }

    /// Slot values, in slot order.
    pub fn slot_values(&self) -> impl Iterator<Item = &SlotValue> {
        self.slots().map(SlotWidget::value)
    }

    pub fn slot_values_mut(&mut self) -> impl Iterator<Item = &mut SlotValue> {
        self.slots_mut().map(SlotWidget::value_mut)
    }

    pub fn slot(&self, index: usize) -> Option<&SlotWidget> {
        self.slots().nth(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut SlotWidget> {
        self.slots_mut().nth(index)
    }

    pub fn filter_row_mut(&mut self) -> Option<&mut FilterRow> {
        self.widgets.iter_mut().find_map(|w| match w {
            NodeWidget::Filter(row) => Some(row),
            _ => None,
        })
    }

    /// Auxiliary rows, in order.
    pub fn aux_rows(&self) -> impl Iterator<Item = &AuxRow> {
        self.widgets.iter().filter_map(|w| match w {
            NodeWidget::Aux(row) => Some(row),
            _ => None,
        })
    }

    /// Remove and return every auxiliary row, preserving order.
    pub fn take_aux(&mut self) -> Vec<AuxRow> {
        let mut aux = Vec::new();
        let mut kept = Vec::with_capacity(self.widgets.len());
        for widget in self.widgets.drain(..) {
            match widget {
                NodeWidget::Aux(row) => aux.push(row),
                other => kept.push(other),
            }
        }
        self.widgets = kept;
        aux
    }

    /// Name slots `lora_1..lora_N` in row order. One pass.
    pub fn renumber(&mut self) {
        for (i, slot) in self.slots_mut().enumerate() {
            let name = slot_name(i + 1);
            if slot.name() != name {
                slot.set_name(name);
            }
        }
    }

    /// Verify the row order and slot naming.
    pub fn check_invariants(&self) -> Result<(), OrderViolation> {
        let violation = |position: usize, message: String| Err(OrderViolation { position, message });

        let Some(add) = self.add_position() else {
            return violation(self.widgets.len(), "missing Add row".into());
        };
        let mut slot_seen = false;
        let mut slot_number = 0;
        for (i, widget) in self.widgets.iter().enumerate() {
            match widget {
                NodeWidget::Filter(_) | NodeWidget::ToggleAll(_) if slot_seen || i > add => {
                    return violation(i, format!("{} row after slots", widget.kind()));
                }
                NodeWidget::Slot(slot) => {
                    if i > add {
                        return violation(i, "slot after Add row".into());
                    }
                    slot_seen = true;
                    slot_number += 1;
                    if slot.name() != slot_name(slot_number) {
                        return violation(
                            i,
                            format!("slot named {} expected {}", slot.name(), slot_name(slot_number)),
                        );
                    }
                }
                NodeWidget::Add(_) if i != add => {
                    return violation(i, "second Add row".into());
                }
                NodeWidget::Aux(_) if i < add => {
                    return violation(i, "aux row before Add row".into());
                }
                _ => {}
            }
        }
        Ok(())
    }
}
