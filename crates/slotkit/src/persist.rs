#![forbid(unsafe_code)]

//! Save and restore of slot list nodes.
//!
//! # Saved shape
//!
//! ```json
//! {
//!   "properties": { "mode": "Single", "base_model_filter": "All" },
//!   "widgets_values": [null, null, {"on": true, "lora": "123:foo", "strength": 0.8}, null, "aux"]
//! }
//! ```
//!
//! `widgets_values` follows row order: filter (null), toggle-all (null), one
//! record per slot, Add (null), then auxiliary values.
//!
//! # Restore
//!
//! Slot values are the run that follows the two header rows (filter and
//! toggle-all) and ends at the Add row's null.
//!
//! 1. Canonical: every value in the run is an object with a `lora` key.
//! 2. Degraded: some loaders only manage a bare selection string per slot,
//!    either in saved data or written straight into existing slot rows
//!    ([`apply_widget_values`]). Strings in the run restore as slots and are
//!    upgraded to records on the spot (`enabled = selection != None`, default
//!    strengths, secondary only in dual mode). [`upgrade_legacy_slots`] does
//!    the same for rows filled after creation.
//! 3. Empty: nothing slot-shaped restores a single empty slot.
//!
//! Auxiliary rows survive a restore in their original order and take the
//! trailing non-null values after the run, matched from the end.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use slotkit_core::record::{SlotRecord, StrengthMode};
use slotkit_core::selector::Selector;
use slotkit_widgets::menu::BaseModelFilter;
use slotkit_widgets::slot::{SlotValue, SlotWidget};

use crate::widget_list::{NodeWidget, WidgetList};

/// Node-level properties as saved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeProperties {
    #[serde(deserialize_with = "lenient_mode")]
    pub mode: StrengthMode,
    pub base_model_filter: BaseModelFilter,
}

fn lenient_mode<'de, D: Deserializer<'de>>(de: D) -> Result<StrengthMode, D::Error> {
    let raw = Option::<String>::deserialize(de)?;
    Ok(match raw.as_deref().map(StrengthMode::from_property) {
        Some(Some(mode)) => mode,
        Some(None) => {
            tracing::warn!(mode = ?raw, "unknown saved strength mode, using Single");
            StrengthMode::Single
        }
        None => StrengthMode::Single,
    })
}

/// A node as written to the graph file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedNode {
    pub properties: NodeProperties,
    pub widgets_values: Vec<Value>,
}

impl SavedNode {
    /// Parse a saved node.
    pub fn from_json_str(s: &str) -> Result<Self, PersistError> {
        serde_json::from_str(s).map_err(PersistError::Json)
    }

    /// Read a saved node out of an already-parsed document.
    pub fn from_value(value: Value) -> Result<Self, PersistError> {
        serde_json::from_value(value).map_err(PersistError::Json)
    }

    /// Serialize to a JSON string.
    pub fn to_json_string(&self) -> Result<String, PersistError> {
        serde_json::to_string(self).map_err(PersistError::Json)
    }

    /// Slot records present in `widgets_values`, in order.
    pub fn slot_records(&self) -> Vec<SlotRecord> {
        self.widgets_values
            .iter()
            .filter_map(SlotRecord::from_wire)
            .collect()
    }
}

/// Errors from reading or writing saved nodes.
#[derive(Debug)]
pub enum PersistError {
    /// JSON (de)serialization failed.
    Json(serde_json::Error),
}

impl std::fmt::Display for PersistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for PersistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
        }
    }
}

/// Which restore path produced the slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreShape {
    /// Records only; this many slots.
    Canonical(usize),
    /// At least one bare string, upgraded; this many slots in total.
    Degraded(usize),
    /// Nothing slot-shaped; one default slot.
    Empty,
}

impl RestoreShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Canonical(_) => "canonical",
            Self::Degraded(_) => "degraded",
            Self::Empty => "empty",
        }
    }

    /// Slots restored from saved values.
    pub fn slot_count(self) -> usize {
        match self {
            Self::Canonical(n) | Self::Degraded(n) => n,
            Self::Empty => 0,
        }
    }
}

/// Rows saved ahead of the first slot: the filter row and toggle-all.
const HEADER_ROWS: usize = 2;

/// A saved value as it would sit in a slot row, if it is slot-shaped.
fn slot_value(value: &Value) -> Option<SlotValue> {
    match value {
        Value::String(raw) => Some(SlotValue::Legacy(raw.clone())),
        other => SlotRecord::from_wire(other).map(SlotValue::Record),
    }
}

/// Index range of the slot values in `values`. Up to [`HEADER_ROWS`] leading
/// values that are not records belong to the header rows, whatever a host
/// wrote into them.
fn slot_run(values: &[Value]) -> std::ops::Range<usize> {
    let start = values
        .iter()
        .take(HEADER_ROWS)
        .take_while(|v| SlotRecord::from_wire(v).is_none())
        .count();
    let len = values[start..]
        .iter()
        .take_while(|v| slot_value(v).is_some())
        .count();
    start..start + len
}

/// Row values in save order.
pub fn serialize_values(widgets: &WidgetList, mode: StrengthMode) -> Vec<Value> {
    widgets
        .iter()
        .map(|widget| match widget {
            NodeWidget::Filter(_) | NodeWidget::ToggleAll(_) | NodeWidget::Add(_) => Value::Null,
            NodeWidget::Slot(slot) => slot.serialize_value(mode),
            NodeWidget::Aux(row) => row.value.clone(),
        })
        .collect()
}

/// Rebuild `widgets` from saved values.
///
/// Filter and toggle-all rows are recreated; auxiliary rows are kept.
pub fn restore(
    widgets: &mut WidgetList,
    values: &[Value],
    mode: StrengthMode,
    filter: BaseModelFilter,
) -> RestoreShape {
    let mut aux = widgets.take_aux();
    let mut rebuilt = WidgetList::standard(filter);

    let run = slot_run(values);
    let mut slots: Vec<SlotValue> = values[run.clone()].iter().filter_map(slot_value).collect();
    if slots.is_empty() {
        slots.push(SlotValue::Record(SlotRecord::new(Selector::None, mode)));
    }
    for value in slots {
        let add = rebuilt.add_position().unwrap_or(rebuilt.len());
        rebuilt.insert_before(add, NodeWidget::Slot(SlotWidget::new("", value)));
    }
    rebuilt.renumber();

    let upgraded = upgrade_legacy_slots(&mut rebuilt, mode);
    let shape = match run.len() {
        0 => RestoreShape::Empty,
        n if upgraded > 0 => RestoreShape::Degraded(n),
        n => RestoreShape::Canonical(n),
    };

    let trailing: Vec<&Value> = values[run.end..].iter().filter(|v| !v.is_null()).collect();
    for (row, value) in aux.iter_mut().rev().zip(trailing.into_iter().rev()) {
        row.value = value.clone();
    }
    let aux_count = aux.len();
    for row in aux {
        rebuilt.push(NodeWidget::Aux(row));
    }

    tracing::debug!(
        shape = shape.as_str(),
        slot_count = rebuilt.slot_count(),
        aux_count,
        mode = %mode,
        "slot list restored"
    );
    *widgets = rebuilt;
    shape
}

/// Write saved values positionally into existing rows, the way a generic
/// host loader does. Slots accept bare strings (kept as legacy values) and
/// records; auxiliary rows accept anything. Returns how many slots were set.
pub fn apply_widget_values(widgets: &mut WidgetList, values: &[Value]) -> usize {
    let mut applied = 0;
    for (widget, value) in widgets.iter_mut().zip(values) {
        match widget {
            NodeWidget::Slot(slot) => {
                if let Some(next) = slot_value(value) {
                    slot.set_value(next);
                    applied += 1;
                }
            }
            NodeWidget::Aux(row) => row.value = value.clone(),
            _ => {}
        }
    }
    applied
}

/// Turn every legacy slot into a record. Safe to run repeatedly.
/// Returns how many slots were upgraded.
pub fn upgrade_legacy_slots(widgets: &mut WidgetList, mode: StrengthMode) -> usize {
    let upgraded = widgets
        .slot_values_mut()
        .map(|value| value.upgrade(mode))
        .filter(|&changed| changed)
        .count();
    if upgraded > 0 {
        tracing::debug!(upgraded, mode = %mode, "legacy slot values upgraded");
    }
    upgraded
}
