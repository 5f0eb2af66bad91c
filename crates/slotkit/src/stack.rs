#![forbid(unsafe_code)]

//! Turning saved slot values into the LoRAs to apply.
//!
//! The backend receives one input per slot (`lora_1`, `lora_2`, ...), each a
//! record or, from older graphs, a bare selection string. [`resolve_stack`]
//! decides which of them are applied and with which strengths, and produces
//! the `lora_info` list that is forwarded as image metadata.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use slotkit_core::record::STRENGTH_DEFAULT;
use slotkit_core::selector::Selector;

use crate::widget_list::SLOT_PREFIX;

/// One LoRA to apply, in stack order.
#[derive(Debug, Clone, PartialEq)]
pub struct LoraApplication {
    /// Input key the value came from.
    pub slot: String,
    pub selection: Selector,
    pub model_id: u64,
    pub version_id: Option<u64>,
    pub strength_model: f32,
    pub strength_clip: f32,
}

/// Metadata for one applied LoRA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoraInfo {
    pub model_id: u64,
    pub version_id: Option<u64>,
    pub name: String,
    pub strength: f32,
}

/// Output of [`resolve_stack`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResolvedStack {
    pub applications: Vec<LoraApplication>,
    pub info: Vec<LoraInfo>,
}

/// Numeric slot order: `lora_2` before `lora_10`. Keys without a number sort
/// after numbered ones, by name.
fn slot_order(a: &str, b: &str) -> Ordering {
    let number = |key: &str| key.strip_prefix(SLOT_PREFIX).and_then(|n| n.parse::<u64>().ok());
    match (number(a), number(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Fields read out of one slot input before validation.
struct SlotInput {
    on: bool,
    selection: String,
    strength_model: Option<f32>,
    strength_clip: Option<f32>,
}

fn read_input(value: &Value) -> SlotInput {
    match value {
        Value::Object(obj) => {
            let strength = |key: &str, default: Option<f32>| match obj.get(key) {
                None | Some(Value::Null) => default,
                Some(v) => v.as_f64().map(|f| f as f32),
            };
            let strength_model = strength("strength", Some(STRENGTH_DEFAULT));
            SlotInput {
                on: obj.get("on").and_then(Value::as_bool).unwrap_or(true),
                selection: match obj.get("lora") {
                    Some(Value::String(s)) => s.clone(),
                    None | Some(Value::Null) => String::new(),
                    Some(other) => other.to_string(),
                },
                strength_model,
                strength_clip: strength("strengthTwo", strength_model),
            }
        }
        Value::String(s) => SlotInput {
            on: true,
            selection: s.clone(),
            strength_model: Some(STRENGTH_DEFAULT),
            strength_clip: Some(STRENGTH_DEFAULT),
        },
        Value::Null => SlotInput {
            on: true,
            selection: String::new(),
            strength_model: Some(STRENGTH_DEFAULT),
            strength_clip: Some(STRENGTH_DEFAULT),
        },
        other => SlotInput {
            on: true,
            selection: other.to_string(),
            strength_model: Some(STRENGTH_DEFAULT),
            strength_clip: Some(STRENGTH_DEFAULT),
        },
    }
}

/// Resolve the slot inputs of one node.
///
/// Slots apply in display order (`lora_2` before `lora_10`), not in
/// lexicographic key order, which would put `lora_10` first.
///
/// Inputs whose key does not start with `lora_` are ignored. Disabled slots
/// and `None` selections are skipped silently; selections that do not name a
/// model, and strengths that are not numbers, are skipped with a warning.
/// Without a clip input every clip strength is 0. A slot with both strengths
/// at 0 contributes nothing.
pub fn resolve_stack(inputs: &Map<String, Value>, clip_connected: bool) -> ResolvedStack {
    let mut keys: Vec<&String> = inputs
        .keys()
        .filter(|k| k.starts_with(SLOT_PREFIX))
        .collect();
    keys.sort_by(|a, b| slot_order(a, b));

    let mut out = ResolvedStack::default();
    for key in keys {
        let input = read_input(&inputs[key.as_str()]);
        let selection = Selector::from(input.selection.as_str());
        if !input.on || selection.is_none() {
            continue;
        }
        let Some((model_id, version_id)) = selection.ids() else {
            tracing::warn!(slot = %key, value = %selection, "skipping invalid LoRA value");
            continue;
        };
        let (Some(strength_model), Some(strength_clip)) = (input.strength_model, input.strength_clip)
        else {
            tracing::warn!(slot = %key, value = %selection, "skipping LoRA with non-numeric strength");
            continue;
        };
        let strength_clip = if clip_connected { strength_clip } else { 0.0 };
        if strength_model == 0.0 && strength_clip == 0.0 {
            continue;
        }

        out.info.push(LoraInfo {
            model_id,
            version_id,
            name: selection.display_name().to_owned(),
            strength: strength_model,
        });
        out.applications.push(LoraApplication {
            slot: key.clone(),
            selection,
            model_id,
            version_id,
            strength_model,
            strength_clip,
        });
    }
    tracing::debug!(
        applied = out.applications.len(),
        clip_connected,
        "lora stack resolved"
    );
    out
}

/// Info from an upstream loader followed by this loader's.
pub fn merge_lora_info(upstream: &[LoraInfo], own: &[LoraInfo]) -> Vec<LoraInfo> {
    upstream.iter().chain(own).cloned().collect()
}
