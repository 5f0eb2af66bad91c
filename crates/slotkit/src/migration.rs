#![forbid(unsafe_code)]

//! Strength mode switches.
//!
//! Going to dual seeds every missing secondary with the slot's primary, so
//! clip strength starts where the shared strength was. Going back to single
//! drops the secondary from memory; the next switch to dual seeds it again.
//! Primary strength, enabled flag and selection are never touched.

use slotkit_core::record::{SlotRecord, StrengthMode};
use slotkit_widgets::slot::SlotValue;

/// Adjust one record for a `from` → `to` switch. Returns `true` if it changed.
pub fn migrate_record(record: &mut SlotRecord, from: StrengthMode, to: StrengthMode) -> bool {
    match (from, to) {
        (StrengthMode::Single, StrengthMode::Dual) if record.strength_secondary.is_none() => {
            record.strength_secondary = Some(record.strength_primary);
            true
        }
        (StrengthMode::Dual, StrengthMode::Single) => record.strength_secondary.take().is_some(),
        _ => false,
    }
}

/// Migrate every slot. Legacy strings carry no strengths and are skipped.
/// Returns the number of records changed.
pub fn migrate<'a>(
    slots: impl IntoIterator<Item = &'a mut SlotValue>,
    from: StrengthMode,
    to: StrengthMode,
) -> usize {
    if from == to {
        tracing::debug!(mode = %to, "mode unchanged, nothing to migrate");
        return 0;
    }
    let mut changed = 0;
    let mut total = 0;
    for slot in slots {
        total += 1;
        if let SlotValue::Record(record) = slot
            && migrate_record(record, from, to)
        {
            changed += 1;
        }
    }
    tracing::debug!(from = %from, to = %to, slot_count = total, changed, "strength mode migrated");
    changed
}
