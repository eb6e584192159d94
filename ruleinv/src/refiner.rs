//! Special-case refinement of invertible rules
//!
//! A rule starting with a case shift is tagged `SpecialStartWithShift`;
//! otherwise the first memory-restore primitive is tagged `SpecialMemory`.
//! The shift check runs first, so it wins when both apply.

use crate::feasibility::Special;
use crate::rule::ManglingRule;
use crate::RuleInvResult;
use tracing::debug;

/// The marker a rule should carry, with the memory index when relevant
pub fn special_case(rule: &ManglingRule) -> Option<(Special, Option<usize>)> {
    let mut kinds = rule.kinds();
    if kinds.next().is_some_and(|k| k.is_case_shift()) {
        return Some((Special::SpecialStartWithShift, None));
    }
    rule.kinds()
        .position(|k| k.is_memory_restore())
        .map(|idx| (Special::SpecialMemory, Some(idx)))
}

/// Attach special markers to the invertible rules of a classified list
///
/// Rules without a feasibility value or not currently invertible are left
/// alone; invertibility and countability are never changed.
pub fn refine_special(rules: &mut [ManglingRule]) -> RuleInvResult<()> {
    for rule in rules.iter_mut() {
        let marker = match &rule.feasibility {
            Some(f) if f.is_invertible() => special_case(rule),
            _ => None,
        };
        let (Some((special, idx)), Some(feasibility)) = (marker, rule.feasibility.as_mut())
        else {
            continue;
        };
        match (special, idx) {
            (Special::SpecialMemory, Some(idx)) => feasibility.set_to_special_memory(idx)?,
            (Special::SpecialStartWithShift, _) => feasibility.set_to_special_shift()?,
            _ => continue,
        }
        debug!(rule = rule.index, %special, "special case");
    }
    Ok(())
}
