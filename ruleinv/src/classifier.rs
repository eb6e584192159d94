//! Feasibility classification
//!
//! The invertibility of a rule is the meet of its primitives' verdicts: a
//! rule is only as analyzable as its least analyzable primitive.

use crate::feasibility::{Feasibility, Invertibility};
use crate::rule::{ManglingRule, PrimitiveKind};
use crate::{RuleInvError, RuleInvResult};

/// Per-primitive verdict
///
/// Depends only on the primitive and its static arguments. Returns `None`
/// for primitives outside the supported language.
pub fn verdict(kind: &PrimitiveKind, enable_regex: bool) -> Option<Invertibility> {
    use Invertibility::*;
    use PrimitiveKind as K;

    if kind.is_class_form() && !enable_regex {
        return Some(Uninvertible);
    }

    let verdict = match kind {
        K::Noop
        | K::Lowercase
        | K::Uppercase
        | K::Capitalize
        | K::InvertCapitalize
        | K::ToggleCase
        | K::ToggleAt(_)
        | K::Reverse
        | K::Duplicate
        | K::DuplicateN(_)
        | K::Reflect
        | K::RotateLeft
        | K::RotateRight
        | K::Append(_)
        | K::Prepend(_)
        | K::DeleteFirst
        | K::DeleteLast
        | K::DeleteAt(_)
        | K::Omit(..)
        | K::InsertAt(..)
        | K::OverwriteAt(..)
        | K::Replace(..)
        | K::DuplicateFirst(_)
        | K::DuplicateLast(_)
        | K::DuplicateAll
        | K::SwapFront
        | K::SwapBack
        | K::SwapAt(..)
        | K::BitShiftLeft(_)
        | K::BitShiftRight(_)
        | K::Increment(_)
        | K::Decrement(_)
        | K::ReplaceWithNext(_)
        | K::ReplaceWithPrior(_)
        | K::DuplicateBlockFront(_)
        | K::DuplicateBlockBack(_)
        | K::TitleCase
        | K::TitleCaseSeparator(_)
        | K::ToggleAfterNth(..)
        | K::Memorize
        | K::AppendMemory
        | K::PrependMemory
        | K::InsertMemory(..)
        | K::ShiftCase
        | K::VowelCase => Invertible,

        // Rejections only filter; a candidate preimage is checked against them.
        K::RejectLess(_)
        | K::RejectGreater(_)
        | K::RejectUnlessLength(_)
        | K::RejectContains(_)
        | K::RejectNotContains(_)
        | K::RejectUnlessFirst(_)
        | K::RejectUnlessLast(_)
        | K::RejectUnlessAt(..)
        | K::RejectUnlessCount(..) => Invertible,

        // Outputs are prefixes of words: a prefix walk of the trie applies.
        K::Truncate(_) | K::Extract(0, _) => UninvertibleOptimizable,

        K::Extract(..)
        | K::Purge(_)
        | K::RejectEqualsMemory
        | K::PastTense
        | K::Gerund => Uninvertible,

        K::ReplaceClass(..)
        | K::RejectContainsClass(_)
        | K::RejectNotContainsClass(_)
        | K::RejectUnlessFirstClass(_)
        | K::RejectUnlessLastClass(_)
        | K::RejectUnlessAtClass(..)
        | K::RejectUnlessCountClass(..) => Invertible,
        K::PurgeClass(_) => Uninvertible,

        K::Unsupported { .. } => return None,
    };
    Some(verdict)
}

/// Fold the verdicts of a primitive sequence, starting from `Invertible`
pub fn fold_invertibility<'a>(
    kinds: impl IntoIterator<Item = &'a PrimitiveKind>,
    enable_regex: bool,
) -> Result<Invertibility, char> {
    let mut class = Invertibility::Invertible;
    for kind in kinds {
        let v = verdict(kind, enable_regex).ok_or_else(|| kind.opcode())?;
        class = class.meet(v);
    }
    Ok(class)
}

/// Classify one rule
///
/// `countable` mirrors the presence of dependency metadata; the special
/// marker always starts as `NotSpecial`.
pub fn classify(rule: &ManglingRule, enable_regex: bool) -> RuleInvResult<Feasibility> {
    let invertibility = fold_invertibility(rule.kinds(), enable_regex).map_err(|opcode| {
        RuleInvError::UnknownPrimitive {
            rule_index: rule.index,
            opcode,
        }
    })?;
    Ok(Feasibility::new(invertibility, rule.dependency.is_some()))
}

/// Classify every rule, storing results in the feasibility slots
///
/// A failing rule keeps an empty slot and contributes one error; the other
/// rules are classified regardless.
pub fn classify_all(rules: &mut [ManglingRule], enable_regex: bool) -> Vec<RuleInvError> {
    let mut errors = Vec::new();
    for rule in rules.iter_mut() {
        match classify(rule, enable_regex) {
            Ok(feasibility) => rule.feasibility = Some(feasibility),
            Err(e) => {
                rule.feasibility = None;
                errors.push(e);
            }
        }
    }
    errors
}
