//! Dependency analysis for mangling rules
//!
//! Decides whether the characters of a rule's output can be traced back to
//! input positions as a function of the input length alone. When they can,
//! the number of outputs a rule produces over a wordlist follows from the
//! words' lengths and per-position checks, so the rule is countable without
//! running it. The descriptor produced here fills `ManglingRule::dependency`.

use crate::rule::{ManglingRule, PrimitiveKind};
use serde::Serialize;
use tracing::debug;

/// What a rejection primitive inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Decided by the current word length
    Length,
    /// Decided by bytes at fixed positions (first, last, N-th)
    Content,
}

/// A rejection primitive and the data it depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectCheck {
    /// Index of the primitive inside the rule
    pub primitive: usize,
    pub kind: CheckKind,
}

/// Why a rule's output count is computable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DependencyOrigin {
    /// Every primitive maps positions by input length only
    Positional { tracked_primitives: usize },
    /// No rejection anywhere: each input word yields exactly one output
    OnePerWord,
    /// The rule keeps exactly the words of at least `min_len` bytes
    LengthThreshold { min_len: usize },
}

/// Dependency descriptor attached to countable rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDependency {
    pub origin: DependencyOrigin,
    pub checks: Vec<RejectCheck>,
}

impl RuleDependency {
    /// Whether every rejection in the rule is decided by length alone
    pub fn is_length_only(&self) -> bool {
        self.checks.iter().all(|c| c.kind == CheckKind::Length)
    }
}

/// Whether a primitive can be followed position by position
///
/// Purges drop a data-dependent number of bytes and the JtR morphology
/// commands pick suffixes by content. `Q` and the contains/count rejections
/// look at the whole word, so no single input position decides them.
pub fn tracks_positions(kind: &PrimitiveKind) -> bool {
    !kind.is_word_scan()
        && !matches!(
            kind,
            PrimitiveKind::Purge(_)
                | PrimitiveKind::PurgeClass(_)
                | PrimitiveKind::PastTense
                | PrimitiveKind::Gerund
                | PrimitiveKind::RejectEqualsMemory
                | PrimitiveKind::Unsupported { .. }
        )
}

/// Compute the positional dependency descriptor of one rule
///
/// # Examples
/// ```text
/// Rule: c $1 <8       -> Positional, checks = [{2, Length}]
/// Rule: l (a          -> Positional, checks = [{1, Content}]
/// Rule: l !a          -> None (scans the whole word)
/// Rule: @a $1         -> None (purge length depends on content)
/// ```
pub fn analyze_rule(rule: &ManglingRule) -> Option<RuleDependency> {
    if !rule.kinds().all(tracks_positions) {
        return None;
    }
    Some(RuleDependency {
        origin: DependencyOrigin::Positional {
            tracked_primitives: rule.len(),
        },
        checks: reject_checks(rule),
    })
}

fn reject_checks(rule: &ManglingRule) -> Vec<RejectCheck> {
    rule.kinds()
        .enumerate()
        .filter(|(_, kind)| kind.is_rejection())
        .map(|(primitive, kind)| RejectCheck {
            primitive,
            kind: if kind.is_length_rejection() {
                CheckKind::Length
            } else {
                CheckKind::Content
            },
        })
        .collect()
}

/// Fill the dependency slot of every rule
pub fn annotate_dependencies(rules: &mut [ManglingRule]) {
    let mut tracked = 0;
    for rule in rules.iter_mut() {
        rule.dependency = analyze_rule(rule);
        if rule.dependency.is_some() {
            tracked += 1;
        }
    }
    debug!(
        tracked,
        total = rules.len(),
        "dependency analysis finished"
    );
}

/// Structural countability for a rule the positional analysis gave up on
///
/// # Examples
/// ```text
/// Rule: @a $1         -> OnePerWord (no rejection)
/// Rule: M '5 Q        -> LengthThreshold { min_len: 6 }
/// Rule: '5 Q          -> LengthThreshold { min_len: 6 } (memory starts as the word)
/// Rule: @a <5         -> None
/// ```
pub fn special_countability(rule: &ManglingRule) -> Option<RuleDependency> {
    if rule
        .kinds()
        .any(|k| matches!(k, PrimitiveKind::Unsupported { .. }))
    {
        return None;
    }

    if !rule.kinds().any(PrimitiveKind::is_rejection) {
        return Some(RuleDependency {
            origin: DependencyOrigin::OnePerWord,
            checks: Vec::new(),
        });
    }

    let kinds: Vec<&PrimitiveKind> = rule.kinds().collect();
    let (truncate_at, rest) = match kinds.as_slice() {
        [PrimitiveKind::Memorize, PrimitiveKind::Truncate(n), PrimitiveKind::RejectEqualsMemory] => {
            (*n, 2)
        }
        [PrimitiveKind::Truncate(n), PrimitiveKind::RejectEqualsMemory] => (*n, 1),
        _ => return None,
    };

    // Truncating to N leaves the word unchanged exactly when it has at most
    // N bytes, and then Q rejects it.
    Some(RuleDependency {
        origin: DependencyOrigin::LengthThreshold {
            min_len: truncate_at + 1,
        },
        checks: vec![RejectCheck {
            primitive: rest,
            kind: CheckKind::Length,
        }],
    })
}

/// Promote rules without a descriptor that are countable by structure
pub fn apply_special_countability(rules: &mut [ManglingRule]) {
    let mut promoted = 0;
    for rule in rules.iter_mut().filter(|r| r.dependency.is_none()) {
        if let Some(dependency) = special_countability(rule) {
            debug!(rule = rule.index, origin = ?dependency.origin, "special countability");
            rule.dependency = Some(dependency);
            promoted += 1;
        }
    }
    debug!(promoted, "special countability finished");
}
