//! Parsed mangling rules
//!
//! A rule is an ordered sequence of primitives plus two slots filled in by
//! later stages: the dependency descriptor from the analyzer and the
//! feasibility value from the classifier.

mod primitive;

pub use primitive::{decode_position, position_char, CharClass, PrimitiveKind};

use crate::analysis::RuleDependency;
use crate::ast::Span;
use crate::feasibility::Feasibility;

/// One primitive with its location in the rule line
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub kind: PrimitiveKind,
    pub span: Option<Span>,
}

impl Primitive {
    pub fn new(kind: PrimitiveKind, span: Option<Span>) -> Self {
        Self { kind, span }
    }
}

impl From<PrimitiveKind> for Primitive {
    fn from(kind: PrimitiveKind) -> Self {
        Self { kind, span: None }
    }
}

/// A mangling rule with its analysis slots
#[derive(Debug, Clone, PartialEq)]
pub struct ManglingRule {
    /// Position in the rule list; names the per-rule preprocess files
    pub index: usize,
    /// The rule as written
    pub raw: String,
    pub primitives: Vec<Primitive>,
    /// `Some` when the analyzer could track the rule (the rule is countable)
    pub dependency: Option<RuleDependency>,
    pub feasibility: Option<Feasibility>,
}

impl ManglingRule {
    pub fn new(index: usize, raw: impl Into<String>, primitives: Vec<Primitive>) -> Self {
        Self {
            index,
            raw: raw.into(),
            primitives,
            dependency: None,
            feasibility: None,
        }
    }

    /// Build a rule from primitive kinds, rendering the raw text canonically
    pub fn from_kinds(index: usize, kinds: Vec<PrimitiveKind>) -> Self {
        let primitives: Vec<Primitive> = kinds.into_iter().map(Primitive::from).collect();
        let raw = render(&primitives);
        Self::new(index, raw, primitives)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &PrimitiveKind> + '_ {
        self.primitives.iter().map(|p| &p.kind)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Canonical rendering: primitives in rule syntax separated by one space
    ///
    /// Two rules with the same normalized form behave identically, whatever
    /// spacing or escapes the raw text used.
    pub fn normalized(&self) -> String {
        render(&self.primitives)
    }
}

fn render(primitives: &[Primitive]) -> String {
    primitives
        .iter()
        .map(|p| p.kind.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalized form of an ordered rule list, one rule per line
pub fn normalized_rule_list(rules: &[ManglingRule]) -> String {
    let mut out = String::new();
    for rule in rules {
        out.push_str(&rule.index.to_string());
        out.push('\t');
        out.push_str(&rule.normalized());
        out.push('\n');
    }
    out
}
