//! Feasibility values attached to classified rules
//!
//! A value is created by the classifier, refined at most once by the
//! special-case refiner and read-only afterwards. Mutation goes through the
//! transitions below so that a special marker can only live on an
//! invertible rule.

use crate::{RuleInvError, RuleInvResult};
use serde::Serialize;
use std::fmt;

/// How a rule's preimages can be obtained
///
/// Variants are declared lowest priority first so the derived `Ord` reads
/// `Invertible > UninvertibleOptimizable > Uninvertible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Invertibility {
    /// Preimages must come from forward execution over the wordlist
    Uninvertible,
    /// Not invertible, but a structural shortcut (prefix walk) applies
    UninvertibleOptimizable,
    /// Preimages can be enumerated symbolically
    Invertible,
}

impl Invertibility {
    /// Fold step of the classifier: keep the less analyzable class
    pub fn meet(self, other: Invertibility) -> Invertibility {
        self.min(other)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Invertibility::Invertible => "invertible",
            Invertibility::UninvertibleOptimizable => "uninvertible-optimizable",
            Invertibility::Uninvertible => "uninvertible",
        }
    }
}

impl fmt::Display for Invertibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Marker for invertible rules that need special handling downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Special {
    #[default]
    NotSpecial,
    /// The rule starts with a case shift
    SpecialStartWithShift,
    /// The rule restores memory at `Feasibility::special_idx`
    SpecialMemory,
}

impl fmt::Display for Special {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Special::NotSpecial => "-",
            Special::SpecialStartWithShift => "start-with-shift",
            Special::SpecialMemory => "memory",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feasibility {
    invertibility: Invertibility,
    countable: bool,
    special: Special,
    #[serde(skip_serializing_if = "Option::is_none")]
    special_idx: Option<usize>,
}

impl Feasibility {
    pub fn new(invertibility: Invertibility, countable: bool) -> Self {
        Self {
            invertibility,
            countable,
            special: Special::NotSpecial,
            special_idx: None,
        }
    }

    pub fn invertibility(&self) -> Invertibility {
        self.invertibility
    }

    pub fn special(&self) -> Special {
        self.special
    }

    pub fn special_idx(&self) -> Option<usize> {
        self.special_idx
    }

    pub fn is_invertible(&self) -> bool {
        self.invertibility == Invertibility::Invertible
    }

    pub fn is_uninvertible(&self) -> bool {
        self.invertibility == Invertibility::Uninvertible
    }

    pub fn is_optimizable(&self) -> bool {
        self.invertibility == Invertibility::UninvertibleOptimizable
    }

    pub fn is_countable(&self) -> bool {
        self.countable
    }

    pub fn set_to_optimizable(&mut self) {
        self.assign(Invertibility::UninvertibleOptimizable);
    }

    pub fn set_to_uninvertible(&mut self) {
        self.assign(Invertibility::Uninvertible);
    }

    /// Lower the class to `target` (never raises it)
    pub fn downgrade_to(&mut self, target: Invertibility) {
        self.assign(self.invertibility.meet(target));
    }

    fn assign(&mut self, invertibility: Invertibility) {
        if invertibility != Invertibility::Invertible {
            self.special = Special::NotSpecial;
            self.special_idx = None;
        }
        self.invertibility = invertibility;
    }

    pub fn set_to_special_memory(&mut self, idx: usize) -> RuleInvResult<()> {
        self.require_invertible("SpecialMemory")?;
        self.special = Special::SpecialMemory;
        self.special_idx = Some(idx);
        Ok(())
    }

    pub fn set_to_special_shift(&mut self) -> RuleInvResult<()> {
        self.require_invertible("SpecialStartWithShift")?;
        self.special = Special::SpecialStartWithShift;
        self.special_idx = None;
        Ok(())
    }

    fn require_invertible(&self, marker: &str) -> RuleInvResult<()> {
        if self.is_invertible() {
            Ok(())
        } else {
            Err(RuleInvError::InvariantViolation(format!(
                "cannot mark a {} rule as {}",
                self.invertibility, marker
            )))
        }
    }

    /// Verify the record against a rule with `primitive_count` primitives
    pub fn check_invariants(&self, primitive_count: usize) -> RuleInvResult<()> {
        if self.special != Special::NotSpecial && !self.is_invertible() {
            return Err(RuleInvError::InvariantViolation(format!(
                "special marker {} on a {} rule",
                self.special, self.invertibility
            )));
        }
        match (self.special, self.special_idx) {
            (Special::SpecialMemory, Some(idx)) if idx < primitive_count => Ok(()),
            (Special::SpecialMemory, Some(idx)) => Err(RuleInvError::InvariantViolation(format!(
                "special index {} outside a rule of {} primitives",
                idx, primitive_count
            ))),
            (Special::SpecialMemory, None) => Err(RuleInvError::InvariantViolation(
                "SpecialMemory without a special index".to_string(),
            )),
            (_, Some(idx)) => Err(RuleInvError::InvariantViolation(format!(
                "special index {} set without SpecialMemory",
                idx
            ))),
            (_, None) => Ok(()),
        }
    }
}
