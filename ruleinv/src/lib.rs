//! # ruleinv engine
//!
//! **Which mangling rules can be run backwards**
//!
//! Password-cracking engines expand a wordlist by applying mangling rules
//! (`c $1`, `sa@ u`, `'6 Q`). Running a rule backwards, from a target
//! string to the wordlist entries that produce it, is much cheaper than
//! running it forward over every word, but only some rules allow it. This
//! crate decides, per rule, how it can be reasoned about, and provides the
//! char-set trie used to enumerate wordlist preimages.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ruleinv::{Engine, RuleInvResult};
//!
//! fn main() -> RuleInvResult<()> {
//!     let mut engine = Engine::new();
//!     engine.add_rules("c $1\nsa@ u\n@a $!\n", "best.rule")?;
//!
//!     let errors = engine.classify()?;
//!     assert!(errors.is_empty());
//!     for summary in engine.summaries() {
//!         println!("{} {:?}", summary.raw, summary.invertibility);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Feasibility
//! Every rule gets an [`Invertibility`] class (invertible, uninvertible but
//! optimizable, uninvertible), a countability flag and, for some invertible
//! rules, a [`Special`] marker.
//!
//! ### Preprocessing
//! Rules that cannot be handled symbolically are run forward through an
//! external cracking engine once, and the results cached under a content
//! fingerprint of the wordlist and rule list.
//!
//! ### Char-set trie
//! A [`FrozenTrie`] over the wordlist answers [`TokenString`] queries: all
//! words whose i-th byte lies in the i-th byte set.

pub mod analysis;
pub mod ast;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod feasibility;
pub mod parser;
pub mod pipeline;
pub mod refiner;
pub mod rule;
pub mod trie;

pub use analysis::{CheckKind, DependencyOrigin, RejectCheck, RuleDependency};
pub use ast::Span;
pub use cache::{Fingerprint, RunInputs};
pub use classifier::{classify, classify_all, verdict};
pub use config::{Config, ExecutorConfig, WordlistPath};
pub use engine::Engine;
pub use error::{ErrorDetails, RuleInvError};
pub use executor::{ForwardExecutor, ForwardJob, ProcessExecutor};
pub use feasibility::{Feasibility, Invertibility, Special};
pub use parser::{parse_rule, parse_rules, parse_rules_lenient};
pub use pipeline::{ForwardAction, PreprocessReport, Preprocessor, RuleFailure, RuleSummary};
pub use refiner::refine_special;
pub use rule::{CharClass, ManglingRule, Primitive, PrimitiveKind};
pub use trie::{ByteSet, Cursor, FrozenTrie, TokenString, TrieBuilder};

/// Result type for ruleinv operations
pub type RuleInvResult<T> = Result<T, RuleInvError>;

#[cfg(test)]
mod tests;
