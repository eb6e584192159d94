use crate::ast::Span;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Detailed parse error information with source location
#[derive(Debug, Clone)]
pub struct ErrorDetails {
    pub message: String,
    pub span: Span,
    pub source_id: String,
    /// The offending rule line
    pub source_text: Arc<str>,
    pub rule_index: usize,
    pub suggestion: Option<String>,
}

/// Error types for rule analysis, preprocessing and trie lookup
#[derive(Debug, Error)]
pub enum RuleInvError {
    /// Rule text did not match the rule grammar
    #[error("Parse error: {} at {}:{}:{}", .0.message, .0.source_id, .0.span.line, .0.span.col)]
    Parse(Box<ErrorDetails>),

    /// The classifier has no verdict for this opcode
    #[error("Unknown primitive '{opcode}' in rule {rule_index}")]
    UnknownPrimitive { rule_index: usize, opcode: char },

    /// A guarded state transition was attempted from the wrong state
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// The forward executor returned non-success for one rule
    #[error("Executor failure for rule {rule_index}: {message}")]
    ExecutorFailure { rule_index: usize, message: String },

    /// The stored cache fingerprint exists but cannot be read
    #[error("Cache corruption: {0}")]
    CacheCorruption(String),

    /// `Cursor::step` was called for a byte without a child edge
    #[error("Trie cursor has no child for byte 0x{byte:02x}")]
    TrieLookupPrecondition { byte: u8 },

    /// A serialized trie failed validation
    #[error("Invalid trie data: {0}")]
    TrieFormat(String),

    /// A token string position has no admissible byte
    #[error("Token string position {position} has an empty byte set")]
    EmptyTokenSet { position: usize },

    /// A token pattern could not be parsed
    #[error("Invalid token pattern at offset {offset}: {message}")]
    TokenPattern { offset: usize, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Multiple errors collected together
    #[error("{}", format_multiple(.0))]
    MultipleErrors(Vec<RuleInvError>),
}

impl RuleInvError {
    /// Create a parse error with source information
    pub fn parse(
        message: impl Into<String>,
        span: Span,
        source_id: impl Into<String>,
        source_text: Arc<str>,
        rule_index: usize,
    ) -> Self {
        Self::Parse(Box::new(ErrorDetails {
            message: message.into(),
            span,
            source_id: source_id.into(),
            source_text,
            rule_index,
            suggestion: None,
        }))
    }

    /// Create a parse error with suggestion
    pub fn parse_with_suggestion(
        message: impl Into<String>,
        span: Span,
        source_id: impl Into<String>,
        source_text: Arc<str>,
        rule_index: usize,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Parse(Box::new(ErrorDetails {
            message: message.into(),
            span,
            source_id: source_id.into(),
            source_text,
            rule_index,
            suggestion: Some(suggestion.into()),
        }))
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Rule the error is attributed to, if any
    pub fn rule_index(&self) -> Option<usize> {
        match self {
            RuleInvError::Parse(details) => Some(details.rule_index),
            RuleInvError::UnknownPrimitive { rule_index, .. }
            | RuleInvError::ExecutorFailure { rule_index, .. } => Some(*rule_index),
            _ => None,
        }
    }
}

fn format_multiple(errors: &[RuleInvError]) -> String {
    let mut out = String::from("Multiple errors:");
    for (i, error) in errors.iter().enumerate() {
        out.push_str(&format!("\n  {}. {}", i + 1, error));
    }
    out
}
