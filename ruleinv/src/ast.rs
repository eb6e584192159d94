//! Source location metadata shared by the parser and error reporting

use serde::Serialize;

/// Span of a primitive inside a rule file
///
/// `start`/`end` are byte offsets into the rule line, `line` is the 1-based
/// line in the rule file and `col` the 1-based column of `start`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn from_pest_span(span: pest::Span, line: usize) -> Self {
        let (_, col) = span.start_pos().line_col();
        Self {
            start: span.start(),
            end: span.end(),
            line,
            col,
        }
    }

    /// Zero-width span at a column of a rule line
    pub fn at_column(line: usize, col: usize) -> Self {
        let offset = col.saturating_sub(1);
        Self {
            start: offset,
            end: offset,
            line,
            col,
        }
    }
}
