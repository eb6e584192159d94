use crate::ast::Span;
use crate::error::RuleInvError;
use crate::rule::ManglingRule;
use pest::Parser;
use pest_derive::Parser;
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub mod primitives;

#[derive(Parser)]
#[grammar = "src/parser/rule.pest"]
pub struct RuleParser;

/// Where a rule line came from, carried into parse errors
pub(crate) struct LineContext<'a> {
    pub index: usize,
    pub line: usize,
    pub source_id: &'a str,
    pub text: Arc<str>,
}

impl LineContext<'_> {
    pub(crate) fn error(&self, message: impl Into<String>, span: Span) -> RuleInvError {
        RuleInvError::parse(
            message,
            span,
            self.source_id,
            self.text.clone(),
            self.index,
        )
    }
}

/// Parse a single rule line
pub fn parse_rule(raw: &str, index: usize) -> Result<ManglingRule, RuleInvError> {
    parse_rule_line(raw, index, 1, "<input>")
}

/// Parse a rule file's content, failing if any rule line is invalid
///
/// Blank lines and lines starting with `#` are skipped. Rule indices count
/// rule lines only.
pub fn parse_rules(content: &str, source_id: &str) -> Result<Vec<ManglingRule>, RuleInvError> {
    let (rules, mut errors) = parse_rules_lenient(content, source_id);
    match errors.len() {
        0 => Ok(rules),
        1 => Err(errors.remove(0)),
        _ => Err(RuleInvError::MultipleErrors(errors)),
    }
}

/// Parse a rule file's content, keeping every valid rule
///
/// Invalid lines are returned as errors; their indices are left unused so
/// the indices of the surviving rules do not shift.
pub fn parse_rules_lenient(
    content: &str,
    source_id: &str,
) -> (Vec<ManglingRule>, Vec<RuleInvError>) {
    parse_rules_lenient_from(content, source_id, 0)
}

/// Lenient parse numbering rules from `first_index`
///
/// Used when several rule files form one list.
pub fn parse_rules_lenient_from(
    content: &str,
    source_id: &str,
    first_index: usize,
) -> (Vec<ManglingRule>, Vec<RuleInvError>) {
    let mut rules = Vec::new();
    let mut errors = Vec::new();
    let mut index = first_index;

    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_rule_line(line, index, line_no + 1, source_id) {
            Ok(rule) => rules.push(rule),
            Err(e) => errors.push(e),
        }
        index += 1;
    }

    (rules, errors)
}

/// Read and parse a rule file
pub fn parse_rule_file(path: &Path) -> Result<Vec<ManglingRule>, RuleInvError> {
    let bytes = fs::read(path).map_err(|e| RuleInvError::io(path, e))?;
    let content = String::from_utf8_lossy(&bytes);
    parse_rules(&content, &path.to_string_lossy())
}

pub(crate) fn parse_rule_line(
    raw: &str,
    index: usize,
    line: usize,
    source_id: &str,
) -> Result<ManglingRule, RuleInvError> {
    let ctx = LineContext {
        index,
        line,
        source_id,
        text: Arc::from(raw),
    };

    match RuleParser::parse(Rule::rule_line, raw) {
        Ok(mut pairs) => {
            let line_pair = pairs.next().ok_or_else(|| {
                RuleInvError::Config("Grammar error: no rule_line produced".to_string())
            })?;
            let mut primitives = Vec::new();
            for pair in line_pair.into_inner() {
                if pair.as_rule() == Rule::EOI {
                    continue;
                }
                primitives.push(primitives::parse_primitive(pair, &ctx)?);
            }
            Ok(ManglingRule::new(index, raw, primitives))
        }
        Err(e) => {
            let col = match e.line_col {
                pest::error::LineColLocation::Pos((_, col)) => col,
                pest::error::LineColLocation::Span((_, col), _) => col,
            };
            let opcode = raw.chars().nth(col.saturating_sub(1));
            let message = match opcode {
                Some(c) => format!("malformed arguments near '{}'", c),
                None => "rule ends in the middle of a primitive".to_string(),
            };
            Err(RuleInvError::parse_with_suggestion(
                message,
                Span::at_column(line, col),
                source_id,
                ctx.text.clone(),
                index,
                "positions are 0-9 or A-Z; byte arguments are one character or \\xHH",
            ))
        }
    }
}
