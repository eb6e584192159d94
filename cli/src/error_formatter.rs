use ariadne::{Color, Label, Report, ReportKind, Source};
use ruleinv::RuleInvError;

/// Format a RuleInvError with fancy terminal output using Ariadne
pub fn format_error(error: &RuleInvError) -> String {
    match error {
        RuleInvError::Parse(details) => {
            let mut output = Vec::new();

            let enhanced_message = format!(
                "Parse error: {} (rule {}, file {}:{})",
                details.message, details.rule_index, details.source_id, details.span.line
            );

            // Spans are offsets into the rule line, which is the whole source here
            let len = details.source_text.len();
            let start = details.span.start.min(len);
            let end = details.span.end.clamp(start, len).max((start + 1).min(len));
            let mut report =
                Report::build(ReportKind::Error, &details.source_id, start)
                    .with_message(enhanced_message)
                    .with_label(
                        Label::new((&details.source_id, start..end))
                            .with_message("")
                            .with_color(Color::Red),
                    );

            if let Some(suggestion) = &details.suggestion {
                report = report.with_help(suggestion);
            }

            match report.finish().write(
                (
                    &details.source_id,
                    Source::from(details.source_text.as_ref()),
                ),
                &mut output,
            ) {
                Ok(_) => String::from_utf8_lossy(&output).to_string(),
                Err(_) => {
                    // Fallback to simple format
                    format!("{}", error)
                }
            }
        }
        RuleInvError::UnknownPrimitive { rule_index, opcode } => {
            format!(
                "Unknown primitive '{}' in rule {}\n  Rule left unclassified",
                opcode, rule_index
            )
        }
        RuleInvError::ExecutorFailure {
            rule_index,
            message,
        } => format!("Engine failed on rule {}: {}", rule_index, message),
        RuleInvError::MultipleErrors(errors) => {
            let mut result = String::from("Multiple errors occurred:\n\n");
            for error in errors {
                result.push_str(&format_error(error));
                result.push_str("\n\n");
            }
            result
        }
        other => format!("{}", other),
    }
}
