use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Color, Row, Table};
use ruleinv::{DependencyOrigin, ForwardAction, Invertibility, PreprocessReport, RuleSummary};

pub struct Formatter {}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {}
    }

    /// One row per rule: index, rule text, class, countability, special case, action
    pub fn format_summaries(&self, summaries: &[RuleSummary]) -> String {
        let mut table = self.summary_table(false);
        for summary in summaries {
            table.add_row(self.summary_row(summary, false));
        }

        let mut output = table.to_string();
        output.push('\n');
        output.push_str(&self.format_totals(summaries));
        output
    }

    pub fn format_report(&self, report: &PreprocessReport) -> String {
        let mut output = String::new();

        let mut table = self.summary_table(true);
        for summary in &report.rules {
            table.add_row(self.summary_row(summary, true));
        }
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&self.format_totals(&report.rules));

        if report.cache_hit {
            output.push_str(&format!(
                "Cache up to date ({}), forward generation skipped\n",
                short_fingerprint(&report.fingerprint)
            ));
        } else {
            output.push_str(&format!(
                "{} forward job(s) run, fingerprint {}\n",
                report.forward_jobs,
                short_fingerprint(&report.fingerprint)
            ));
        }

        if !report.failures.is_empty() {
            output.push('\n');
            output.push_str(&format!("{} failure(s):\n", report.failures.len()));
            for failure in &report.failures {
                match failure.rule_index {
                    Some(index) => {
                        output.push_str(&format!("  × rule {}: {}\n", index, failure.message))
                    }
                    None => output.push_str(&format!("  × {}\n", failure.message)),
                }
            }
        }

        output
    }

    /// A wordlist entry, lossily decoded for display
    pub fn format_word(&self, word: &[u8]) -> String {
        String::from_utf8_lossy(word).into_owned()
    }

    fn summary_table(&self, with_count: bool) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        let mut header = vec![
            Cell::new("#").set_alignment(CellAlignment::Right),
            Cell::new("Rule"),
            Cell::new("Invertibility"),
            Cell::new("Countable"),
            Cell::new("Special"),
            Cell::new("Action"),
        ];
        if with_count {
            header.push(Cell::new("Outputs").set_alignment(CellAlignment::Right));
        }
        table.set_header(Row::from(header));
        table
    }

    fn summary_row(&self, summary: &RuleSummary, with_count: bool) -> Row {
        let invertibility = match summary.invertibility {
            Some(Invertibility::Invertible) => Cell::new("invertible").fg(Color::Green),
            Some(Invertibility::UninvertibleOptimizable) => {
                Cell::new("uninvertible-optimizable").fg(Color::Yellow)
            }
            Some(Invertibility::Uninvertible) => Cell::new("uninvertible").fg(Color::Red),
            None => Cell::new("?").fg(Color::Red),
        };

        let special = match summary.special_idx {
            Some(idx) => format!("{} @{}", summary.special, idx),
            None => summary.special.to_string(),
        };

        let mut cells = vec![
            Cell::new(summary.index).set_alignment(CellAlignment::Right),
            Cell::new(&summary.raw),
            invertibility,
            Cell::new(self.countable_label(summary)),
            Cell::new(special),
            Cell::new(summary.action.name()),
        ];
        if with_count {
            let count = summary
                .forward_count
                .map(|c| c.to_string())
                .unwrap_or_default();
            cells.push(Cell::new(count).set_alignment(CellAlignment::Right));
        }
        Row::from(cells)
    }

    fn countable_label(&self, summary: &RuleSummary) -> String {
        if !summary.countable {
            return "no".to_string();
        }
        match &summary.dependency {
            Some(DependencyOrigin::OnePerWord) => "yes (1:1)".to_string(),
            Some(DependencyOrigin::LengthThreshold { min_len }) => {
                format!("yes (len >= {})", min_len)
            }
            Some(DependencyOrigin::Positional { .. }) | None => "yes".to_string(),
        }
    }

    fn format_totals(&self, summaries: &[RuleSummary]) -> String {
        let count = |action: ForwardAction| summaries.iter().filter(|s| s.action == action).count();
        let invertible = summaries
            .iter()
            .filter(|s| s.invertibility == Some(Invertibility::Invertible))
            .count();
        let mut output = format!(
            "{} rule(s): {} invertible, {} need outputs, {} need counts",
            summaries.len(),
            invertible,
            count(ForwardAction::OutputsAndCount),
            count(ForwardAction::CountOnly),
        );
        let skipped = count(ForwardAction::Skipped);
        if skipped > 0 {
            output.push_str(&format!(", {} skipped", skipped));
        }
        output.push('\n');
        output
    }
}

fn short_fingerprint(hex: &str) -> &str {
    hex.get(..12).unwrap_or(hex)
}
