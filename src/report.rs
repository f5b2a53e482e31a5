/*!
 * Run summary for ctxdump
 *
 * Rendered with the tabled library and printed to stderr so the content
 * stream on stdout stays untouched.
 */

use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::utils::{estimate_tokens, format_number};

/// Kind of source an emitted item came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    File,
    Pane,
    Web,
}

/// Counters collected while emitting output
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Wall time of the whole run
    pub duration: Duration,
    /// Directories scanned
    pub directories: usize,
    pub files: usize,
    pub panes: usize,
    pub pages: usize,
    /// Paths printed in list-only mode
    pub listed: usize,
    /// Accepted files that failed to read
    pub unreadable: usize,
    pub total_lines: usize,
    pub total_chars: usize,
}

impl RunReport {
    /// Account for one emitted item
    pub fn record(&mut self, kind: SourceKind, content: &str) {
        match kind {
            SourceKind::File => self.files += 1,
            SourceKind::Pane => self.panes += 1,
            SourceKind::Web => self.pages += 1,
        }
        self.total_lines += content.lines().count();
        self.total_chars += content.chars().count();
    }

    /// Total items emitted with content
    pub fn items(&self) -> usize {
        self.files + self.panes + self.pages
    }
}

/// Report generator for run summaries
pub struct Reporter;

impl Reporter {
    /// Generate the summary table
    pub fn generate_report(&self, report: &RunReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: &'static str,

            #[tabled(rename = "Value")]
            value: String,
        }

        let mut rows = vec![
            SummaryRow {
                key: "Process Time",
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "Directories",
                value: format_number(report.directories),
            },
        ];

        if report.listed > 0 {
            rows.push(SummaryRow {
                key: "Paths Listed",
                value: format_number(report.listed),
            });
        }

        rows.extend([
            SummaryRow {
                key: "Files",
                value: format_number(report.files),
            },
            SummaryRow {
                key: "Panes",
                value: format_number(report.panes),
            },
            SummaryRow {
                key: "Web Pages",
                value: format_number(report.pages),
            },
            SummaryRow {
                key: "Total Lines",
                value: format_number(report.total_lines),
            },
            SummaryRow {
                key: "LLM Tokens",
                value: format!(
                    "{} tokens (estimated)",
                    format_number(estimate_tokens(report.total_chars))
                ),
            },
        ]);

        if report.unreadable > 0 {
            rows.push(SummaryRow {
                key: "Unreadable Files",
                value: format_number(report.unreadable),
            });
        }

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    /// Print the report to stderr
    pub fn print_report(&self, report: &RunReport) {
        eprintln!("\n{}", self.generate_report(report));
    }
}
