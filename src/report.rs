/*!
 * Reporting functionality for ctxpack
 *
 * Console tables for scan listings and generation summaries, rendered with
 * the tabled library.
 */

use std::collections::BTreeMap;
use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::tokenizer::{context_usage, Model};
use crate::types::Entry;
use crate::utils::{format_file_size, format_number};
use crate::writer::Generation;

/// Exact token count for one model
#[derive(Debug, Clone)]
pub struct ModelTokens {
    pub model: Model,
    pub tokens: usize,
    pub context_window: usize,
}

/// Statistics for one generation run
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Output file path
    pub output_file: String,
    /// Size of the written document in bytes
    pub output_size: u64,
    /// Time taken to scan and generate
    pub duration: Duration,
    /// Number of file blocks
    pub files_included: usize,
    /// Blocks rendered as notes
    pub notes: usize,
    /// Block count per kind
    pub tally: BTreeMap<&'static str, usize>,
    /// Whitespace-delimited words
    pub word_count: usize,
    /// chars / 4 estimate
    pub token_count_approx: usize,
    /// Exact count, when a model was chosen
    pub model_tokens: Option<ModelTokens>,
}

impl GenerationReport {
    pub fn new(generation: &Generation, duration: Duration) -> Self {
        Self {
            output_file: generation.output_path.display().to_string(),
            output_size: generation.document.len() as u64,
            duration,
            files_included: generation.files_included,
            notes: generation.notes,
            tally: generation.tally.clone(),
            word_count: generation.word_count,
            token_count_approx: generation.token_count_approx,
            model_tokens: None,
        }
    }
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Generate a report string for a generation run
    pub fn generate_report(&self, report: &GenerationReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &GenerationReport) {
        println!("\n{}", self.generate_report(report));
    }

    /// Render a scan listing as an indented tree table
    pub fn entries_table(&self, entries: &[Entry]) -> String {
        #[derive(Tabled)]
        struct EntryRow {
            #[tabled(rename = "Entry")]
            name: String,

            #[tabled(rename = "Kind")]
            kind: String,

            #[tabled(rename = "Included")]
            included: String,
        }

        let rows: Vec<EntryRow> = entries
            .iter()
            .map(|entry| {
                let mut name = format!("{}{}", "  ".repeat(entry.depth), entry.name);
                if let Some(error) = entry.error_detail() {
                    name.push_str(&format!(" (Error: {})", error));
                }
                EntryRow {
                    name,
                    kind: entry.kind.as_ref().to_string(),
                    included: if entry.included() { "yes" } else { "no" }.to_string(),
                }
            })
            .collect();

        styled(Table::new(rows))
    }

    fn create_summary_table(&self, report: &GenerationReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let mut rows = vec![
            SummaryRow {
                key: "📂 Output File".to_string(),
                value: report.output_file.clone(),
            },
            SummaryRow {
                key: "💾 Output Size".to_string(),
                value: format_file_size(report.output_size),
            },
            SummaryRow {
                key: "⏱️ Process Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "📄 Files Included".to_string(),
                value: format_number(report.files_included),
            },
            SummaryRow {
                key: "📝 Words".to_string(),
                value: format_number(report.word_count),
            },
            SummaryRow {
                key: "📦 LLM Tokens".to_string(),
                value: format!(
                    "{} tokens (estimated)",
                    format_number(report.token_count_approx)
                ),
            },
        ];

        if report.notes > 0 {
            rows.push(SummaryRow {
                key: "⚠️ Note Blocks".to_string(),
                value: report.notes.to_string(),
            });
        }

        if let Some(counted) = &report.model_tokens {
            rows.push(SummaryRow {
                key: format!("🔢 {} Tokens", counted.model),
                value: format!(
                    "{} tokens (counted, {:.1}% of {} window)",
                    format_number(counted.tokens),
                    context_usage(counted.tokens, counted.context_window),
                    format_number(counted.context_window)
                ),
            });
        }

        styled(Table::new(rows))
    }

    fn create_blocks_table(&self, report: &GenerationReport) -> String {
        #[derive(Tabled)]
        struct BlockRow {
            #[tabled(rename = "Block")]
            kind: String,

            #[tabled(rename = "Files")]
            count: usize,
        }

        let rows: Vec<BlockRow> = report
            .tally
            .iter()
            .map(|(kind, count)| BlockRow {
                kind: kind.to_string(),
                count: *count,
            })
            .collect();

        styled(Table::new(rows))
    }

    fn generate_console_report(&self, report: &GenerationReport) -> String {
        format!(
            "📋  FILE BLOCKS\n{}\n\n✅  CONTEXT GENERATED\n{}",
            self.create_blocks_table(report),
            self.create_summary_table(report)
        )
    }
}

fn styled(mut table: Table) -> String {
    table
        .with(Style::rounded())
        .with(Padding::new(1, 1, 0, 0))
        .with(Modify::new(Columns::new(..)).with(Alignment::left()));

    table.to_string()
}
