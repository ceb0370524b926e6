/*!
 * Reporting functionality for stitchfs
 *
 * Provides functionality for generating formatted reports of a stitch run
 * using the tabled library for clean, consistent table rendering.
 */

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use serde_json::json;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::types::{FileVerdict, SkippedEntry, Verdict};

/// Information about one included file in the report
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileReportInfo {
    /// Number of lines in the file
    pub lines: usize,
    /// Number of characters in the file
    pub chars: usize,
}

/// Statistics for one stitch run
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Output destination shown to the user
    pub output_file: String,
    /// Time taken to scan, classify and write
    pub duration: Duration,
    /// Number of files whose content made it into the artifact
    pub files_included: usize,
    /// Candidates skipped as binary
    pub skipped_binary: usize,
    /// Candidates skipped as oversize
    pub skipped_oversize: usize,
    /// Candidates skipped as unreadable
    pub skipped_unreadable: usize,
    /// Entries the walker could not examine
    pub walk_errors: usize,
    /// Total number of lines across included files
    pub total_lines: usize,
    /// Total number of characters across included files
    pub total_chars: usize,
    /// Details for each included file
    pub file_details: HashMap<String, FileReportInfo>,
}

impl ScanReport {
    /// Derive the report from the run's outputs
    pub fn from_results(
        output_file: String,
        duration: Duration,
        verdicts: &[FileVerdict],
        skipped_entries: &[SkippedEntry],
    ) -> Self {
        let mut report = Self {
            output_file,
            duration,
            files_included: 0,
            skipped_binary: 0,
            skipped_oversize: 0,
            skipped_unreadable: 0,
            walk_errors: skipped_entries.len(),
            total_lines: 0,
            total_chars: 0,
            file_details: HashMap::new(),
        };

        for verdict in verdicts {
            match &verdict.verdict {
                Verdict::Included { text, .. } => {
                    let lines = text.lines().count();
                    let chars = text.chars().count();
                    report.files_included += 1;
                    report.total_lines += lines;
                    report.total_chars += chars;
                    report.file_details.insert(
                        verdict.rel_path.display().to_string(),
                        FileReportInfo { lines, chars },
                    );
                }
                Verdict::SkippedBinary => report.skipped_binary += 1,
                Verdict::SkippedOversize => report.skipped_oversize += 1,
                Verdict::SkippedUnreadable { .. } => report.skipped_unreadable += 1,
            }
        }

        report
    }

    /// Total number of candidates that were not included
    pub fn files_skipped(&self) -> usize {
        self.skipped_binary + self.skipped_oversize + self.skipped_unreadable
    }
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
    /// Machine-readable JSON
    Json,
}

/// Report generator for stitch results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string based on run statistics
    pub fn generate_report(&self, report: &ScanReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
            ReportFormat::Json => self.generate_json_report(report),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &ScanReport) {
        println!("\n{}", self.generate_report(report));
    }

    // Keep the last path segments that fit, truncating from the left
    fn format_path(&self, path: &str, max_len: usize) -> String {
        if path.len() <= max_len {
            return path.to_string();
        }

        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() <= 2 {
            return format!("...{}", &path[path.len().saturating_sub(max_len - 3)..]);
        }

        let mut segments = Vec::new();
        let mut current_len = 3;
        for part in parts.iter().rev() {
            let part_len = part.len() + 1;
            if current_len + part_len <= max_len {
                segments.push(*part);
                current_len += part_len;
            } else {
                break;
            }
        }

        let mut result = String::from("...");
        for part in segments.iter().rev() {
            result.push('/');
            result.push_str(part);
        }
        result
    }

    // Create a summary table using the tabled crate
    fn create_summary_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let mut rows = Vec::new();

        rows.push(SummaryRow {
            key: "📂 Output File".to_string(),
            value: report.output_file.clone(),
        });

        rows.push(SummaryRow {
            key: "⏱️ Process Time".to_string(),
            value: format!("{:.4?}", report.duration),
        });

        rows.push(SummaryRow {
            key: "📄 Files Included".to_string(),
            value: self.format_number(report.files_included),
        });

        rows.push(SummaryRow {
            key: "🚫 Files Skipped".to_string(),
            value: format!(
                "{} ({} binary / {} oversize / {} unreadable)",
                self.format_number(report.files_skipped()),
                report.skipped_binary,
                report.skipped_oversize,
                report.skipped_unreadable
            ),
        });

        if report.walk_errors > 0 {
            rows.push(SummaryRow {
                key: "⚠️ Walk Errors".to_string(),
                value: self.format_number(report.walk_errors),
            });
        }

        rows.push(SummaryRow {
            key: "📝 Total Lines".to_string(),
            value: self.format_number(report.total_lines),
        });

        let estimated_tokens = report.total_chars / 4;
        rows.push(SummaryRow {
            key: "📦 LLM Tokens".to_string(),
            value: format!("{} tokens (estimated)", self.format_number(estimated_tokens)),
        });

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    // Create a files table using the tabled crate
    fn create_files_table(&self, report: &ScanReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Est. Tokens")]
            tokens: String,
        }

        // Sort files by character count
        let mut files: Vec<_> = report.file_details.iter().collect();
        files.sort_by(|(_, a), (_, b)| b.chars.cmp(&a.chars));

        // Show all files when the list is short, otherwise the top 10
        let files_to_show = if report.file_details.len() > 15 {
            &files[0..10]
        } else {
            &files[..]
        };

        let rows: Vec<FileRow> = files_to_show
            .iter()
            .map(|(path, info)| FileRow {
                path: self.format_path(path, 60),
                lines: self.format_number(info.lines),
                tokens: self.format_number(info.chars / 4),
            })
            .collect();

        let mut table = Table::new(rows);
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));

        table.to_string()
    }

    // Generate a console table report
    fn generate_console_report(&self, report: &ScanReport) -> String {
        let summary_table = self.create_summary_table(report);
        let files_table = self.create_files_table(report);

        let summary_title = "✅  STITCH COMPLETE";
        let files_title = if report.file_details.len() > 15 {
            "📋  TOP 10 LARGEST FILES BY CHARACTER COUNT  📋"
        } else {
            "📋  INCLUDED FILES"
        };

        format!(
            "{}\n{}\n\n{}\n{}",
            files_title, files_table, summary_title, summary_table
        )
    }

    // Generate a machine-readable JSON report
    fn generate_json_report(&self, report: &ScanReport) -> String {
        let value = json!({
            "output_file": report.output_file,
            "duration_secs": report.duration.as_secs_f64(),
            "files_included": report.files_included,
            "skipped_binary": report.skipped_binary,
            "skipped_oversize": report.skipped_oversize,
            "skipped_unreadable": report.skipped_unreadable,
            "walk_errors": report.walk_errors,
            "total_lines": report.total_lines,
            "total_chars": report.total_chars,
            "estimated_tokens": report.total_chars / 4,
            "files": report.file_details,
        });
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    }
}
