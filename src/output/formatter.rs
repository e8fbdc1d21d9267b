//! Console, JSON and Markdown renderings of a batch report

use crate::batch::{RowResult, RowStatus};
use crate::error::{QuickApplyError, Result};
use crate::output::report::BatchReport;
use colored::{Color, Colorize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = QuickApplyError;

    fn from_str(format: &str) -> Result<Self> {
        match format.to_lowercase().as_str() {
            "console" => Ok(OutputFormat::Console),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(QuickApplyError::InvalidInput(format!(
                "Invalid output format: {}. Supported: console, json, markdown",
                format
            ))),
        }
    }
}

pub trait OutputFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter;

/// Picks the formatter for a requested format.
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn status_label(&self, status: RowStatus) -> String {
        let color = match status {
            RowStatus::Sent => Color::Green,
            RowStatus::Generated => Color::Cyan,
            RowStatus::Skipped => Color::Yellow,
            RowStatus::Error => Color::Red,
        };
        self.colorize(&format!("{:<9}", status.to_string()), color)
    }

    fn format_row(&self, row: &RowResult) -> String {
        let mut line = format!(
            "  #{:<5} {} {:<36} {}",
            row.serial_number,
            self.status_label(row.status),
            row.recipient.as_deref().unwrap_or("-"),
            row.strategy
        );
        if let Some(error) = &row.error {
            line.push_str(&format!("\n         {}", self.colorize(error, Color::BrightRed)));
        }
        line
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String> {
        let mut output = String::new();
        let title = format!("Applications for {}", report.metadata.date);

        if self.use_colors {
            output.push_str(&format!("\n{}\n", title.blue().bold()));
        } else {
            output.push_str(&format!("\n{}\n", title));
        }
        if report.metadata.dry_run {
            output.push_str(&self.colorize("Dry run: nothing was sent\n", Color::Yellow));
        }
        output.push('\n');

        for row in &report.rows {
            output.push_str(&self.format_row(row));
            output.push('\n');
        }

        let summary = &report.summary;
        output.push_str(&format!(
            "\n{} total | {} sent | {} generated | {} skipped | {} errors\n",
            summary.total,
            self.colorize(&summary.sent.to_string(), Color::Green),
            self.colorize(&summary.generated.to_string(), Color::Cyan),
            self.colorize(&summary.skipped.to_string(), Color::Yellow),
            self.colorize(&summary.errors.to_string(), Color::Red),
        ));

        if let Some(log_file) = &report.metadata.log_file {
            output.push_str(&format!("Log: {}\n", log_file));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &BatchReport) -> Result<String> {
        let mut output = String::new();
        let meta = &report.metadata;

        output.push_str(&format!("# Applications for {}\n\n", meta.date));
        output.push_str(&format!(
            "**Generated:** {} | **Generator:** {} | **Dry run:** {}\n",
            meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            meta.generator,
            if meta.dry_run { "yes" } else { "no" }
        ));
        output.push_str(&format!(
            "**Jobs:** `{}` | **Resume:** `{}`\n\n",
            file_name(&meta.jobs_file),
            file_name(&meta.resume_file)
        ));

        let summary = &report.summary;
        output.push_str("## Summary\n\n");
        output.push_str("| Total | Sent | Generated | Skipped | Errors |\n");
        output.push_str("|-------|------|-----------|---------|--------|\n");
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n\n",
            summary.total, summary.sent, summary.generated, summary.skipped, summary.errors
        ));

        output.push_str("## Rows\n\n");
        output.push_str("| Serial | Status | Recipient | Strategy | Error |\n");
        output.push_str("|--------|--------|-----------|----------|-------|\n");
        for row in &report.rows {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                row.serial_number,
                row.status,
                row.recipient.as_deref().unwrap_or(""),
                row.strategy,
                row.error.as_deref().unwrap_or("").replace('|', "\\|")
            ));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_colors(true)
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter,
        }
    }

    pub fn generate_report(&self, report: &BatchReport, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &[u8], file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(file_path, content)?;
    Ok(())
}
