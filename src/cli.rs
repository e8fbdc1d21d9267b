//! CLI interface for quick-apply

use crate::input::spreadsheet::parse_date_text;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "quick-apply")]
#[command(about = "Send tailored job applications straight from a job sheet")]
#[command(long_about = "Resolve recruiter emails (sheet, fuzzy name match, description scrape, domain heuristic), generate a cover email and tailored resume from a template or an LLM, and send them over SMTP")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Options shared by every command that produces an application.
#[derive(Args, Debug, Clone)]
pub struct GenerationArgs {
    /// Generate content with the configured LLM instead of the template
    #[arg(long)]
    pub llm: bool,

    /// Attach the uploaded resume instead of the tailored PDF
    #[arg(long)]
    pub attach_original: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply to every posting on a date
    Batch {
        /// Job sheet (CSV, XLSX, XLS, ODS)
        #[arg(short, long)]
        jobs: PathBuf,

        /// Resume file (PDF, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// Posting date to process (e.g. 2024-05-01)
        #[arg(short, long, value_parser = parse_date_arg)]
        date: NaiveDate,

        /// Extra recruiter contacts for fuzzy name matching
        #[arg(long)]
        contacts: Option<PathBuf>,

        #[command(flatten)]
        generation: GenerationArgs,

        /// Generate everything but send nothing
        #[arg(long)]
        dry_run: bool,

        /// Rows processed at once (defaults to the configured value)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Output format: console, json, markdown
        #[arg(short, long, default_value = "console")]
        output: String,

        /// Save the report to a file
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Apply to a single posting
    Apply {
        #[arg(short, long)]
        jobs: PathBuf,

        #[arg(short, long)]
        resume: PathBuf,

        /// Company to apply to
        #[arg(long)]
        company: String,

        /// Which of the company's postings (1-based) when there are several
        #[arg(long)]
        row: Option<usize>,

        /// Restrict to postings on this date
        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        /// Send to this address instead of the resolved one
        #[arg(long)]
        to: Option<String>,

        #[arg(long)]
        contacts: Option<PathBuf>,

        #[command(flatten)]
        generation: GenerationArgs,

        #[arg(long)]
        dry_run: bool,
    },

    /// Show the email and resume that would be sent, without sending
    Preview {
        #[arg(short, long)]
        jobs: PathBuf,

        #[arg(short, long)]
        resume: PathBuf,

        #[arg(long)]
        company: String,

        #[arg(long)]
        row: Option<usize>,

        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        #[command(flatten)]
        generation: GenerationArgs,

        /// Write the attachment to this path
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Show how each posting's recruiter email is resolved
    Resolve {
        #[arg(short, long)]
        jobs: PathBuf,

        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,

        #[arg(long)]
        contacts: Option<PathBuf>,

        /// List every synthesized candidate address
        #[arg(short, long)]
        all: bool,
    },

    /// List the companies in a job sheet
    Companies {
        #[arg(short, long)]
        jobs: PathBuf,

        #[arg(short, long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Print the configuration file location
    Path,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "smtp.host" or "resolution.fuzzy_threshold")
        key: String,

        /// Configuration value
        value: String,
    },
}

pub fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date_text(value).ok_or_else(|| format!("Invalid date: {}. Expected e.g. 2024-05-01", value))
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
