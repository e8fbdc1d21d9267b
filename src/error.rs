//! Error handling for quick-apply

use crate::mail::MailError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuickApplyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("PDF rendering error: {0}")]
    PdfRender(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Job sheet is missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Invalid date in row {row}: '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    #[error("Application failed: {0}")]
    ApplicationFailed(String),
}

pub type Result<T> = std::result::Result<T, QuickApplyError>;

impl From<reqwest::Error> for QuickApplyError {
    fn from(err: reqwest::Error) -> Self {
        QuickApplyError::Network(err.to_string())
    }
}

impl From<csv::Error> for QuickApplyError {
    fn from(err: csv::Error) -> Self {
        QuickApplyError::Spreadsheet(err.to_string())
    }
}

impl From<askama::Error> for QuickApplyError {
    fn from(err: askama::Error) -> Self {
        QuickApplyError::Template(err.to_string())
    }
}
