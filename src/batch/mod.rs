//! Bulk submission for every posting on a date

pub mod driver;
pub mod apply_log;

pub use driver::{BatchDriver, BatchOptions};
pub use apply_log::{log_path, read_log, write_log};

use crate::models::JobPosting;
use crate::resolver::Strategy;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowStatus {
    Sent,
    Skipped,
    Error,
    /// Content produced but not sent (dry run)
    Generated,
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RowStatus::Sent => "sent",
            RowStatus::Skipped => "skipped",
            RowStatus::Error => "error",
            RowStatus::Generated => "generated",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of one posting. Field order is the log's column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowResult {
    pub row_index: usize,
    pub serial_number: String,
    pub recipient: Option<String>,
    pub strategy: Strategy,
    pub status: RowStatus,
    pub error: Option<String>,
}

impl RowResult {
    pub fn new(posting: &JobPosting, recipient: Option<String>, strategy: Strategy, status: RowStatus) -> Self {
        Self {
            row_index: posting.row_index,
            serial_number: posting.serial_number.clone(),
            recipient,
            strategy,
            status,
            error: None,
        }
    }

    pub fn skipped(posting: &JobPosting) -> Self {
        Self::new(posting, None, Strategy::None, RowStatus::Skipped)
    }

    pub fn failed(posting: &JobPosting, recipient: Option<String>, strategy: Strategy, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(posting, recipient, strategy, RowStatus::Error)
        }
    }
}
