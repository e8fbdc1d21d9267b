//! Summary of a batch run

use crate::batch::{RowResult, RowStatus};
use crate::resolver::Strategy;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub rows: Vec<RowResult>,
    pub metadata: ReportMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub sent: usize,
    pub skipped: usize,
    pub errors: usize,
    pub generated: usize,
    /// How many recipients each strategy produced
    pub by_strategy: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub date: NaiveDate,
    pub jobs_file: String,
    pub resume_file: String,
    pub generator: String,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl BatchSummary {
    pub fn from_rows(rows: &[RowResult]) -> Self {
        let mut summary = BatchSummary {
            total: rows.len(),
            ..Default::default()
        };

        for row in rows {
            match row.status {
                RowStatus::Sent => summary.sent += 1,
                RowStatus::Skipped => summary.skipped += 1,
                RowStatus::Error => summary.errors += 1,
                RowStatus::Generated => summary.generated += 1,
            }
            if row.strategy != Strategy::None {
                *summary.by_strategy.entry(row.strategy.to_string()).or_insert(0) += 1;
            }
        }

        summary
    }
}

impl BatchReport {
    pub fn new(rows: Vec<RowResult>, metadata: ReportMetadata) -> Self {
        Self {
            summary: BatchSummary::from_rows(&rows),
            rows,
            metadata,
        }
    }
}
