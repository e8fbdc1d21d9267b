//! Reports for batch runs

pub mod formatter;
pub mod report;

pub use formatter::{save_report_to_file, OutputFormat, ReportGenerator};
pub use report::{BatchReport, BatchSummary, ReportMetadata};
