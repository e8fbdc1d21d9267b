//! Per-run CSV log of row outcomes

use super::RowResult;
use crate::error::Result;
use chrono::NaiveDate;
use log::info;
use std::path::{Path, PathBuf};

pub fn log_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!("apply_log_{}.csv", date.format("%Y-%m-%d")))
}

/// Write (or overwrite) the log for `date`, returning its path.
pub fn write_log(dir: &Path, date: NaiveDate, results: &[RowResult]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = log_path(dir, date);

    let mut writer = csv::Writer::from_path(&path)?;
    if results.is_empty() {
        writer.write_record(["row_index", "serial_number", "recipient", "strategy", "status", "error"])?;
    }
    for result in results {
        writer.serialize(result)?;
    }
    writer.flush()?;

    info!("Wrote {} rows to {}", results.len(), path.display());
    Ok(path)
}

pub fn read_log(path: &Path) -> Result<Vec<RowResult>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut results = Vec::new();
    for record in reader.deserialize() {
        results.push(record?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::RowStatus;
    use crate::resolver::Strategy;
    use tempfile::TempDir;

    fn row(index: usize, status: RowStatus, error: Option<&str>) -> RowResult {
        RowResult {
            row_index: index,
            serial_number: (index + 1).to_string(),
            recipient: Some(format!("hr{}@acme.com", index)),
            strategy: Strategy::Heuristic,
            status,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_log_file_layout() {
        let dir = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let results = vec![row(0, RowStatus::Sent, None), row(1, RowStatus::Error, Some("boom, again"))];

        let path = write_log(dir.path(), date, &results).unwrap();
        assert_eq!(path.file_name().unwrap(), "apply_log_2024-05-01.csv");

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("row_index,serial_number,recipient,strategy,status,error"));
        assert_eq!(lines.next(), Some("0,1,hr0@acme.com,heuristic,sent,"));

        assert_eq!(read_log(&path).unwrap(), results);
    }

    #[test]
    fn test_log_is_overwritten_for_the_same_date() {
        let dir = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        write_log(dir.path(), date, &[row(0, RowStatus::Sent, None), row(1, RowStatus::Sent, None)]).unwrap();
        let path = write_log(dir.path(), date, &[row(0, RowStatus::Skipped, None)]).unwrap();

        let results = read_log(&path).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, RowStatus::Skipped);
    }

    #[test]
    fn test_empty_run_still_has_header() {
        let dir = TempDir::new().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();

        let path = write_log(dir.path(), date, &[]).unwrap();
        assert!(read_log(&path).unwrap().is_empty());
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("row_index,"));
    }
}
