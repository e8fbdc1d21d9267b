//! Job sheet loading (CSV and spreadsheet workbooks)

use crate::error::{QuickApplyError, Result};
use crate::input::file_detector::SheetFormat;
use crate::models::JobPosting;
use crate::resolver::email::{clean_field, is_valid_email};
use crate::resolver::fuzzy::ReferenceTable;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::{debug, info};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

pub const SERIAL_NUMBER: &str = "serial number";
pub const DATE: &str = "date";
pub const COMPANY_NAME: &str = "company name";
pub const JOB_DESCRIPTION: &str = "job description";
pub const RECRUITER_NAME: &str = "recruiter name";
pub const RECRUITER_EMAIL: &str = "recruiter email";

pub const REQUIRED_COLUMNS: [&str; 5] = [SERIAL_NUMBER, DATE, COMPANY_NAME, JOB_DESCRIPTION, RECRUITER_NAME];

const TEXT_DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%Y", "%d-%b-%Y", "%B %d, %Y", "%Y/%m/%d"];
const TEXT_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

/// A single spreadsheet cell, independent of the source format.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl Cell {
    /// Cell content as trimmed text, `None` when blank.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Cell::Number(n) => Some(format_number(*n)),
            Cell::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_text().is_none()
    }

    /// Interpret the cell as a calendar date, discarding any time of day.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Empty => None,
            Cell::Date(d) => Some(*d),
            Cell::Number(n) => excel_serial_to_date(*n),
            Cell::Text(s) => parse_date_text(s),
        }
    }
}

/// Header row plus data rows, before column mapping.
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            headers: headers.iter().map(|h| normalize_header(h)).collect(),
            rows,
        }
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.column(name).is_none())
            .map(|name| name.to_string())
            .collect()
    }

    fn cell(&self, row: &[Cell], column: Option<usize>) -> Cell {
        column
            .and_then(|idx| row.get(idx))
            .cloned()
            .unwrap_or(Cell::Empty)
    }
}

/// All postings of a job sheet.
#[derive(Debug, Clone, Default)]
pub struct JobSheet {
    postings: Vec<JobPosting>,
}

impl JobSheet {
    /// Load a job sheet, picking the reader from the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(QuickApplyError::InvalidInput(format!(
                "Job sheet does not exist: {}",
                path.display()
            )));
        }

        let raw = read_raw_sheet(path, &REQUIRED_COLUMNS)?;
        let sheet = Self::from_raw(raw)?;
        info!("Loaded {} job postings from {}", sheet.len(), path.display());
        Ok(sheet)
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_raw(read_csv(reader)?)
    }

    /// Map columns onto postings. Fails on missing columns or unparseable dates.
    pub fn from_raw(raw: RawSheet) -> Result<Self> {
        let missing = raw.missing_columns(&REQUIRED_COLUMNS);
        if !missing.is_empty() {
            return Err(QuickApplyError::MissingColumns(missing));
        }

        let serial_col = raw.column(SERIAL_NUMBER);
        let date_col = raw.column(DATE);
        let company_col = raw.column(COMPANY_NAME);
        let description_col = raw.column(JOB_DESCRIPTION);
        let name_col = raw.column(RECRUITER_NAME);
        let email_col = raw.column(RECRUITER_EMAIL);

        let mut postings = Vec::with_capacity(raw.rows.len());
        for (row_index, row) in raw.rows.iter().enumerate() {
            if row.iter().all(Cell::is_empty) {
                debug!("Skipping empty sheet row {}", row_index + 2);
                continue;
            }

            let date_cell = raw.cell(row, date_col);
            let date = date_cell.as_date().ok_or_else(|| QuickApplyError::InvalidDate {
                row: row_index + 2,
                value: date_cell.as_text().unwrap_or_default(),
            })?;

            postings.push(JobPosting {
                row_index,
                serial_number: raw.cell(row, serial_col).as_text().unwrap_or_default(),
                date,
                company_name: raw.cell(row, company_col).as_text().unwrap_or_default(),
                job_description: raw.cell(row, description_col).as_text().unwrap_or_default(),
                recruiter_name: clean_field(raw.cell(row, name_col).as_text().as_deref()),
                // Kept verbatim: the resolver decides what counts as absent.
                recruiter_email: raw.cell(row, email_col).as_text(),
            });
        }

        Ok(Self { postings })
    }

    pub fn postings(&self) -> &[JobPosting] {
        &self.postings
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn for_date(&self, date: NaiveDate) -> Vec<JobPosting> {
        self.postings
            .iter()
            .filter(|p| p.date == date)
            .cloned()
            .collect()
    }

    /// Postings of one company (case-insensitive), optionally on one date.
    pub fn for_company(&self, company: &str, date: Option<NaiveDate>) -> Vec<JobPosting> {
        let wanted = company.trim().to_lowercase();
        self.postings
            .iter()
            .filter(|p| p.company_name.to_lowercase() == wanted)
            .filter(|p| date.map_or(true, |d| p.date == d))
            .cloned()
            .collect()
    }

    /// Distinct company names, sorted.
    pub fn companies(&self, date: Option<NaiveDate>) -> Vec<String> {
        self.postings
            .iter()
            .filter(|p| date.map_or(true, |d| p.date == d))
            .filter(|p| !p.company_name.is_empty())
            .map(|p| p.company_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Recruiter contacts known from rows that carry both a name and a valid email.
    pub fn reference_table(&self) -> ReferenceTable {
        let mut table = ReferenceTable::new();
        for posting in &self.postings {
            let email = clean_field(posting.recruiter_email.as_deref());
            if let (Some(name), Some(email)) = (&posting.recruiter_name, email) {
                if is_valid_email(&email) {
                    table.insert(name, &email);
                }
            }
        }
        table
    }
}

/// Load a contacts file with `recruiter name` and `recruiter email` columns.
pub fn load_contacts(path: &Path) -> Result<ReferenceTable> {
    let required = [RECRUITER_NAME, RECRUITER_EMAIL];
    let raw = read_raw_sheet(path, &required)?;

    let missing = raw.missing_columns(&required);
    if !missing.is_empty() {
        return Err(QuickApplyError::MissingColumns(missing));
    }

    let name_col = raw.column(RECRUITER_NAME);
    let email_col = raw.column(RECRUITER_EMAIL);

    let mut table = ReferenceTable::new();
    for row in &raw.rows {
        let name = clean_field(raw.cell(row, name_col).as_text().as_deref());
        let email = clean_field(raw.cell(row, email_col).as_text().as_deref());
        if let (Some(name), Some(email)) = (name, email) {
            if is_valid_email(&email) {
                table.insert(&name, &email);
            }
        }
    }

    info!("Loaded {} recruiter contacts from {}", table.len(), path.display());
    Ok(table)
}

fn read_raw_sheet(path: &Path, required: &[&str]) -> Result<RawSheet> {
    match SheetFormat::from_path(path) {
        SheetFormat::Csv => {
            let file = std::fs::File::open(path)?;
            read_csv(file)
        }
        SheetFormat::Workbook => read_workbook(path, required),
        SheetFormat::Unknown => Err(QuickApplyError::UnsupportedFormat(format!(
            "Unsupported sheet type for: {} (expected csv, xlsx, xls or ods)",
            path.display()
        ))),
    }
}

fn read_csv<R: Read>(reader: R) -> Result<RawSheet> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|value| {
                    if value.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(value.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawSheet::new(headers, rows))
}

/// Read the first worksheet that has every `required` column, or the first sheet.
fn read_workbook(path: &Path, required: &[&str]) -> Result<RawSheet> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| QuickApplyError::Spreadsheet(format!("Failed to open '{}': {}", path.display(), e)))?;

    let mut first: Option<RawSheet> = None;
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| QuickApplyError::Spreadsheet(format!("Failed to read sheet '{}': {}", name, e)))?;

        let mut rows = range.rows();
        let headers: Vec<String> = match rows.next() {
            Some(header_row) => header_row.iter().map(|cell| cell.to_string()).collect(),
            None => continue,
        };
        let data = rows
            .map(|row| row.iter().map(cell_from_data).collect())
            .collect();

        let sheet = RawSheet::new(headers, data);
        if sheet.missing_columns(required).is_empty() {
            debug!("Using sheet '{}'", name);
            return Ok(sheet);
        }
        if first.is_none() {
            first = Some(sheet);
        }
    }

    first.ok_or_else(|| QuickApplyError::Spreadsheet(format!("No non-empty sheet in '{}'", path.display())))
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            excel_serial_to_date(serial)
                .map(Cell::Date)
                .unwrap_or(Cell::Number(serial))
        }
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        _ => Cell::Empty,
    }
}

/// Lowercase, trim, `_` to space and collapse runs of whitespace.
pub fn normalize_header(header: &str) -> String {
    header
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Spreadsheet serial day number (1900 date system) to a date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !(1.0..2_958_466.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.floor() as i64))
}

pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for format in TEXT_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    for format in TEXT_DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }
    chrono::DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.date_naive())
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
