//! Core records shared by the resolver, generators and the batch driver

use crate::input::file_detector::FileType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One row of the job sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    /// 0-based position among the sheet's data rows
    pub row_index: usize,
    pub serial_number: String,
    pub date: NaiveDate,
    pub company_name: String,
    pub job_description: String,
    pub recruiter_name: Option<String>,
    pub recruiter_email: Option<String>,
}

impl JobPosting {
    /// Convenience constructor used by callers that build postings by hand.
    pub fn new(row_index: usize, date: NaiveDate, company_name: impl Into<String>) -> Self {
        Self {
            row_index,
            serial_number: (row_index + 1).to_string(),
            date,
            company_name: company_name.into(),
            job_description: String::new(),
            recruiter_name: None,
            recruiter_email: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.job_description = description.into();
        self
    }

    pub fn with_recruiter(mut self, name: Option<&str>, email: Option<&str>) -> Self {
        self.recruiter_name = name.map(str::to_string);
        self.recruiter_email = email.map(str::to_string);
        self
    }

    /// Recruiter's first name if one is on file.
    pub fn recruiter_first_name(&self) -> Option<&str> {
        self.recruiter_name
            .as_deref()
            .and_then(|name| name.split_whitespace().next())
    }
}

/// The uploaded résumé: raw bytes plus its extracted text.
#[derive(Debug, Clone)]
pub struct ResumeDocument {
    pub file_name: String,
    pub file_type: FileType,
    pub bytes: Vec<u8>,
    pub text: String,
}

impl ResumeDocument {
    pub fn mime_type(&self) -> &'static str {
        self.file_type.mime_type()
    }
}

/// A file attached to an outgoing application email.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn pdf(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: "application/pdf".to_string(),
            bytes,
        }
    }
}

/// Subject, body and attachment produced for a single posting.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedApplication {
    pub subject: String,
    pub body: String,
    pub attachment: Attachment,
}

/// File name used for a tailored résumé sent to `company`.
pub fn attachment_file_name(company: &str) -> String {
    let slug: String = company
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let slug = slug.trim_matches('_');

    if slug.is_empty() {
        "resume_app.pdf".to_string()
    } else {
        format!("resume_{}.pdf", slug)
    }
}
