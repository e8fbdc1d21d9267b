//! Email field hygiene: absent values, syntax checks and recipient normalization

use regex::Regex;
use std::sync::OnceLock;

/// Values spreadsheets and dataframes leave behind in empty cells.
const ABSENT_MARKERS: [&str; 3] = ["nan", "none", "null"];

/// Common misspellings of the Gmail domain.
const GMAIL_TYPOS: [&str; 5] = ["gamil.com", "gmial.com", "gmal.com", "gmaill.com", "gmail.con"];

fn email_syntax() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
    })
}

/// True for blank cells and the textual leftovers of missing values.
pub fn is_absent(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty() || ABSENT_MARKERS.iter().any(|m| trimmed.eq_ignore_ascii_case(m))
}

/// Trimmed field value, or `None` when absent.
pub fn clean_field(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !is_absent(v))
        .map(|v| v.trim().to_string())
}

/// Minimal `local@domain.tld` check.
pub fn is_valid_email(value: &str) -> bool {
    email_syntax().is_match(value.trim())
}

/// Replace a misspelled Gmail domain with `gmail.com`.
pub fn fix_gmail_typo(address: &str) -> String {
    match address.rsplit_once('@') {
        Some((local, domain)) if GMAIL_TYPOS.iter().any(|t| domain.eq_ignore_ascii_case(t)) => {
            format!("{}@gmail.com", local)
        }
        _ => address.to_string(),
    }
}

/// Final clean-up applied to a recipient right before sending.
pub fn normalize_recipient(address: &str) -> String {
    let trimmed = address.trim();
    let lowered = match trimmed.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => trimmed.to_string(),
    };
    fix_gmail_typo(&lowered)
}
