//! Email extraction from free text

use regex::Regex;
use std::sync::OnceLock;

fn email_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("Invalid email regex")
    })
}

/// First email-looking token in `text`.
pub fn scrape_email(text: &str) -> Option<String> {
    if !text.contains('@') {
        return None;
    }
    email_pattern().find(text).map(|m| m.as_str().to_string())
}
