//! Domain and address guessing from company and recruiter names

use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_LOCAL_PART: &str = "hr";

fn alpha_tokens() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z]+").expect("Invalid token regex"))
}

/// Concatenate the first two alphanumeric words of a company name: `Acme Robotics Inc` → `acmerobotics.com`.
///
/// No collision handling; the result is only a guess.
pub fn domain_from_company(company: &str) -> Option<String> {
    let cleaned: String = company
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().take(2).collect();

    if words.is_empty() {
        return None;
    }
    Some(format!("{}.com", words.concat().to_lowercase()))
}

/// Lowercased alphabetic tokens of a person's name.
pub fn name_tokens(name: &str) -> Vec<String> {
    alpha_tokens()
        .find_iter(name)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Local-part patterns in priority order: `first`, `first.last`, `firstlast`, `first_last`, `f.last`.
pub fn local_part_candidates(name: Option<&str>, default_local: &str) -> Vec<String> {
    let tokens = name.map(name_tokens).unwrap_or_default();

    let mut candidates = match tokens.as_slice() {
        [] => vec![default_local.to_string()],
        [only] => vec![only.clone()],
        [first, .., last] => {
            let initial: String = first.chars().take(1).collect();
            vec![
                first.clone(),
                format!("{}.{}", first, last),
                format!("{}{}", first, last),
                format!("{}_{}", first, last),
                format!("{}.{}", initial, last),
            ]
        }
    };

    let mut seen = std::collections::HashSet::new();
    candidates.retain(|c| seen.insert(c.clone()));
    candidates
}

/// Every candidate address for `name` at `domain`.
pub fn candidate_emails(name: Option<&str>, domain: &str, default_local: &str) -> Vec<String> {
    local_part_candidates(name, default_local)
        .into_iter()
        .map(|local| format!("{}@{}", local, domain))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_from_company() {
        assert_eq!(domain_from_company("Acme Robotics"), Some("acmerobotics.com".to_string()));
        assert_eq!(domain_from_company("Acme Robotics Holdings Inc."), Some("acmerobotics.com".to_string()));
        assert_eq!(domain_from_company("AT&T"), Some("att.com".to_string()));
        assert_eq!(domain_from_company("Globex"), Some("globex.com".to_string()));
        assert_eq!(domain_from_company(" &! "), None);
    }

    #[test]
    fn test_local_parts_for_full_name() {
        let parts = local_part_candidates(Some("Jane Doe"), DEFAULT_LOCAL_PART);
        assert_eq!(parts, vec!["jane", "jane.doe", "janedoe", "jane_doe", "j.doe"]);
    }

    #[test]
    fn test_middle_names_use_first_and_last() {
        let parts = local_part_candidates(Some("Mary Ann O'Neil"), DEFAULT_LOCAL_PART);
        assert_eq!(parts[1], "mary.neil");
    }

    #[test]
    fn test_single_and_missing_names() {
        assert_eq!(local_part_candidates(Some("Cher"), DEFAULT_LOCAL_PART), vec!["cher"]);
        assert_eq!(local_part_candidates(None, DEFAULT_LOCAL_PART), vec!["hr"]);
        assert_eq!(local_part_candidates(Some("123"), "careers"), vec!["careers"]);
    }

    #[test]
    fn test_candidate_emails() {
        let emails = candidate_emails(Some("Jane Doe"), "acmerobotics.com", DEFAULT_LOCAL_PART);
        assert_eq!(emails.first().map(String::as_str), Some("jane@acmerobotics.com"));
        assert!(emails.contains(&"j.doe@acmerobotics.com".to_string()));
    }
}
