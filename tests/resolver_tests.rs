//! Resolution behaviour observable through the public API

use chrono::NaiveDate;
use quick_apply::models::JobPosting;
use quick_apply::resolver::email::normalize_recipient;
use quick_apply::resolver::fuzzy::ReferenceTable;
use quick_apply::resolver::heuristic::domain_from_company;
use quick_apply::resolver::scrape::scrape_email;
use quick_apply::resolver::{RecruiterResolver, ResolverOptions, Strategy};

fn posting(company: &str, name: Option<&str>, email: Option<&str>, description: &str) -> JobPosting {
    JobPosting::new(0, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), company)
        .with_recruiter(name, email)
        .with_description(description)
}

fn contacts() -> ReferenceTable {
    let mut table = ReferenceTable::new();
    table.insert("Priya Raman", "priya.raman@vedant.in");
    table.insert("Carlos Mendez", "carlos@globex.com");
    table
}

#[test]
fn test_valid_email_wins_regardless_of_other_fields() {
    let resolver = RecruiterResolver::default().with_reference(contacts());
    let inputs = [
        posting("Globex", Some("Carlos Mendez"), Some("boss@globex.com"), "mail jobs@globex.com"),
        posting("", None, Some("boss@globex.com"), ""),
        posting("Vedant", Some("Priya Raman"), Some("boss@globex.com"), "no contact"),
    ];

    for p in inputs {
        let result = resolver.resolve_offline(&p);
        assert_eq!(result.email.as_deref(), Some("boss@globex.com"));
        assert_eq!(result.strategy, Strategy::Lookup);
    }
}

#[test]
fn test_fuzzy_threshold() {
    let resolver = RecruiterResolver::default().with_reference(contacts());

    // Exact up to case and spacing
    let exact = resolver.resolve_offline(&posting("Vedant", Some("  PRIYA   raman "), None, ""));
    assert_eq!(exact.email.as_deref(), Some("priya.raman@vedant.in"));
    assert_eq!(exact.strategy, Strategy::FuzzyMatch);

    // A typo is close enough
    let typo = resolver.resolve_offline(&posting("Vedant", Some("Priya Ramen"), None, ""));
    assert_eq!(typo.strategy, Strategy::FuzzyMatch);

    // An unrelated name falls through to the heuristic
    let other = resolver.resolve_offline(&posting("Vedant", Some("Zed Quill"), None, ""));
    assert_eq!(other.strategy, Strategy::Heuristic);
    assert_eq!(other.email.as_deref(), Some("zed@vedant.com"));
}

#[test]
fn test_stricter_threshold_rejects_near_matches() {
    let resolver = RecruiterResolver::new(ResolverOptions {
        fuzzy_threshold: 0.99,
        ..ResolverOptions::default()
    })
    .with_reference(contacts());

    let typo = resolver.resolve_offline(&posting("Vedant", Some("Priya Ramen"), None, ""));
    assert_eq!(typo.strategy, Strategy::Heuristic);
}

#[test]
fn test_scrape_examples() {
    assert_eq!(
        scrape_email("Contact jane.doe@acme.com for details").as_deref(),
        Some("jane.doe@acme.com")
    );
    assert_eq!(scrape_email("No address in this text"), None);
}

#[test]
fn test_heuristic_examples() {
    assert_eq!(domain_from_company("Acme Robotics").as_deref(), Some("acmerobotics.com"));

    let resolver = RecruiterResolver::default();
    let result = resolver.resolve_offline(&posting("Acme Robotics", Some("Jane Doe"), Some("nan"), ""));

    assert_eq!(result.strategy, Strategy::Heuristic);
    assert_eq!(result.email.as_deref(), Some(result.candidates[0].as_str()));
    for local in ["jane.doe", "jane", "janedoe", "j.doe"] {
        let expected = format!("{}@acmerobotics.com", local);
        assert!(result.candidates.contains(&expected), "missing {}", expected);
    }
}

#[test]
fn test_absent_recruiter_name_uses_default_local_part() {
    let resolver = RecruiterResolver::default();

    for marker in ["None", "nan", " NULL "] {
        let result = resolver.resolve_offline(&posting("Acme Robotics", Some(marker), Some(marker), ""));
        assert_eq!(result.strategy, Strategy::Heuristic);
        assert_eq!(result.email.as_deref(), Some("hr@acmerobotics.com"));
        assert_eq!(result.candidates, vec!["hr@acmerobotics.com"]);
    }
}

#[test]
fn test_gmail_typo_is_corrected() {
    assert_eq!(normalize_recipient("x@gamil.com"), "x@gmail.com");
    assert_eq!(normalize_recipient(" x@GMAIL.CON "), "x@gmail.com");
    assert_eq!(normalize_recipient("x@acme.com"), "x@acme.com");
}
