//! Recruiter contact resolution
//!
//! Strategies run in a fixed order and the first one that yields an address
//! wins: the posting's own email, a fuzzy recruiter-name match against known
//! contacts, an address scraped from the job description, and finally an
//! address synthesized from a guessed company domain.

pub mod domain;
pub mod email;
pub mod fuzzy;
pub mod heuristic;
pub mod scrape;

use crate::config::ResolutionConfig;
use crate::models::JobPosting;
use domain::DomainInference;
use email::{clean_field, is_valid_email};
use fuzzy::ReferenceTable;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Lookup,
    FuzzyMatch,
    Scrape,
    Heuristic,
    None,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Lookup => "lookup",
            Strategy::FuzzyMatch => "fuzzy-match",
            Strategy::Scrape => "scrape",
            Strategy::Heuristic => "heuristic",
            Strategy::None => "none",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of resolving one posting. Only one strategy ever contributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub email: Option<String>,
    pub strategy: Strategy,
    /// All synthesized addresses, in priority order (heuristic only)
    pub candidates: Vec<String>,
}

impl ResolutionResult {
    pub fn found(email: String, strategy: Strategy) -> Self {
        Self {
            email: Some(email),
            strategy,
            candidates: Vec::new(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            email: None,
            strategy: Strategy::None,
            candidates: Vec::new(),
        }
    }
}

/// Tunables for the resolver.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub fuzzy_threshold: f64,
    pub default_local_part: String,
    pub fallback_domain: Option<String>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.6,
            default_local_part: heuristic::DEFAULT_LOCAL_PART.to_string(),
            fallback_domain: None,
        }
    }
}

impl From<&ResolutionConfig> for ResolverOptions {
    fn from(config: &ResolutionConfig) -> Self {
        Self {
            fuzzy_threshold: config.fuzzy_threshold,
            default_local_part: config.default_local_part.clone(),
            fallback_domain: config.fallback_domain.clone(),
        }
    }
}

/// Strategies that need no network access, in the order they are tried.
const LOCAL_CHAIN: [Strategy; 3] = [Strategy::Lookup, Strategy::FuzzyMatch, Strategy::Scrape];

pub struct RecruiterResolver {
    options: ResolverOptions,
    reference: Option<ReferenceTable>,
    domain_sources: Vec<Arc<dyn DomainInference>>,
}

impl Default for RecruiterResolver {
    fn default() -> Self {
        Self::new(ResolverOptions::default())
    }
}

impl RecruiterResolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self {
            options,
            reference: None,
            domain_sources: Vec::new(),
        }
    }

    pub fn with_reference(mut self, table: ReferenceTable) -> Self {
        self.reference = if table.is_empty() { None } else { Some(table) };
        self
    }

    /// Add a domain collaborator; they are consulted in insertion order.
    pub fn with_domain_source(mut self, source: Arc<dyn DomainInference>) -> Self {
        self.domain_sources.push(source);
        self
    }

    /// The posting's own email, when it is present and well-formed.
    pub fn lookup(&self, posting: &JobPosting) -> Option<String> {
        clean_field(posting.recruiter_email.as_deref()).filter(|email| is_valid_email(email))
    }

    /// Email of the known contact whose name best matches the recruiter's.
    pub fn fuzzy_match(&self, posting: &JobPosting) -> Option<String> {
        let table = self.reference.as_ref()?;
        let name = clean_field(posting.recruiter_name.as_deref())?;

        let matched = table.lookup(&name, self.options.fuzzy_threshold)?;
        debug!(
            "Matched recruiter '{}' to '{}' ({:.2})",
            name, matched.name, matched.similarity
        );
        Some(matched.email)
    }

    /// First address mentioned in the job description.
    pub fn scrape(&self, posting: &JobPosting) -> Option<String> {
        scrape::scrape_email(&posting.job_description)
    }

    /// Company domain: collaborators first, then the local guess, then the fallback.
    pub async fn infer_domain(&self, company: &str) -> Option<String> {
        if !company.trim().is_empty() {
            for source in &self.domain_sources {
                if let Some(domain) = source.infer(company).await {
                    debug!("Domain for '{}' from {}: {}", company, source.name(), domain);
                    return Some(domain);
                }
            }
        }
        self.local_domain(company)
    }

    fn local_domain(&self, company: &str) -> Option<String> {
        heuristic::domain_from_company(company).or_else(|| self.options.fallback_domain.clone())
    }

    /// Candidate addresses for the recruiter at `domain`.
    pub fn candidates_for(&self, posting: &JobPosting, domain: &str) -> Vec<String> {
        heuristic::candidate_emails(
            clean_field(posting.recruiter_name.as_deref()).as_deref(),
            domain,
            &self.options.default_local_part,
        )
    }

    fn try_local(&self, strategy: Strategy, posting: &JobPosting) -> Option<String> {
        match strategy {
            Strategy::Lookup => self.lookup(posting),
            Strategy::FuzzyMatch => self.fuzzy_match(posting),
            Strategy::Scrape => self.scrape(posting),
            Strategy::Heuristic | Strategy::None => None,
        }
    }

    fn heuristic_result(&self, posting: &JobPosting, domain: Option<String>) -> ResolutionResult {
        let Some(domain) = domain else {
            info!("No recruiter email found for row {}", posting.row_index);
            return ResolutionResult::not_found();
        };

        let candidates = self.candidates_for(posting, &domain);
        match candidates.first() {
            Some(first) => ResolutionResult {
                email: Some(first.clone()),
                strategy: Strategy::Heuristic,
                candidates,
            },
            None => ResolutionResult::not_found(),
        }
    }

    /// Resolve a recipient, consulting domain collaborators when configured.
    pub async fn resolve(&self, posting: &JobPosting) -> ResolutionResult {
        for strategy in LOCAL_CHAIN {
            if let Some(email) = self.try_local(strategy, posting) {
                return ResolutionResult::found(email, strategy);
            }
        }

        let domain = self.infer_domain(&posting.company_name).await;
        self.heuristic_result(posting, domain)
    }

    /// Resolve without any collaborator; the domain is always the local guess.
    pub fn resolve_offline(&self, posting: &JobPosting) -> ResolutionResult {
        for strategy in LOCAL_CHAIN {
            if let Some(email) = self.try_local(strategy, posting) {
                return ResolutionResult::found(email, strategy);
            }
        }

        let domain = self.local_domain(&posting.company_name);
        self.heuristic_result(posting, domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;

    fn posting(company: &str) -> JobPosting {
        JobPosting::new(0, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), company)
    }

    fn reference() -> ReferenceTable {
        let mut table = ReferenceTable::new();
        table.insert("Jane Doe", "jane.doe@acme.com");
        table
    }

    struct FixedDomain(Option<&'static str>);

    #[async_trait]
    impl DomainInference for FixedDomain {
        async fn infer(&self, _company: &str) -> Option<String> {
            self.0.map(str::to_string)
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_valid_email_is_authoritative() {
        let resolver = RecruiterResolver::default().with_reference(reference());
        let p = posting("Acme Robotics")
            .with_recruiter(Some("Jane Doe"), Some("boss@acme.com"))
            .with_description("Contact other@acme.com");

        let result = resolver.resolve(&p).await;
        assert_eq!(result.email.as_deref(), Some("boss@acme.com"));
        assert_eq!(result.strategy, Strategy::Lookup);
        assert!(result.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_absent_markers_fall_through() {
        let resolver = RecruiterResolver::default();
        for marker in ["", "nan", "NaN", "None", "  "] {
            let p = posting("Acme Robotics").with_recruiter(Some("Jane Doe"), Some(marker));
            let result = resolver.resolve(&p).await;

            assert_ne!(result.email.as_deref(), Some(marker));
            assert_eq!(result.strategy, Strategy::Heuristic);
        }
    }

    #[tokio::test]
    async fn test_malformed_email_is_not_authoritative() {
        let resolver = RecruiterResolver::default();
        let p = posting("Acme")
            .with_recruiter(Some("Jane Doe"), Some("jane at acme"))
            .with_description("write to jobs@acme.io");

        let result = resolver.resolve(&p).await;
        assert_eq!(result.email.as_deref(), Some("jobs@acme.io"));
        assert_eq!(result.strategy, Strategy::Scrape);
    }

    #[tokio::test]
    async fn test_fuzzy_match_beats_scrape() {
        let resolver = RecruiterResolver::default().with_reference(reference());
        let p = posting("Acme")
            .with_recruiter(Some("jane  DOE"), None)
            .with_description("Contact jobs@acme.io");

        let result = resolver.resolve(&p).await;
        assert_eq!(result.email.as_deref(), Some("jane.doe@acme.com"));
        assert_eq!(result.strategy, Strategy::FuzzyMatch);
    }

    #[tokio::test]
    async fn test_fuzzy_needs_a_name_and_a_table() {
        let without_table = RecruiterResolver::default();
        let p = posting("Acme").with_recruiter(Some("Jane Doe"), None);
        assert_eq!(without_table.fuzzy_match(&p), None);

        let with_table = RecruiterResolver::default().with_reference(reference());
        let nameless = posting("Acme");
        assert_eq!(with_table.fuzzy_match(&nameless), None);
    }

    #[tokio::test]
    async fn test_heuristic_generation() {
        let resolver = RecruiterResolver::default();
        let p = posting("Acme Robotics").with_recruiter(Some("Jane Doe"), None);

        let result = resolver.resolve(&p).await;
        assert_eq!(result.strategy, Strategy::Heuristic);
        assert_eq!(result.email.as_deref(), Some("jane@acmerobotics.com"));
        for expected in ["jane.doe@acmerobotics.com", "janedoe@acmerobotics.com", "j.doe@acmerobotics.com"] {
            assert!(result.candidates.contains(&expected.to_string()));
        }
    }

    #[tokio::test]
    async fn test_heuristic_without_name_uses_hr() {
        let resolver = RecruiterResolver::default();
        let result = resolver.resolve(&posting("Globex")).await;
        assert_eq!(result.email.as_deref(), Some("hr@globex.com"));
    }

    #[tokio::test]
    async fn test_domain_collaborators_take_priority() {
        let resolver = RecruiterResolver::default()
            .with_domain_source(Arc::new(FixedDomain(None)))
            .with_domain_source(Arc::new(FixedDomain(Some("vedant.in"))));
        let p = posting("Vedant Infra").with_recruiter(Some("Asha"), None);

        let result = resolver.resolve(&p).await;
        assert_eq!(result.email.as_deref(), Some("asha@vedant.in"));

        // Offline resolution ignores collaborators
        let offline = resolver.resolve_offline(&p);
        assert_eq!(offline.email.as_deref(), Some("asha@vedantinfra.com"));
    }

    #[tokio::test]
    async fn test_not_found_without_domain() {
        let resolver = RecruiterResolver::default();
        let result = resolver.resolve(&posting("  ")).await;
        assert_eq!(result, ResolutionResult::not_found());

        let with_fallback = RecruiterResolver::new(ResolverOptions {
            fallback_domain: Some("example.com".to_string()),
            ..ResolverOptions::default()
        });
        let result = with_fallback.resolve(&posting("")).await;
        assert_eq!(result.email.as_deref(), Some("hr@example.com"));
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(Strategy::FuzzyMatch.to_string(), "fuzzy-match");
        assert_eq!(Strategy::None.to_string(), "none");
    }
}
