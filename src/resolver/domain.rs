//! Company domain inference collaborators

use crate::config::ResolutionConfig;
use crate::error::{QuickApplyError, Result};
use crate::llm::{ChatBackend, ChatRequest, PromptTemplates};
use async_trait::async_trait;
use log::{debug, warn};
use regex::Regex;
use reqwest::{Client, Url};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

/// Hosts that never count as a company's own site.
const IGNORED_HOSTS: [&str; 6] = ["google.", "duckduckgo.", "bing.", "yahoo.", "w3.org", "schema.org"];

/// Best-effort lookup of a company's registrable domain.
#[async_trait]
pub trait DomainInference: Send + Sync {
    async fn infer(&self, company: &str) -> Option<String>;

    fn name(&self) -> &str;
}

fn domain_shape() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?(\.[a-z0-9]([a-z0-9-]*[a-z0-9])?)*\.[a-z]{2,}$")
            .expect("Invalid domain regex")
    })
}

fn link_host() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://([a-zA-Z0-9.-]+)").expect("Invalid link regex"))
}

/// Reduce a free-form answer (`https://www.Acme.com/about`) to `acme.com`.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let first_word = raw.split_whitespace().next()?;
    let without_scheme = first_word
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()?
        .trim_matches(|c: char| c == '.' || c == '"' || c == '\'' || c == '`')
        .to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();

    if domain_shape().is_match(&host) {
        Some(host)
    } else {
        None
    }
}

/// Asks an LLM for the company's official domain.
pub struct LlmDomainInference {
    backend: Arc<dyn ChatBackend>,
    prompts: PromptTemplates,
}

impl LlmDomainInference {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            prompts: PromptTemplates::default(),
        }
    }
}

#[async_trait]
impl DomainInference for LlmDomainInference {
    async fn infer(&self, company: &str) -> Option<String> {
        let request = ChatRequest::new(self.prompts.render_domain_lookup(company))
            .with_max_tokens(20)
            .with_temperature(0.2);

        match self.backend.complete(&request).await {
            Ok(answer) => {
                let domain = normalize_domain(&answer);
                if domain.is_none() {
                    debug!("LLM answer for '{}' is not a domain: {:?}", company, answer);
                }
                domain
            }
            Err(e) => {
                warn!("Failed to infer domain for {}: {}", company, e);
                None
            }
        }
    }

    fn name(&self) -> &str {
        "llm"
    }
}

/// Queries a search page and takes the first result host that is not the engine's own.
pub struct SearchDomainInference {
    client: Client,
    search_url: Url,
}

impl SearchDomainInference {
    pub fn new(search_url: &str) -> Result<Self> {
        let search_url = Url::parse(search_url)
            .map_err(|e| QuickApplyError::Configuration(format!("Invalid search_url '{}': {}", search_url, e)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("Mozilla/5.0")
            .build()
            .map_err(|e| QuickApplyError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, search_url })
    }

    pub fn from_config(config: &ResolutionConfig) -> Result<Option<Self>> {
        config.search_url.as_deref().map(Self::new).transpose()
    }

    async fn fetch(&self, company: &str) -> Result<String> {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", &format!("{} official site", company));

        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// First result host in a search page body.
    pub fn first_result_domain(&self, body: &str) -> Option<String> {
        let engine_host = self.search_url.host_str().unwrap_or_default().to_lowercase();
        let decoded = body.replace("%3A", ":").replace("%2F", "/");

        link_host()
            .captures_iter(&decoded)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_lowercase()))
            .filter(|host| host != &engine_host && !IGNORED_HOSTS.iter().any(|h| host.contains(h)))
            .find_map(|host| normalize_domain(&host))
    }
}

#[async_trait]
impl DomainInference for SearchDomainInference {
    async fn infer(&self, company: &str) -> Option<String> {
        match self.fetch(company).await {
            Ok(body) => self.first_result_domain(&body),
            Err(e) => {
                warn!("Search lookup failed for {}: {}", company, e);
                None
            }
        }
    }

    fn name(&self) -> &str {
        "search"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedBackend(Result<String>);

    #[async_trait]
    impl ChatBackend for FixedBackend {
        async fn complete(&self, _request: &ChatRequest) -> Result<String> {
            match &self.0 {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(QuickApplyError::Llm(e.to_string())),
            }
        }

        fn model(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("vedantinfra.com"), Some("vedantinfra.com".to_string()));
        assert_eq!(normalize_domain("https://www.Acme.com/careers"), Some("acme.com".to_string()));
        assert_eq!(normalize_domain("  acme.co.uk.\n"), Some("acme.co.uk".to_string()));
        assert_eq!(normalize_domain("I am not sure"), None);
        assert_eq!(normalize_domain(""), None);
    }

    #[tokio::test]
    async fn test_llm_inference_normalizes_answer() {
        let inference = LlmDomainInference::new(Arc::new(FixedBackend(Ok("http://globex.com/".to_string()))));
        assert_eq!(inference.infer("Globex").await, Some("globex.com".to_string()));
    }

    #[tokio::test]
    async fn test_llm_failure_yields_none() {
        let inference = LlmDomainInference::new(Arc::new(FixedBackend(Err(QuickApplyError::Llm(
            "offline".to_string(),
        )))));
        assert_eq!(inference.infer("Globex").await, None);
    }

    #[test]
    fn test_search_result_parsing_skips_engine_links() {
        let search = SearchDomainInference::new("https://html.duckduckgo.com/html/").unwrap();
        let body = r#"<a href="https://duckduckgo.com/about">x</a>
            <a href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.initech.com%2F">Initech</a>"#;
        assert_eq!(search.first_result_domain(body), Some("initech.com".to_string()));
    }
}
