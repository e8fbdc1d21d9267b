//! Configuration management for quick-apply

use crate::error::{QuickApplyError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SMTP_PASSWORD_ENV: &str = "QUICK_APPLY_SMTP_PASSWORD";
pub const LLM_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const LLM_BASE_URL_ENV: &str = "OPENAI_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub applicant: ApplicantConfig,
    pub smtp: SmtpConfig,
    pub llm: LlmConfig,
    pub resolution: ResolutionConfig,
    pub batch: BatchConfig,
}

/// Who the applications are from; used in signatures and the tailored résumé.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicantConfig {
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub password: String,
    /// Sender address; the username is used when empty
    #[serde(default)]
    pub from: String,
    pub security: SmtpSecurity,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
    StartTls,
    Tls,
    Plain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Generate emails with the LLM instead of the template
    pub enabled: bool,
    /// Ask the LLM for a company's domain before guessing one
    pub domain_inference: bool,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionConfig {
    pub fuzzy_threshold: f64,
    pub default_local_part: String,
    /// Domain used when a company name yields no usable words
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_domain: Option<String>,
    /// Search page queried for a company's site, e.g. `https://html.duckduckgo.com/html/`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub log_dir: PathBuf,
    pub concurrency: usize,
    pub attach_original: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            applicant: ApplicantConfig::default(),
            smtp: SmtpConfig {
                host: "smtp.gmail.com".to_string(),
                port: 587,
                username: String::new(),
                password: String::new(),
                from: String::new(),
                security: SmtpSecurity::StartTls,
                timeout_secs: 30,
            },
            llm: LlmConfig {
                enabled: false,
                domain_inference: false,
                base_url: "http://localhost:11434/v1".to_string(),
                api_key: "dummy".to_string(),
                model: "llama3".to_string(),
                temperature: 0.7,
                timeout_secs: 120,
            },
            resolution: ResolutionConfig {
                fuzzy_threshold: 0.6,
                default_local_part: "hr".to_string(),
                fallback_domain: None,
                search_url: None,
            },
            batch: BatchConfig {
                log_dir: PathBuf::from("agent_apply_logs"),
                concurrency: 1,
                attach_original: false,
            },
        }
    }
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::read_from(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// The file's contents only, without environment overrides.
    pub fn read_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| QuickApplyError::Configuration(format!("Failed to parse config: {}", e)))
        } else {
            let config = Self::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Copy safe to print: secrets are masked.
    pub fn redacted(&self) -> Self {
        fn mask(secret: &str) -> String {
            if secret.is_empty() {
                String::new()
            } else {
                "********".to_string()
            }
        }

        let mut copy = self.clone();
        copy.smtp.password = mask(&self.smtp.password);
        copy.llm.api_key = mask(&self.llm.api_key);
        copy
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| QuickApplyError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("quick-apply")
            .join("config.toml")
    }

    /// Secrets and endpoints may come from the environment instead of the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(password) = std::env::var(SMTP_PASSWORD_ENV) {
            if !password.is_empty() {
                self.smtp.password = password;
            }
        }
        if let Ok(key) = std::env::var(LLM_API_KEY_ENV) {
            if !key.is_empty() {
                self.llm.api_key = key;
            }
        }
        if let Ok(url) = std::env::var(LLM_BASE_URL_ENV) {
            if !url.is_empty() {
                self.llm.base_url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.resolution.fuzzy_threshold) {
            return Err(QuickApplyError::Configuration(format!(
                "resolution.fuzzy_threshold must be between 0 and 1, got {}",
                self.resolution.fuzzy_threshold
            )));
        }
        if self.batch.concurrency == 0 {
            return Err(QuickApplyError::Configuration(
                "batch.concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Credentials required before any email is sent.
    pub fn require_smtp_credentials(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.smtp.host.trim().is_empty() {
            missing.push("smtp.host");
        }
        if self.smtp.username.trim().is_empty() {
            missing.push("smtp.username");
        }
        if self.smtp.password.is_empty() {
            missing.push("smtp.password");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(QuickApplyError::Configuration(format!(
                "SMTP details not provided ({}); set them in the config file or {}",
                missing.join(", "),
                SMTP_PASSWORD_ENV
            )))
        }
    }

    pub fn sender_address(&self) -> &str {
        if self.smtp.from.trim().is_empty() {
            &self.smtp.username
        } else {
            &self.smtp.from
        }
    }

    /// Update a single dotted key, e.g. `smtp.port` or `resolution.fuzzy_threshold`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
            value
                .parse()
                .map_err(|_| QuickApplyError::Configuration(format!("Invalid value for {}: {}", key, value)))
        }

        match key {
            "applicant.name" => self.applicant.name = value.to_string(),
            "applicant.email" => self.applicant.email = value.to_string(),
            "applicant.phone" => self.applicant.phone = value.to_string(),
            "smtp.host" => self.smtp.host = value.to_string(),
            "smtp.port" => self.smtp.port = parse(key, value)?,
            "smtp.username" => self.smtp.username = value.to_string(),
            "smtp.password" => self.smtp.password = value.to_string(),
            "smtp.from" => self.smtp.from = value.to_string(),
            "smtp.security" => {
                self.smtp.security = match value.to_lowercase().as_str() {
                    "starttls" => SmtpSecurity::StartTls,
                    "tls" => SmtpSecurity::Tls,
                    "plain" => SmtpSecurity::Plain,
                    _ => {
                        return Err(QuickApplyError::Configuration(format!(
                            "Invalid smtp.security: {}. Supported: starttls, tls, plain",
                            value
                        )))
                    }
                }
            }
            "llm.enabled" => self.llm.enabled = parse(key, value)?,
            "llm.domain_inference" => self.llm.domain_inference = parse(key, value)?,
            "llm.base_url" => self.llm.base_url = value.to_string(),
            "llm.api_key" => self.llm.api_key = value.to_string(),
            "llm.model" => self.llm.model = value.to_string(),
            "llm.temperature" => self.llm.temperature = parse(key, value)?,
            "resolution.fuzzy_threshold" => self.resolution.fuzzy_threshold = parse(key, value)?,
            "resolution.default_local_part" => self.resolution.default_local_part = value.to_string(),
            "resolution.fallback_domain" => {
                self.resolution.fallback_domain = Some(value.to_string()).filter(|v| !v.is_empty())
            }
            "resolution.search_url" => {
                self.resolution.search_url = Some(value.to_string()).filter(|v| !v.is_empty())
            }
            "batch.log_dir" => self.batch.log_dir = PathBuf::from(value),
            "batch.concurrency" => self.batch.concurrency = parse(key, value)?,
            "batch.attach_original" => self.batch.attach_original = parse(key, value)?,
            _ => {
                return Err(QuickApplyError::Configuration(format!("Unknown configuration key: {}", key)));
            }
        }

        self.validate()
    }
}
