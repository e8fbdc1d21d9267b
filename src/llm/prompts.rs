//! Prompt templates for application generation and domain lookup

use log::debug;
use serde::{Deserialize, Serialize};

/// Prompt templates with `{placeholder}` substitution
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub application: String,
    pub domain_lookup: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            application: APPLICATION_TEMPLATE.to_string(),
            domain_lookup: DOMAIN_LOOKUP_TEMPLATE.to_string(),
        }
    }
}

/// Parameters for the application prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptParams {
    pub resume_content: String,
    pub job_content: String,
    pub recruiter_name: Option<String>,
    pub company_name: String,
}

impl PromptTemplates {
    /// Prompt asking for `{subject, email_body, resume_text}` as JSON
    pub fn render_application(&self, params: &PromptParams) -> String {
        debug!(
            "Rendering application prompt: resume {} chars, job {} chars",
            params.resume_content.len(),
            params.job_content.len()
        );

        self.application
            .replace("{resume}", &params.resume_content)
            .replace("{job}", &params.job_content)
            .replace("{company}", &params.company_name)
            .replace("{recruiter}", params.recruiter_name.as_deref().unwrap_or("Unknown"))
    }

    pub fn render_domain_lookup(&self, company_name: &str) -> String {
        self.domain_lookup.replace("{company}", company_name)
    }
}

const APPLICATION_TEMPLATE: &str = r#"You are an AI job application assistant.
User's original resume:
{resume}

Job description:
{job}

Company: {company}
Recruiter: {recruiter}

TASKS:
1. Rewrite the resume to maximize ATS score for this job.
2. Generate a professional, concise email for applying.
Return your output as JSON with keys:
- subject
- email_body
- resume_text (optimized)"#;

const DOMAIN_LOOKUP_TEMPLATE: &str =
    "Find the most likely official domain name of the company '{company}'. Only return the domain, no extra text.";
