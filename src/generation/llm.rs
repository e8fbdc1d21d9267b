//! Generator that asks a chat model for the email and résumé

use super::template::TemplateGenerator;
use super::{AttachmentMode, ContentGenerator, Draft};
use crate::error::Result;
use crate::llm::{ChatBackend, ChatRequest, PromptParams, PromptTemplates};
use crate::models::{JobPosting, ResumeDocument};
use async_trait::async_trait;
use log::{debug, warn};
use serde::Deserialize;
use std::sync::Arc;

pub const FALLBACK_SUBJECT: &str = "Job Application";

#[derive(Debug, Default, Deserialize)]
struct ApplicationResponse {
    #[serde(default)]
    subject: String,
    #[serde(default)]
    email_body: String,
    #[serde(default)]
    resume_text: String,
}

impl ApplicationResponse {
    fn is_empty(&self) -> bool {
        [&self.subject, &self.email_body, &self.resume_text]
            .iter()
            .all(|field| field.trim().is_empty())
    }
}

pub struct LlmGenerator {
    backend: Arc<dyn ChatBackend>,
    prompts: PromptTemplates,
    fallback: TemplateGenerator,
    temperature: f32,
}

impl LlmGenerator {
    /// `fallback` produces the row's content when the model cannot be reached.
    pub fn new(backend: Arc<dyn ChatBackend>, fallback: TemplateGenerator) -> Self {
        Self {
            backend,
            prompts: PromptTemplates::default(),
            fallback,
            temperature: 0.7,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn prompt_for(&self, posting: &JobPosting, resume: &ResumeDocument) -> String {
        let params = PromptParams {
            resume_content: resume.text.clone(),
            job_content: posting.job_description.clone(),
            recruiter_name: posting
                .recruiter_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            company_name: posting.company_name.trim().to_string(),
        };
        self.prompts.render_application(&params)
    }
}

/// Read the model's JSON answer, tolerating fences and surrounding prose.
pub fn parse_response(raw: &str, original_resume: &str) -> Draft {
    match first_response(raw) {
        Some(response) => Draft {
            subject: or_default(response.subject, FALLBACK_SUBJECT),
            body: or_default(response.email_body, raw.trim()),
            resume_text: or_default(response.resume_text, original_resume),
        },
        None => {
            debug!("Model output was not JSON; using it as the email body");
            Draft {
                subject: FALLBACK_SUBJECT.to_string(),
                body: raw.trim().to_string(),
                resume_text: original_resume.to_string(),
            }
        }
    }
}

/// First non-empty JSON object in `raw`; text before and after it is ignored.
fn first_response(raw: &str) -> Option<ApplicationResponse> {
    raw.match_indices('{').find_map(|(start, _)| {
        serde_json::Deserializer::from_str(&raw[start..])
            .into_iter::<ApplicationResponse>()
            .next()
            .and_then(|parsed| parsed.ok())
            .filter(|response| !response.is_empty())
    })
}

fn or_default(value: String, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.trim().to_string()
    }
}

#[async_trait]
impl ContentGenerator for LlmGenerator {
    async fn draft(&self, posting: &JobPosting, resume: &ResumeDocument) -> Result<Draft> {
        let request = ChatRequest::new(self.prompt_for(posting, resume)).with_temperature(self.temperature);

        match self.backend.complete(&request).await {
            Ok(raw) => Ok(parse_response(&raw, &resume.text)),
            Err(e) => {
                warn!(
                    "LLM call failed for row {} ({}); falling back to template",
                    posting.row_index, e
                );
                self.fallback.draft_now(posting, resume)
            }
        }
    }

    fn attachment_mode(&self) -> AttachmentMode {
        self.fallback.attachment_mode()
    }

    fn name(&self) -> &str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApplicantConfig;
    use crate::error::QuickApplyError;
    use crate::input::file_detector::FileType;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    struct ScriptedBackend {
        reply: std::result::Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new(reply: std::result::Result<&str, &str>) -> Self {
            Self {
                reply: reply.map(str::to_string).map_err(str::to_string),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn complete(&self, request: &ChatRequest) -> Result<String> {
            self.prompts.lock().unwrap().push(request.prompt.clone());
            self.reply.clone().map_err(QuickApplyError::Network)
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn posting() -> JobPosting {
        JobPosting::new(3, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), "Acme")
            .with_description("Rust services")
    }

    fn resume() -> ResumeDocument {
        ResumeDocument {
            file_name: "cv.txt".to_string(),
            file_type: FileType::Text,
            bytes: b"Original resume".to_vec(),
            text: "Original resume".to_string(),
        }
    }

    #[test]
    fn test_parse_fenced_json() {
        let raw = "Sure! Here it is:\n```json\n{\"subject\": \"Rust role\", \"email_body\": \"Hi there\", \"resume_text\": \"Better resume\"}\n```";
        let draft = parse_response(raw, "orig");

        assert_eq!(draft.subject, "Rust role");
        assert_eq!(draft.body, "Hi there");
        assert_eq!(draft.resume_text, "Better resume");
    }

    #[test]
    fn test_parse_skips_braces_in_prose() {
        let draft = parse_response("Sure {here} it is: {\"subject\":\"S\",\"email_body\":\"B\"} {done}", "orig");

        assert_eq!(draft.subject, "S");
        assert_eq!(draft.body, "B");
        assert_eq!(draft.resume_text, "orig");
    }

    #[test]
    fn test_parse_garbage_falls_back() {
        let draft = parse_response("  I cannot help with that.  ", "orig");

        assert_eq!(draft.subject, FALLBACK_SUBJECT);
        assert_eq!(draft.body, "I cannot help with that.");
        assert_eq!(draft.resume_text, "orig");
    }

    #[test]
    fn test_parse_missing_fields_use_defaults() {
        let draft = parse_response("{\"email_body\": \"Hello\"}", "orig");
        assert_eq!(draft.subject, FALLBACK_SUBJECT);
        assert_eq!(draft.body, "Hello");
        assert_eq!(draft.resume_text, "orig");
    }

    #[tokio::test]
    async fn test_prompt_contains_posting_details() {
        let backend = Arc::new(ScriptedBackend::new(Ok("{\"subject\": \"S\", \"email_body\": \"B\"}")));
        let generator = LlmGenerator::new(backend.clone(), TemplateGenerator::new(ApplicantConfig::default()));

        let draft = generator.draft(&posting(), &resume()).await.unwrap();
        assert_eq!(draft.subject, "S");

        let prompts = backend.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Original resume"));
        assert!(prompts[0].contains("Rust services"));
        assert!(prompts[0].contains("Recruiter: Unknown"));
    }

    #[tokio::test]
    async fn test_backend_failure_uses_template() {
        let backend = Arc::new(ScriptedBackend::new(Err("connection refused")));
        let generator = LlmGenerator::new(backend, TemplateGenerator::new(ApplicantConfig::default()));

        let app = generator.generate(&posting(), &resume()).await.unwrap();
        assert_eq!(app.subject, "Application for role - Acme");
        assert!(app.attachment.bytes.starts_with(b"%PDF"));
    }
}
