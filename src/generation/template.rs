//! Deterministic generator built on askama text templates

use super::{AttachmentMode, ContentGenerator, Draft};
use crate::config::ApplicantConfig;
use crate::error::Result;
use crate::models::{JobPosting, ResumeDocument};
use crate::processing::TextProcessor;
use askama::Template;
use async_trait::async_trait;

const MAX_BULLETS: usize = 4;
const MAX_KEYWORDS: usize = 10;
const EXPERIENCE_CHARS: usize = 2000;

#[derive(Template)]
#[template(
    source = "Dear {{ greeting_name }},

I hope you're well. I'm writing to apply for the role posted at {{ company }}. Attached is my resume that highlights relevant experience and skills for this position.
{%- if !bullets.is_empty() %} I've worked on projects and roles that directly match the requirements listed in your job description, including:
{%- for bullet in bullets %}
- {{ bullet }}
{%- endfor %}
{%- endif %}

I'd love to discuss how my background can add value to your team. Please find my ATS-optimized resume attached.

Best regards,
{{ signature }}",
    ext = "txt"
)]
struct CoverEmail<'a> {
    greeting_name: &'a str,
    company: &'a str,
    bullets: Vec<String>,
    signature: &'a str,
}

#[derive(Template)]
#[template(
    source = "Name: {{ name }}
Contact: {{ contact }}

Summary:
Motivated professional with experience relevant to the role. Key strengths include: {{ keywords }}

Experience:
{{ experience }}

Skills:
{{ keywords }}",
    ext = "txt"
)]
struct TailoredResume<'a> {
    name: &'a str,
    contact: String,
    keywords: String,
    experience: String,
}

pub struct TemplateGenerator {
    applicant: ApplicantConfig,
    processor: TextProcessor,
    mode: AttachmentMode,
}

impl TemplateGenerator {
    pub fn new(applicant: ApplicantConfig) -> Self {
        Self {
            applicant,
            processor: TextProcessor::new(),
            mode: AttachmentMode::Tailored,
        }
    }

    pub fn with_attachment_mode(mut self, mode: AttachmentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn subject(&self, posting: &JobPosting) -> String {
        format!("Application for role - {}", posting.company_name.trim())
    }

    pub fn email_body(&self, posting: &JobPosting) -> Result<String> {
        let email = CoverEmail {
            greeting_name: posting.recruiter_first_name().unwrap_or("Hiring Team"),
            company: posting.company_name.trim(),
            bullets: self.processor.key_phrases(&posting.job_description, MAX_BULLETS),
            signature: self.applicant_name(),
        };
        Ok(email.render()?)
    }

    /// Résumé text seeded with the posting's most frequent keywords.
    pub fn tailored_resume(&self, posting: &JobPosting, resume_text: &str) -> Result<String> {
        let keywords = self
            .processor
            .top_keywords(&posting.job_description, MAX_KEYWORDS)
            .join(", ");

        let experience = if resume_text.trim().is_empty() {
            "Add your relevant experience here.".to_string()
        } else {
            self.processor.truncate(resume_text, EXPERIENCE_CHARS)
        };

        let resume = TailoredResume {
            name: self.applicant_name(),
            contact: self.contact_line(),
            keywords,
            experience,
        };
        Ok(resume.render()?)
    }

    pub fn ats_score(&self, posting: &JobPosting, resume_text: &str) -> u8 {
        self.processor.ats_score(&posting.job_description, resume_text)
    }

    /// Draft without going through the async trait.
    pub fn draft_now(&self, posting: &JobPosting, resume: &ResumeDocument) -> Result<Draft> {
        Ok(Draft {
            subject: self.subject(posting),
            body: self.email_body(posting)?,
            resume_text: self.tailored_resume(posting, &resume.text)?,
        })
    }

    fn applicant_name(&self) -> &str {
        non_empty(&self.applicant.name).unwrap_or("[Your Name]")
    }

    fn contact_line(&self) -> String {
        format!(
            "{} | {}",
            non_empty(&self.applicant.email).unwrap_or("[Your Email]"),
            non_empty(&self.applicant.phone).unwrap_or("[Your Phone]")
        )
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[async_trait]
impl ContentGenerator for TemplateGenerator {
    async fn draft(&self, posting: &JobPosting, resume: &ResumeDocument) -> Result<Draft> {
        self.draft_now(posting, resume)
    }

    fn attachment_mode(&self) -> AttachmentMode {
        self.mode
    }

    fn name(&self) -> &str {
        "template"
    }
}
