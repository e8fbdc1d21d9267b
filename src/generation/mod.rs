//! Cover email and tailored résumé generation
//!
//! A generator produces a [`Draft`] (subject, body and résumé text); the
//! shared [`ContentGenerator::generate`] turns it into the final
//! [`GeneratedApplication`] with the configured attachment.

pub mod llm;
pub mod pdf;
pub mod template;

pub use llm::LlmGenerator;
pub use template::TemplateGenerator;

use crate::error::Result;
use crate::models::{attachment_file_name, Attachment, GeneratedApplication, JobPosting, ResumeDocument};
use async_trait::async_trait;

/// Text content for one application before an attachment is chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub subject: String,
    pub body: String,
    pub resume_text: String,
}

/// Which résumé goes out with the email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentMode {
    /// A PDF rendered from the draft's résumé text
    #[default]
    Tailored,
    /// The uploaded file, untouched
    Original,
}

impl AttachmentMode {
    pub fn from_flag(attach_original: bool) -> Self {
        if attach_original {
            AttachmentMode::Original
        } else {
            AttachmentMode::Tailored
        }
    }
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn draft(&self, posting: &JobPosting, resume: &ResumeDocument) -> Result<Draft>;

    fn attachment_mode(&self) -> AttachmentMode;

    fn name(&self) -> &str;

    async fn generate(&self, posting: &JobPosting, resume: &ResumeDocument) -> Result<GeneratedApplication> {
        let draft = self.draft(posting, resume).await?;
        build_application(draft, posting, resume, self.attachment_mode())
    }
}

/// Attach either the rendered draft or the original upload.
pub fn build_application(
    draft: Draft,
    posting: &JobPosting,
    resume: &ResumeDocument,
    mode: AttachmentMode,
) -> Result<GeneratedApplication> {
    let attachment = match mode {
        AttachmentMode::Original => Attachment {
            file_name: resume.file_name.clone(),
            content_type: resume.mime_type().to_string(),
            bytes: resume.bytes.clone(),
        },
        AttachmentMode::Tailored => {
            let title = format!("Resume - {}", posting.company_name.trim());
            let bytes = pdf::render_resume_pdf(&title, &draft.resume_text)?;
            Attachment::pdf(attachment_file_name(&posting.company_name), bytes)
        }
    };

    Ok(GeneratedApplication {
        subject: draft.subject,
        body: draft.body,
        attachment,
    })
}
