//! Input manager for loading résumé documents

use crate::error::{QuickApplyError, Result};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use crate::models::ResumeDocument;
use log::{info, warn};
use std::path::Path;
use tokio::fs;

#[derive(Debug, Default)]
pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self
    }

    /// Read a résumé and extract its text.
    ///
    /// A PDF whose text cannot be extracted still loads, with empty text, so the
    /// original bytes can be attached and the template generator can run.
    pub async fn load_resume(&self, path: &Path) -> Result<ResumeDocument> {
        let key = path.to_string_lossy().to_string();

        if !path.exists() {
            return Err(QuickApplyError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let file_type = FileType::from_path(path);
        let bytes = fs::read(path).await?;
        let text = match file_type {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                match PdfExtractor.extract(&bytes, &key) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("{}; continuing with empty resume text", e);
                        String::new()
                    }
                }
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(&bytes, &key)?
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                MarkdownExtractor.extract(&bytes, &key)?
            }
            FileType::Unknown => {
                return Err(QuickApplyError::UnsupportedFormat(format!(
                    "Unsupported resume type for: {} (expected pdf, txt or md)",
                    path.display()
                )));
            }
        };

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "resume".to_string());

        Ok(ResumeDocument {
            file_name,
            file_type,
            bytes,
            text,
        })
    }

    /// Extract only the text of a résumé.
    pub async fn extract_text(&self, path: &Path) -> Result<String> {
        Ok(self.load_resume(path).await?.text)
    }
}
