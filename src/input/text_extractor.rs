//! Text extraction from résumé files

use crate::error::{QuickApplyError, Result};
use pulldown_cmark::{html, Parser};
use regex::Regex;

pub trait TextExtractor {
    fn extract(&self, bytes: &[u8], source: &str) -> Result<String>;
}

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, bytes: &[u8], source: &str) -> Result<String> {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            QuickApplyError::PdfExtraction(format!("Failed to extract text from PDF '{}': {}", source, e))
        })
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8], _source: &str) -> Result<String> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

pub struct MarkdownExtractor;

impl TextExtractor for MarkdownExtractor {
    fn extract(&self, bytes: &[u8], _source: &str) -> Result<String> {
        let markdown_content = String::from_utf8_lossy(bytes);

        let parser = Parser::new(&markdown_content);
        let mut html_output = String::new();
        html::push_html(&mut html_output, parser);

        Ok(self.html_to_text(&html_output))
    }
}

impl MarkdownExtractor {
    fn html_to_text(&self, html: &str) -> String {
        let text = html
            .replace("<br>", "\n")
            .replace("<br />", "\n")
            .replace("</p>", "\n\n")
            .replace("</li>", "\n")
            .replace("&nbsp;", " ")
            .replace("&amp;", "&")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'");

        let re = Regex::new(r"<[^>]*>").expect("Invalid tag regex");
        let clean_text = re.replace_all(&text, "");

        let lines: Vec<&str> = clean_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_is_flattened() {
        let md = b"# Jane Doe\n\n**Rust** engineer\n\n- Tokio\n- Serde\n";
        let text = MarkdownExtractor.extract(md, "cv.md").unwrap();

        assert!(text.contains("Jane Doe"));
        assert!(text.contains("Rust engineer"));
        assert!(text.contains("Tokio"));
        assert!(!text.contains("**"));
        assert!(!text.contains('#'));
    }

    #[test]
    fn test_invalid_pdf_is_an_error() {
        let result = PdfExtractor.extract(b"not a pdf", "cv.pdf");
        assert!(matches!(result, Err(QuickApplyError::PdfExtraction(_))));
    }
}
