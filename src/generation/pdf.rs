//! Plain-text résumé to PDF

use crate::error::{QuickApplyError, Result};
use printpdf::{BuiltinFont, Mm, PdfDocument};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 14.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 4.2;
const WRAP_WIDTH: usize = 120;

/// Render `text` under a bold `title` on A4 pages.
pub fn render_resume_pdf(title: &str, text: &str) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");

    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| QuickApplyError::PdfRender(e.to_string()))?;
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| QuickApplyError::PdfRender(e.to_string()))?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = PAGE_HEIGHT - MARGIN;

    layer.use_text(title, TITLE_SIZE, Mm(MARGIN), Mm(y), &bold);
    y -= 2.0 * LINE_HEIGHT;

    for line in wrap_lines(text, WRAP_WIDTH) {
        if y < MARGIN + LINE_HEIGHT {
            let (page, page_layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            layer = doc.get_page(page).get_layer(page_layer);
            y = PAGE_HEIGHT - MARGIN;
        }
        if !line.is_empty() {
            layer.use_text(line, BODY_SIZE, Mm(MARGIN), Mm(y), &regular);
        }
        y -= LINE_HEIGHT;
    }

    doc.save_to_bytes()
        .map_err(|e| QuickApplyError::PdfRender(e.to_string()))
}

/// Split into lines, hard-wrapping anything longer than `width` characters.
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for line in text.lines() {
        let chars: Vec<char> = line.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        for chunk in chars.chunks(width) {
            lines.push(chunk.iter().collect());
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_lines() {
        let long = "x".repeat(250);
        let lines = wrap_lines(&format!("short\n\n{}", long), 120);

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "short");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2].len(), 120);
        assert_eq!(lines[4].len(), 10);
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render_resume_pdf("Resume - Acme", "Name: Jane\nSkills: rust").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_long_text_spills_onto_new_pages() {
        let text = vec!["line of experience"; 200].join("\n");
        let one_page = render_resume_pdf("Resume", "short").unwrap();
        let many_pages = render_resume_pdf("Resume", &text).unwrap();
        assert!(many_pages.len() > one_page.len());
    }
}
