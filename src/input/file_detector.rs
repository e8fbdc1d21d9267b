//! File type detection

use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FileType {
    Pdf,
    Text,
    Markdown,
    Unknown,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => FileType::Pdf,
            "txt" => FileType::Text,
            "md" | "markdown" => FileType::Markdown,
            _ => FileType::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(FileType::Unknown)
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            FileType::Pdf => "application/pdf",
            FileType::Text => "text/plain",
            FileType::Markdown => "text/markdown",
            FileType::Unknown => "application/octet-stream",
        }
    }
}

/// Tabular job sheet formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SheetFormat {
    Csv,
    Workbook,
    Unknown,
}

impl SheetFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => SheetFormat::Csv,
            "xlsx" | "xlsm" | "xls" | "ods" => SheetFormat::Workbook,
            _ => SheetFormat::Unknown,
        }
    }
}
