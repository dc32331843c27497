//! Plain-text extraction from uploaded documents.
//!
//! Each supported format (PDF, DOCX, plain text) implements `TextExtractor`.
//! `extractor_for()` returns the right extractor for a format and
//! `extract_file()` reads a path and dispatches on its extension.

pub mod docx;
pub mod error;
pub mod pdf;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use error::{ExtractError, ExtractResult};

/// Document formats accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::PlainText => "TXT",
        }
    }

    /// File extension including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => ".pdf",
            Self::Docx => ".docx",
            Self::PlainText => ".txt",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for format-specific text extractors.
pub trait TextExtractor {
    /// Turn raw file bytes into plain text.
    fn extract(&self, data: &[u8]) -> ExtractResult<String>;

    /// The format this extractor handles.
    fn format(&self) -> DocumentFormat;
}

/// Get the extractor for a document format.
pub fn extractor_for(format: DocumentFormat) -> Box<dyn TextExtractor> {
    match format {
        DocumentFormat::Pdf => Box::new(pdf::PdfExtractor),
        DocumentFormat::Docx => Box::new(docx::DocxExtractor),
        DocumentFormat::PlainText => Box::new(PlainTextExtractor),
    }
}

/// Detect the document format from a file name, case-insensitively.
pub fn detect_format(name: &str) -> Option<DocumentFormat> {
    let lower = name.to_lowercase();
    if lower.ends_with(".pdf") {
        Some(DocumentFormat::Pdf)
    } else if lower.ends_with(".docx") {
        Some(DocumentFormat::Docx)
    } else if lower.ends_with(".txt") {
        Some(DocumentFormat::PlainText)
    } else {
        None
    }
}

/// Read a file and extract its text based on the extension.
pub fn extract_file(path: &Path) -> ExtractResult<String> {
    let name = path.to_string_lossy();
    let format = detect_format(&name).ok_or_else(|| ExtractError::UnsupportedFormat {
        extension: path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default(),
    })?;

    let data = std::fs::read(path).map_err(|e| ExtractError::Io {
        format: format.as_str().into(),
        source: e,
    })?;

    let text = extractor_for(format).extract(&data)?;
    tracing::debug!(%format, bytes = data.len(), chars = text.chars().count(), "extracted text");
    Ok(text)
}

/// Plain-text extractor: lossy UTF-8 decode.
struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::PlainText
    }

    fn extract(&self, data: &[u8]) -> ExtractResult<String> {
        let text = String::from_utf8_lossy(data);
        // Drop a UTF-8 byte order mark if an editor wrote one.
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }
}
