//! Diagnostic error types for text extraction.

use miette::Diagnostic;
use thiserror::Error;

/// Errors from turning an uploaded document into plain text.
#[derive(Debug, Error, Diagnostic)]
pub enum ExtractError {
    #[error("Unsupported file type. Please upload a PDF, DOCX, or TXT file.")]
    #[diagnostic(
        code(noteblaster::extract::unsupported_format),
        help("Supported extensions are .pdf, .docx and .txt (got \"{extension}\").")
    )]
    UnsupportedFormat { extension: String },

    #[error("Failed to parse {format} file.")]
    #[diagnostic(
        code(noteblaster::extract::parse_error),
        help("The document could not be parsed: {message}. Verify the file is not corrupted.")
    )]
    ParseError { format: String, message: String },

    #[error("Failed to read {format} file.")]
    #[diagnostic(
        code(noteblaster::extract::io),
        help("A filesystem operation failed. Check file paths and permissions.")
    )]
    Io {
        format: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for extraction results.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
