//! Upload validation: size and extension checks before any work is done.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::extract::{DocumentFormat, detect_format};

/// Default upload cap in megabytes.
pub const MAX_SIZE_MB: u64 = 10;

/// Default upload cap in bytes.
pub const MAX_SIZE_BYTES: u64 = MAX_SIZE_MB * 1024 * 1024;

/// Accepted extensions, as shown to the user.
pub const ACCEPTED_FILES: &str = ".pdf,.docx,.txt";

/// Errors from validating an upload.
#[derive(Debug, Error, Diagnostic)]
pub enum UploadError {
    #[error("File is too large. Maximum size is {max_mb}MB.")]
    #[diagnostic(
        code(noteblaster::upload::too_large),
        help("The file is {size} bytes. Split the document or export only the chapters you need.")
    )]
    FileTooLarge { size: u64, max_mb: u64 },

    #[error("Invalid file type. Please upload a PDF, DOCX, or TXT file.")]
    #[diagnostic(
        code(noteblaster::upload::invalid_type),
        help("Accepted extensions: .pdf, .docx and .txt (got \"{name}\").")
    )]
    InvalidFileType { name: String },

    #[error("cannot read upload: {path}")]
    #[diagnostic(
        code(noteblaster::upload::unreadable),
        help("Check that the file exists and is readable.")
    )]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type UploadResult<T> = std::result::Result<T, UploadError>;

/// A file that passed upload validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    pub format: DocumentFormat,
}

/// Validate a name and size against the limits. Size is checked first.
pub fn validate(name: &str, size: u64, max_bytes: u64) -> UploadResult<DocumentFormat> {
    if size > max_bytes {
        return Err(UploadError::FileTooLarge {
            size,
            max_mb: max_bytes / (1024 * 1024),
        });
    }
    detect_format(name).ok_or_else(|| UploadError::InvalidFileType {
        name: name.to_string(),
    })
}

/// Validate a file on disk without reading its contents.
pub fn validate_path(path: &Path, max_bytes: u64) -> UploadResult<Upload> {
    let metadata = std::fs::metadata(path).map_err(|e| UploadError::Unreadable {
        path: path.display().to_string(),
        source: e,
    })?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let format = validate(&file_name, metadata.len(), max_bytes)?;
    Ok(Upload {
        path: path.to_path_buf(),
        file_name,
        size: metadata.len(),
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_supported_extensions() {
        assert_eq!(validate("a.pdf", 1, MAX_SIZE_BYTES).unwrap(), DocumentFormat::Pdf);
        assert_eq!(validate("a.docx", 1, MAX_SIZE_BYTES).unwrap(), DocumentFormat::Docx);
        assert_eq!(validate("a.txt", 1, MAX_SIZE_BYTES).unwrap(), DocumentFormat::PlainText);
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert!(validate("a.txt", MAX_SIZE_BYTES, MAX_SIZE_BYTES).is_ok());
        let err = validate("a.txt", MAX_SIZE_BYTES + 1, MAX_SIZE_BYTES).unwrap_err();
        assert_eq!(err.to_string(), "File is too large. Maximum size is 10MB.");
    }

    #[test]
    fn size_is_checked_before_extension() {
        let err = validate("a.exe", MAX_SIZE_BYTES + 1, MAX_SIZE_BYTES).unwrap_err();
        assert!(matches!(err, UploadError::FileTooLarge { .. }));
    }

    #[test]
    fn rejects_other_extensions() {
        let err = validate("slides.pptx", 10, MAX_SIZE_BYTES).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid file type. Please upload a PDF, DOCX, or TXT file."
        );
    }

    #[test]
    fn validate_path_reads_metadata() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("chapter.txt");
        std::fs::write(&path, "abc").unwrap();
        let upload = validate_path(&path, MAX_SIZE_BYTES).unwrap();
        assert_eq!(upload.file_name, "chapter.txt");
        assert_eq!(upload.size, 3);
        assert_eq!(upload.format, DocumentFormat::PlainText);
    }

    #[test]
    fn validate_path_missing_file() {
        let err = validate_path(Path::new("/nonexistent/x.txt"), MAX_SIZE_BYTES).unwrap_err();
        assert!(matches!(err, UploadError::Unreadable { .. }));
    }
}
