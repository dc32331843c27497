//! One study session: upload → extract → generate → results.
//!
//! The steps run sequentially with no retries. Any failure after upload
//! validation moves the session to [`AppState::Error`] with a single
//! user-facing message; [`Session::reset`] returns it to [`AppState::Upload`].

use std::path::Path;

use miette::Diagnostic;
use thiserror::Error;

use crate::config::Limits;
use crate::extract::extract_file;
use crate::generate::ContentGenerator;
use crate::model::StudyContent;
use crate::upload::{UploadError, validate_path};

/// Message used when the extracted text is below the minimum length.
pub const TEXT_TOO_SHORT: &str =
    "Extracted text is too short. Please upload a file with more content.";

/// What the results screen is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum View {
    #[default]
    Notes,
    Game,
}

/// Where the session is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AppState {
    #[default]
    Upload,
    Processing {
        file_name: String,
    },
    Results {
        file_name: String,
        content: StudyContent,
        view: View,
    },
    Error {
        message: String,
    },
}

/// Errors returned from [`Session::process_file`].
#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    /// The file was rejected before any processing; the session stays in `Upload`.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Upload(#[from] UploadError),

    #[error("{message}")]
    #[diagnostic(
        code(noteblaster::session::failed),
        help("Nothing is retried automatically. Try again with a different file.")
    )]
    Failed { message: String },
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Drives the upload-to-results flow for one document at a time.
pub struct Session {
    state: AppState,
    limits: Limits,
    generator: Box<dyn ContentGenerator>,
}

impl Session {
    pub fn new(generator: Box<dyn ContentGenerator>, limits: Limits) -> Self {
        Self {
            state: AppState::Upload,
            limits,
            generator,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// The generated content, when results are available.
    pub fn content(&self) -> Option<&StudyContent> {
        match &self.state {
            AppState::Results { content, .. } => Some(content),
            _ => None,
        }
    }

    /// Run the whole pipeline for one file.
    ///
    /// Upload-validation failures are returned without touching the state, so
    /// nothing is extracted or sent anywhere for a rejected file.
    pub fn process_file(&mut self, path: &Path) -> SessionResult<&StudyContent> {
        let upload = validate_path(path, self.limits.max_upload_bytes)?;
        tracing::info!(file = %upload.file_name, size = upload.size, format = %upload.format, "processing upload");

        self.state = AppState::Processing {
            file_name: upload.file_name.clone(),
        };

        let content = match self.extract_and_generate(path) {
            Ok(content) => content,
            Err(cause) => {
                let message = format!("Failed to process file. {cause}");
                tracing::error!(file = %upload.file_name, %cause, "error processing file");
                self.state = AppState::Error {
                    message: message.clone(),
                };
                return Err(SessionError::Failed { message });
            }
        };

        self.load_content(upload.file_name, content);
        self.content().ok_or_else(|| SessionError::Failed {
            message: "results were not stored".into(),
        })
    }

    fn extract_and_generate(&self, path: &Path) -> Result<StudyContent, String> {
        let text = extract_file(path).map_err(|e| e.to_string())?;
        let chars = text.trim().chars().count();
        if chars < self.limits.min_text_chars {
            return Err(TEXT_TOO_SHORT.to_string());
        }
        tracing::debug!(chars, generator = self.generator.name(), "sending text for generation");
        self.generator.generate(&text).map_err(|e| e.user_message())
    }

    /// Enter the results state with already generated content.
    pub fn load_content(&mut self, file_name: impl Into<String>, content: StudyContent) {
        self.state = AppState::Results {
            file_name: file_name.into(),
            content,
            view: View::Notes,
        };
    }

    /// Switch between notes and games. Ignored outside the results state.
    pub fn set_view(&mut self, new_view: View) {
        if let AppState::Results { view, .. } = &mut self.state {
            *view = new_view;
        }
    }

    /// Discard everything and go back to the upload state.
    pub fn reset(&mut self) {
        self.state = AppState::Upload;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("generator", &self.generator.name())
            .finish()
    }
}
