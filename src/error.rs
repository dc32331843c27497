//! Top-level diagnostic error for noteblaster.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]`
//! derives; this enum only wraps them so the binary can return a single type
//! and keep the full chain of codes and help text.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::extract::ExtractError;
use crate::generate::GenerateError;
use crate::leaderboard::LeaderboardError;
use crate::model::ContentFileError;
use crate::paths::PathError;
use crate::session::SessionError;
use crate::upload::UploadError;

#[derive(Debug, Error, Diagnostic)]
pub enum NoteBlasterError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Leaderboard(#[from] LeaderboardError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    ContentFile(#[from] ContentFileError),

    #[error("terminal I/O failed: {message}")]
    #[diagnostic(
        code(noteblaster::terminal),
        help("The TUI needs an interactive terminal. Try `noteblaster generate` for a non-interactive run.")
    )]
    Terminal { message: String },
}

impl From<std::io::Error> for NoteBlasterError {
    fn from(err: std::io::Error) -> Self {
        Self::Terminal {
            message: err.to_string(),
        }
    }
}

/// Convenience alias used across the binary.
pub type NoteBlasterResult<T> = std::result::Result<T, NoteBlasterError>;
