//! XDG-compliant path resolution for noteblaster.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

const APP_DIR: &str = "noteblaster";

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(noteblaster::paths::no_home),
        help("Set the HOME environment variable or ensure a valid user profile exists.")
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(noteblaster::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Global XDG directories for noteblaster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// `$XDG_CONFIG_HOME/noteblaster/`
    pub config_dir: PathBuf,
    /// `$XDG_DATA_HOME/noteblaster/`
    pub data_dir: PathBuf,
    /// `$XDG_STATE_HOME/noteblaster/`
    pub state_dir: PathBuf,
}

impl AppPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let xdg = |var: &str, fallback: &str| {
            std::env::var(var)
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| home.join(fallback))
                .join(APP_DIR)
        };

        Ok(Self {
            config_dir: xdg("XDG_CONFIG_HOME", ".config"),
            data_dir: xdg("XDG_DATA_HOME", ".local/share"),
            state_dir: xdg("XDG_STATE_HOME", ".local/state"),
        })
    }

    /// All paths under one root, for tests and `--data-dir` style overrides.
    pub fn under(root: &std::path::Path) -> Self {
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
            state_dir: root.join("state"),
        }
    }

    /// Create all base directories. Idempotent.
    pub fn ensure_dirs(&self) -> PathResult<()> {
        for dir in [&self.config_dir, &self.data_dir, &self.state_dir] {
            std::fs::create_dir_all(dir).map_err(|e| PathError::CreateDir {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Path to the leaderboard store.
    pub fn leaderboard_file(&self) -> PathBuf {
        self.data_dir.join("leaderboard.json")
    }

    /// Log file used while the TUI owns the terminal.
    pub fn log_file(&self) -> PathBuf {
        self.state_dir.join("noteblaster.log")
    }
}
