//! Application configuration, persisted as TOML.
//!
//! Lives at `$XDG_CONFIG_HOME/noteblaster/config.toml`. Every field has a
//! default, so a missing file or a partial file is fine. The Gemini API key
//! may also come from `GEMINI_API_KEY` or `API_KEY`, which win over the file.

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generate::{
    ContentGenerator, GeminiClient, GeminiConfig, GenerateResult, MAX_PROMPT_CHARS, ModelGenerator,
    OllamaClient, OllamaConfig,
};
use crate::upload::MAX_SIZE_BYTES;

/// Errors from loading or saving configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(noteblaster::config::read),
        help("Ensure the config file exists and is valid TOML.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(noteblaster::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(noteblaster::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Which model backend generates study content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    Ollama,
}

/// Size and length limits applied by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Largest accepted upload in bytes.
    pub max_upload_bytes: u64,
    /// Fewest characters of extracted text worth sending to the model.
    pub min_text_chars: usize,
    /// Longest text, in characters, sent to the model.
    pub max_prompt_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_upload_bytes: MAX_SIZE_BYTES,
            min_text_chars: 100,
            max_prompt_chars: MAX_PROMPT_CHARS,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: Provider,
    pub gemini: GeminiConfig,
    pub ollama: OllamaConfig,
    pub limits: Limits,
}

impl Config {
    /// Load from a TOML file, falling back to defaults if it does not exist,
    /// then apply environment overrides.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|var| std::env::var(var).ok());
        Ok(config)
    }

    /// Parse a TOML file without environment overrides.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Apply `GEMINI_API_KEY` / `API_KEY`. The lookup is injected so tests
    /// need not touch the process environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let key = ["GEMINI_API_KEY", "API_KEY"]
            .into_iter()
            .find_map(|var| lookup(var).filter(|v| !v.trim().is_empty()));
        if let Some(key) = key {
            self.gemini.api_key = Some(key);
        }
    }

    /// Build the configured content generator. Nothing is sent over the
    /// network until the generator is asked for content.
    pub fn generator(&self) -> GenerateResult<Box<dyn ContentGenerator>> {
        let generator = match self.provider {
            Provider::Gemini => {
                ModelGenerator::new(Box::new(GeminiClient::new(self.gemini.clone())?))
            }
            Provider::Ollama => {
                ModelGenerator::new(Box::new(OllamaClient::new(self.ollama.clone())))
            }
        };
        Ok(Box::new(generator.with_max_chars(self.limits.max_prompt_chars)))
    }
}
