//! Study-content generation through a hosted or local language model.
//!
//! The document text is normalized, wrapped in a prompt that asks for notes,
//! multiple-choice questions and fill-in-the-blank questions, and sent to a
//! model together with a response schema. The JSON the model returns is then
//! sanitized (see [`sanitize`]) before anything is shown to the user.
//!
//! Providers implement [`JsonModel`]; [`ModelGenerator`] turns any of them into
//! a [`ContentGenerator`], which is the seam the session works against.

pub mod gemini;
pub mod ollama;
pub mod sanitize;

use std::sync::LazyLock;

use miette::Diagnostic;
use regex::Regex;
use serde_json::{Value, json};
use thiserror::Error;

use crate::model::StudyContent;

pub use gemini::{GeminiClient, GeminiConfig};
pub use ollama::{OllamaClient, OllamaConfig};

/// Longest text, in characters, sent to the model.
pub const MAX_PROMPT_CHARS: usize = 45_000;

/// Message shown for every generation failure except an empty question set.
pub const GENERIC_FAILURE: &str = "The AI failed to generate study content. \
     The provided document might be too complex or not contain enough text.";

/// Errors from the content generation subsystem.
#[derive(Debug, Error, Diagnostic)]
pub enum GenerateError {
    #[error("no API key configured for {provider}")]
    #[diagnostic(
        code(noteblaster::generate::missing_api_key),
        help(
            "Set GEMINI_API_KEY (or API_KEY) in the environment, or add `api_key` \
             under [gemini] in config.toml."
        )
    )]
    MissingApiKey { provider: String },

    #[error("{provider} request failed: {message}")]
    #[diagnostic(
        code(noteblaster::generate::request_failed),
        help("Check your network connection and that the service URL is correct.")
    )]
    RequestFailed { provider: String, message: String },

    #[error("{provider} returned HTTP {status}: {message}")]
    #[diagnostic(
        code(noteblaster::generate::http_status),
        help("Check the API key and model name; 4xx errors are usually configuration problems.")
    )]
    HttpStatus {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("failed to parse model response: {message}")]
    #[diagnostic(
        code(noteblaster::generate::parse_error),
        help("The model returned an unexpected response format.")
    )]
    ParseError { message: String },

    #[error("AI response is missing required 'notes' or 'questions' fields.")]
    #[diagnostic(
        code(noteblaster::generate::missing_fields),
        help("The model ignored the response schema. Try again or use a different model.")
    )]
    MissingFields,

    #[error("The AI failed to generate any valid multiple-choice questions.")]
    #[diagnostic(
        code(noteblaster::generate::no_valid_questions),
        help("Every question was discarded because its answer did not match any of its options.")
    )]
    NoValidQuestions,
}

impl GenerateError {
    /// The message shown to the user.
    ///
    /// Only an empty question set is reported as-is; everything else collapses
    /// into [`GENERIC_FAILURE`] and the details go to the log.
    pub fn user_message(&self) -> String {
        match self {
            Self::NoValidQuestions => self.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

pub type GenerateResult<T> = std::result::Result<T, GenerateError>;

/// Produces study content from document text.
pub trait ContentGenerator {
    fn generate(&self, text: &str) -> GenerateResult<StudyContent>;

    /// Provider name for logs and status lines.
    fn name(&self) -> &str;
}

/// A model that answers a prompt with JSON text following a schema.
pub trait JsonModel {
    /// Send `prompt` and return the raw response text.
    ///
    /// `schema` is a JSON Schema with lowercase type names; providers with a
    /// different dialect convert it themselves.
    fn complete_json(&self, prompt: &str, schema: &Value) -> GenerateResult<String>;

    fn name(&self) -> &str;
}

/// [`ContentGenerator`] over any [`JsonModel`].
pub struct ModelGenerator {
    model: Box<dyn JsonModel>,
    max_chars: usize,
}

impl ModelGenerator {
    pub fn new(model: Box<dyn JsonModel>) -> Self {
        Self {
            model,
            max_chars: MAX_PROMPT_CHARS,
        }
    }

    /// Override the prompt text cap.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    fn run(&self, text: &str) -> GenerateResult<StudyContent> {
        let processed = prepare_text(text, self.max_chars);
        let prompt = build_prompt(&processed);
        let raw = self.model.complete_json(&prompt, &study_content_schema())?;
        let value = parse_json_object(&raw)?;
        let content = sanitize::sanitize_response(&value)?;
        tracing::info!(
            provider = self.model.name(),
            notes = content.note_count(),
            questions = content.question_count(),
            fill_in = content.fill_in_the_blank_count(),
            "study content generated"
        );
        Ok(content)
    }
}

impl ContentGenerator for ModelGenerator {
    fn generate(&self, text: &str) -> GenerateResult<StudyContent> {
        self.run(text).inspect_err(|e| {
            tracing::error!(provider = self.model.name(), error = %e, "content generation failed");
        })
    }

    fn name(&self) -> &str {
        self.model.name()
    }
}

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Collapse whitespace runs to single spaces, trim, and cap at `max_chars` characters.
pub fn prepare_text(text: &str, max_chars: usize) -> String {
    let collapsed = RE_WHITESPACE.replace_all(text, " ");
    let trimmed = collapsed.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            tracing::warn!(
                max_chars,
                "input text is very long, truncating before sending to the model"
            );
            trimmed[..cut].to_string()
        }
        None => trimmed.to_string(),
    }
}

/// The instruction sent with every document.
pub fn build_prompt(text: &str) -> String {
    format!(
        "You are an expert study assistant. Based on the following text, please do three things:
1.  Extract and summarize the most important key points, concepts, and definitions into a concise list of notes.
2.  Create a list of 8-10 challenging multiple-choice questions. For each, provide four distinct options and the correct answer.
3.  Create a list of 5-8 \"fill-in-the-blank\" questions where the answer is a single key term or short phrase.

Ensure your entire response is a single, valid JSON object that strictly adheres to the provided schema.

Text to analyze:
---
{text}
---
"
    )
}

/// Response schema for [`StudyContent`], as JSON Schema.
pub fn study_content_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "notes": {
                "type": "array",
                "description": "A list of summarized key points, concepts, and definitions from the text. Each point should be a concise string.",
                "items": { "type": "string" }
            },
            "questions": {
                "type": "array",
                "description": "A list of 8-10 multiple-choice questions that test understanding of the material.",
                "items": {
                    "type": "object",
                    "properties": {
                        "question": { "type": "string", "description": "The question text." },
                        "options": {
                            "type": "array",
                            "description": "An array of 4 possible answers as strings.",
                            "items": { "type": "string" }
                        },
                        "answer": {
                            "type": "string",
                            "description": "The correct answer, which must exactly match one of the strings in the 'options' array."
                        }
                    },
                    "required": ["question", "options", "answer"]
                }
            },
            "fillInTheBlankQuestions": {
                "type": "array",
                "description": "A list of 5-8 fill-in-the-blank or short-answer questions, perfect for a typing game. The answer should be a single word or short phrase.",
                "items": {
                    "type": "object",
                    "properties": {
                        "question": { "type": "string", "description": "The question text, often with a '____' to indicate the blank." },
                        "answer": { "type": "string", "description": "The single word or short phrase that correctly fills the blank." }
                    },
                    "required": ["question", "answer"]
                }
            }
        },
        "required": ["notes", "questions", "fillInTheBlankQuestions"]
    })
}

/// Parse the model's reply, tolerating a markdown fence or prose around the object.
pub fn parse_json_object(raw: &str) -> GenerateResult<Value> {
    let trimmed = raw.trim();
    let json_str = if trimmed.starts_with('{') {
        trimmed
    } else {
        match (trimmed.find('{'), trimmed.rfind('}')) {
            (Some(s), Some(e)) if e > s => &trimmed[s..=e],
            _ => {
                return Err(GenerateError::ParseError {
                    message: "no JSON object found in response".into(),
                });
            }
        }
    };

    let value: Value = serde_json::from_str(json_str).map_err(|e| GenerateError::ParseError {
        message: format!("JSON parse error: {e}"),
    })?;
    if !value.is_object() {
        return Err(GenerateError::ParseError {
            message: "response is not a JSON object".into(),
        });
    }
    Ok(value)
}
