//! Gemini client (Google Generative Language REST API).
//!
//! Sends `generateContent` with `responseMimeType: application/json` and a
//! `responseSchema`. Gemini's schema dialect spells types in upper case
//! (`OBJECT`, `ARRAY`, `STRING`), so the JSON Schema is converted first.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::generate::{GenerateError, GenerateResult, JsonModel};

const PROVIDER: &str = "gemini";
/// The key travels in this header, never in the URL.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Configuration for the Gemini client.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Base URL for the API.
    pub base_url: String,
    /// Model name to use.
    pub model: String,
    /// API key; the environment overrides this, see `Config::load`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            model: "gemini-2.5-flash".into(),
            api_key: None,
            timeout_secs: 120,
        }
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    config: GeminiConfig,
    api_key: String,
    agent: ureq::Agent,
}

impl GeminiClient {
    /// Create a client. Fails if no API key is configured.
    pub fn new(config: GeminiConfig) -> GenerateResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GenerateError::MissingApiKey {
                provider: PROVIDER.into(),
            })?;
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Ok(Self {
            config,
            api_key,
            agent,
        })
    }

    /// Get the model name being used.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn request_body(prompt: &str, schema: &Value) -> Value {
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": to_gemini_schema(schema),
            }
        })
    }
}

impl JsonModel for GeminiClient {
    fn complete_json(&self, prompt: &str, schema: &Value) -> GenerateResult<String> {
        let body_str = serde_json::to_string(&Self::request_body(prompt, schema)).map_err(|e| {
            GenerateError::RequestFailed {
                provider: PROVIDER.into(),
                message: format!("JSON serialize error: {e}"),
            }
        })?;

        tracing::debug!(model = %self.config.model, prompt_chars = prompt.len(), "calling gemini");
        let resp = self
            .agent
            .post(&self.endpoint())
            .set(API_KEY_HEADER, &self.api_key)
            .set("Content-Type", "application/json")
            .send_string(&body_str)
            .map_err(map_ureq_error)?;

        let resp_str = resp.into_string().map_err(|e| GenerateError::ParseError {
            message: e.to_string(),
        })?;
        let json: Value = serde_json::from_str(&resp_str).map_err(|e| GenerateError::ParseError {
            message: e.to_string(),
        })?;

        response_text(&json)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

/// Concatenate the text parts of the first candidate.
fn response_text(json: &Value) -> GenerateResult<String> {
    if let Some(reason) = json["promptFeedback"]["blockReason"].as_str() {
        return Err(GenerateError::ParseError {
            message: format!("prompt blocked: {reason}"),
        });
    }

    let parts = json["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| GenerateError::ParseError {
            message: "response has no candidates".into(),
        })?;

    let text: String = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.trim().is_empty() {
        return Err(GenerateError::ParseError {
            message: "candidate has no text".into(),
        });
    }
    Ok(text)
}

/// Rewrite JSON Schema `type` values into Gemini's upper-case enum.
fn to_gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let v = match (k.as_str(), v) {
                        ("type", Value::String(t)) => Value::String(t.to_uppercase()),
                        // Property names must not be rewritten.
                        ("properties", Value::Object(props)) => Value::Object(
                            props
                                .iter()
                                .map(|(name, sub)| (name.clone(), to_gemini_schema(sub)))
                                .collect(),
                        ),
                        _ => to_gemini_schema(v),
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(to_gemini_schema).collect()),
        other => other.clone(),
    }
}

fn map_ureq_error(e: ureq::Error) -> GenerateError {
    match e {
        ureq::Error::Status(status, resp) => GenerateError::HttpStatus {
            provider: PROVIDER.into(),
            status,
            message: resp.into_string().unwrap_or_default(),
        },
        other => GenerateError::RequestFailed {
            provider: PROVIDER.into(),
            message: other.to_string(),
        },
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}
