//! Ollama client for generating study content with a local model.
//!
//! Uses `/api/generate` with `format` set to the response schema, which
//! constrains the model to emit JSON matching it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::generate::{GenerateError, GenerateResult, JsonModel};

const PROVIDER: &str = "ollama";

/// Configuration for the Ollama client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Base URL for the Ollama API.
    pub base_url: String,
    /// Model name to use.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            model: "llama3.2".into(),
            timeout_secs: 300,
        }
    }
}

/// Client for the Ollama REST API.
pub struct OllamaClient {
    config: OllamaConfig,
    agent: ureq::Agent,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self { config, agent }
    }

    /// Get the model name being used.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn request_body(&self, prompt: &str, schema: &Value) -> Value {
        serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "format": schema,
            "stream": false,
        })
    }
}

impl JsonModel for OllamaClient {
    fn complete_json(&self, prompt: &str, schema: &Value) -> GenerateResult<String> {
        let url = format!("{}/api/generate", self.config.base_url.trim_end_matches('/'));
        let body_str = serde_json::to_string(&self.request_body(prompt, schema)).map_err(|e| {
            GenerateError::RequestFailed {
                provider: PROVIDER.into(),
                message: format!("JSON serialize error: {e}"),
            }
        })?;

        tracing::debug!(model = %self.config.model, prompt_chars = prompt.len(), "calling ollama");
        let resp = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_string(&body_str)
            .map_err(|e| {
                if matches!(e, ureq::Error::Transport(_)) {
                    tracing::warn!(url = %self.config.base_url, "ollama did not answer; is `ollama serve` running?");
                }
                map_ureq_error(e)
            })?;

        let resp_str = resp.into_string().map_err(|e| GenerateError::ParseError {
            message: e.to_string(),
        })?;
        let json: Value = serde_json::from_str(&resp_str).map_err(|e| GenerateError::ParseError {
            message: e.to_string(),
        })?;

        json["response"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| GenerateError::ParseError {
                message: "missing 'response' field".into(),
            })
    }

    fn name(&self) -> &str {
        PROVIDER
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

impl std::fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable() -> OllamaClient {
        OllamaClient::new(OllamaConfig {
            base_url: "http://127.0.0.1:1".into(), // unreachable port
            timeout_secs: 2,
            ..Default::default()
        })
    }

    #[test]
    fn generate_when_unreachable_returns_request_error() {
        let err = unreachable()
            .complete_json("test", &serde_json::json!({}))
            .unwrap_err();
        assert!(matches!(err, GenerateError::RequestFailed { .. }));
    }

    #[test]
    fn new_does_not_connect() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let _client = OllamaClient::new(OllamaConfig {
            base_url: format!("http://{}", listener.local_addr().unwrap()),
            ..Default::default()
        });
        let accepted = listener.accept();
        assert!(matches!(accepted, Err(e) if e.kind() == std::io::ErrorKind::WouldBlock));
    }

    #[test]
    fn request_body_carries_schema_as_format() {
        let client = OllamaClient::new(OllamaConfig::default());
        let body = client.request_body("hi", &serde_json::json!({"type": "object"}));
        assert_eq!(body["format"]["type"], "object");
        assert_eq!(body["stream"], false);
        assert_eq!(body["model"], "llama3.2");
    }

    #[test]
    fn default_config_values() {
        let config = OllamaConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.timeout_secs, 300);
    }
}
