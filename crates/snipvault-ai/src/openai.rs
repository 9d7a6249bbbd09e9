//! OpenAI-compatible completion backend.
//!
//! Talks to any service exposing the `/v1/chat/completions` shape. The
//! backend is optional at the application level: when no API key is
//! configured, the server runs with AI routes returning 503.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use snipvault_core::{CompletionBackend, Error, Result};

/// Default chat completion endpoint base.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default completion model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default request timeout (seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// OpenAI-compatible completion backend.
pub struct OpenAiBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout_secs: u64,
}

impl OpenAiBackend {
    /// Create a backend with explicit configuration.
    pub fn with_config(
        base_url: String,
        api_key: String,
        model: String,
        timeout_secs: u64,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::Config("API key must not be empty".into()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        debug!(
            subsystem = "ai",
            component = "openai",
            model = %model,
            timeout_secs,
            "Completion backend configured"
        );

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            timeout_secs,
        })
    }

    /// Create from environment variables.
    ///
    /// Returns `Ok(None)` when `OPENAI_API_KEY` is unset, which the caller
    /// treats as running without AI features.
    pub fn from_env() -> Result<Option<Self>> {
        let api_key = match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => return Ok(None),
        };

        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model =
            std::env::var("SNIPVAULT_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let timeout_secs = std::env::var("SNIPVAULT_AI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Some(Self::with_config(
            base_url,
            api_key,
            model,
            timeout_secs,
        )?))
    }

    async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let start = Instant::now();

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: 0.3,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Inference(format!(
                "Completion service returned {}: {}",
                status, body
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Inference("Completion response had no choices".into()))?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            subsystem = "ai",
            component = "openai",
            op = "complete",
            model = %self.model,
            response_len = content.len(),
            duration_ms = elapsed,
            "Completion finished"
        );
        if elapsed > 30000 {
            warn!(
                subsystem = "ai",
                duration_ms = elapsed,
                slow = true,
                "Slow completion request"
            );
        }
        Ok(content)
    }
}

/// Chat API message.
#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Request payload for `/v1/chat/completions`.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Response from `/v1/chat/completions`.
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.chat(vec![ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }])
        .await
    }

    async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.chat(vec![
            ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            },
        ])
        .await
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_rejected() {
        let result = OpenAiBackend::with_config(
            DEFAULT_BASE_URL.to_string(),
            String::new(),
            DEFAULT_MODEL.to_string(),
            DEFAULT_TIMEOUT_SECS,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_trailing_slash_stripped_from_base_url() {
        let backend = OpenAiBackend::with_config(
            "http://localhost:8080/".to_string(),
            "key".to_string(),
            "model".to_string(),
            5,
        )
        .unwrap();
        assert_eq!(backend.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_model_name_accessor() {
        let backend = OpenAiBackend::with_config(
            DEFAULT_BASE_URL.to_string(),
            "key".to_string(),
            "custom-model".to_string(),
            5,
        )
        .unwrap();
        assert_eq!(backend.model_name(), "custom-model");
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }],
            temperature: 0.3,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("gpt-4o-mini"));
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("temperature"));
    }

    #[test]
    fn test_chat_response_deserialization() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": "Hi"}, "finish_reason": "stop"}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "Hi");
    }
}
