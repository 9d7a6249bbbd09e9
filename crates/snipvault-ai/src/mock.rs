//! Mock completion backend for deterministic testing.
//!
//! Records every prompt and returns canned replies, so orchestrator
//! behavior (prompt construction, parsing, fallbacks) can be asserted
//! without a live completion service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use snipvault_core::{CompletionBackend, Error, Result};

/// Mock completion backend.
#[derive(Clone)]
pub struct MockCompletionBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    default_response: String,
    mapped_responses: HashMap<String, String>,
    fail: bool,
}

/// A recorded prompt.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub system: String,
    pub prompt: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            default_response: "Mock response".to_string(),
            mapped_responses: HashMap::new(),
            fail: false,
        }
    }
}

impl MockCompletionBackend {
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the reply for every prompt without a mapping.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Map prompts containing `needle` to a specific reply.
    pub fn with_response_for(
        mut self,
        needle: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .mapped_responses
            .insert(needle.into(), response.into());
        self
    }

    /// Make every call fail, for exercising error paths.
    pub fn with_failure(mut self) -> Self {
        Arc::make_mut(&mut self.config).fail = true;
        self
    }

    /// All prompts seen so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_log.lock().unwrap().len()
    }

    fn respond(&self, system: &str, prompt: &str) -> Result<String> {
        self.call_log.lock().unwrap().push(MockCall {
            system: system.to_string(),
            prompt: prompt.to_string(),
        });

        if self.config.fail {
            return Err(Error::Inference("Simulated failure".into()));
        }

        for (needle, response) in &self.config.mapped_responses {
            if prompt.contains(needle.as_str()) {
                return Ok(response.clone());
            }
        }
        Ok(self.config.default_response.clone())
    }
}

impl Default for MockCompletionBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionBackend for MockCompletionBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.respond("", prompt)
    }

    async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.respond(system, prompt)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_response() {
        let backend = MockCompletionBackend::new().with_fixed_response("canned");
        assert_eq!(backend.complete("anything").await.unwrap(), "canned");
    }

    #[tokio::test]
    async fn test_response_mapping_by_substring() {
        let backend = MockCompletionBackend::new()
            .with_response_for("explain", "an explanation")
            .with_fixed_response("default");

        assert_eq!(
            backend.complete("please explain this").await.unwrap(),
            "an explanation"
        );
        assert_eq!(backend.complete("other").await.unwrap(), "default");
    }

    #[tokio::test]
    async fn test_call_logging() {
        let backend = MockCompletionBackend::new();
        backend.complete("one").await.unwrap();
        backend.complete_with_system("sys", "two").await.unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].system, "sys");
        assert_eq!(calls[1].prompt, "two");
    }

    #[tokio::test]
    async fn test_forced_failure() {
        let backend = MockCompletionBackend::new().with_failure();
        assert!(backend.complete("test").await.is_err());
    }
}
