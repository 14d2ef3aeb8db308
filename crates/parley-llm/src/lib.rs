//! Parley LLM Provider Layer
//!
//! Pluggable implementations of the `ModelClient` trait from `parley-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scripted responses for testing
//! - `OllamaProvider`: Local Ollama `/api/chat` integration
//! - `OpenAiProvider`: OpenAI-compatible `/v1/chat/completions` integration
//! - `LlmClient`: Runtime-selected wrapper over the above
//!
//! # Examples
//!
//! ```
//! use parley_llm::MockProvider;
//! use parley_domain::traits::ModelClient;
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = rt.block_on(provider.complete("system", &[])).unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use parley_domain::traits::ModelClient;
use parley_domain::ChatMessage;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use client::{LlmClient, ProviderKind};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider misconfigured (missing key, bad endpoint)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// Strip a markdown code fence from a model reply, if present
///
/// Models often wrap JSON in ```` ```json ```` blocks even when asked not to.
///
/// # Examples
///
/// ```
/// use parley_llm::extract_json;
///
/// assert_eq!(extract_json("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
/// assert_eq!(extract_json("  {\"a\": 1} "), "{\"a\": 1}");
/// ```
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    // Skip the opening fence line (``` or ```json)
    let body = match trimmed.find('\n') {
        Some(idx) => &trimmed[idx + 1..],
        None => return "",
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Sentinel response that makes the mock fail
const MOCK_ERROR: &str = "ERROR";

/// A model call captured by [`MockProvider`]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// System prompt of the call
    pub system: String,

    /// History passed with the call
    pub history: Vec<ChatMessage>,

    /// Whether the structured variant was used
    pub structured: bool,
}

#[derive(Debug)]
struct Script {
    key: String,
    responses: VecDeque<String>,
}

/// Mock LLM provider for deterministic testing
///
/// Responses are keyed by a substring of the system prompt. The first
/// registered key contained in the prompt wins; a key with several queued
/// responses hands them out in order and repeats the last one. Prompts that
/// match no key get the default response.
///
/// # Examples
///
/// ```
/// use parley_llm::MockProvider;
/// use parley_domain::traits::ModelClient;
///
/// let rt = tokio::runtime::Runtime::new().unwrap();
/// let mut provider = MockProvider::default();
/// provider.add_sequence("analyst", ["first", "second"]);
/// provider.add_response("customer", "answer");
///
/// assert_eq!(rt.block_on(provider.complete("You are an analyst", &[])).unwrap(), "first");
/// assert_eq!(rt.block_on(provider.complete("You are an analyst", &[])).unwrap(), "second");
/// assert_eq!(rt.block_on(provider.complete("You are an analyst", &[])).unwrap(), "second");
/// assert_eq!(rt.block_on(provider.complete("You are a customer", &[])).unwrap(), "answer");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    scripts: Arc<Mutex<Vec<Script>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            scripts: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a fixed response for system prompts containing `key`
    pub fn add_response(&mut self, key: impl Into<String>, response: impl Into<String>) {
        self.add_sequence(key, [response.into()]);
    }

    /// Add an ordered sequence of responses for system prompts containing `key`
    pub fn add_sequence<I, S>(&mut self, key: impl Into<String>, responses: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scripts.lock().unwrap().push(Script {
            key: key.into(),
            responses: responses.into_iter().map(Into::into).collect(),
        });
    }

    /// Configure to return an error for system prompts containing `key`
    pub fn add_error(&mut self, key: impl Into<String>) {
        self.add_response(key, MOCK_ERROR);
    }

    /// Get the number of model calls made
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Number of calls whose system prompt contained `key`
    pub fn calls_matching(&self, key: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.system.contains(key))
            .count()
    }

    /// Snapshot of every recorded call
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Reset the recorded calls
    pub fn reset_call_count(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn respond(&self, system: &str, history: &[ChatMessage], structured: bool) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system.to_string(),
            history: history.to_vec(),
            structured,
        });

        let mut scripts = self.scripts.lock().unwrap();
        let response = match scripts.iter_mut().find(|s| system.contains(&s.key)) {
            Some(script) if script.responses.len() > 1 => script.responses.pop_front(),
            Some(script) => script.responses.front().cloned(),
            None => None,
        }
        .unwrap_or_else(|| self.default_response.clone());

        if response == MOCK_ERROR {
            return Err(LlmError::Other("Mock error".to_string()));
        }
        Ok(response)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl ModelClient for MockProvider {
    type Error = LlmError;

    async fn complete(&self, system: &str, history: &[ChatMessage]) -> Result<String, Self::Error> {
        self.respond(system, history, false)
    }

    async fn complete_structured(
        &self,
        system: &str,
        history: &[ChatMessage],
        _schema: &str,
    ) -> Result<String, Self::Error> {
        self.respond(system, history, true)
    }
}
