//! OpenAI-compatible provider using the `/v1/chat/completions` API
//!
//! Works against OpenAI itself and any server speaking the same wire format
//! (vLLM, LM Studio, llama.cpp server).

use crate::LlmError;
use async_trait::async_trait;
use parley_domain::traits::ModelClient;
use parley_domain::ChatMessage;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default OpenAI API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default timeout for requests (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Longest error body kept in an error message
const MAX_ERROR_BODY_CHARS: usize = 256;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// OpenAI chat completions provider
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    base_url: String,
    model: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Create a provider for `model` at `base_url`
    ///
    /// `api_key` may be `None` for local servers that do not check it.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self::with_timeout(
            base_url,
            model,
            api_key,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a provider with a custom request timeout
    pub fn with_timeout(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            client,
        }
    }

    /// Model name used for requests
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request<'a>(
        &'a self,
        system: &'a str,
        history: &'a [ChatMessage],
        json: bool,
    ) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(WireMessage {
            role: "system",
            content: system,
        });
        messages.extend(history.iter().map(|m| WireMessage {
            role: m.role.as_str(),
            content: &m.content,
        }));

        ChatRequest {
            model: &self.model,
            messages,
            temperature: 0.0,
            response_format: json.then_some(ResponseFormat {
                kind: "json_object",
            }),
        }
    }

    async fn chat(
        &self,
        system: &str,
        history: &[ChatMessage],
        json: bool,
    ) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request(system, history, json);

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Communication(format!("Failed to read body: {}", e)))?;

        match status.as_u16() {
            200..=299 => parse_response(&text),
            404 => Err(LlmError::ModelNotAvailable(self.model.clone())),
            429 => Err(LlmError::RateLimitExceeded),
            _ => Err(LlmError::Communication(format!(
                "HTTP {}: {}",
                status,
                truncate(&text)
            ))),
        }
    }
}

fn parse_response(body: &str) -> Result<String, LlmError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("missing choices[0].message.content".to_string()))
}

fn truncate(body: &str) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > MAX_ERROR_BODY_CHARS {
        let short: String = collapsed.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{}...", short)
    } else {
        collapsed
    }
}

#[async_trait]
impl ModelClient for OpenAiProvider {
    type Error = LlmError;

    async fn complete(&self, system: &str, history: &[ChatMessage]) -> Result<String, Self::Error> {
        debug!(model = %self.model, messages = history.len(), "OpenAI completion");
        self.chat(system, history, false).await
    }

    async fn complete_structured(
        &self,
        system: &str,
        history: &[ChatMessage],
        schema: &str,
    ) -> Result<String, Self::Error> {
        debug!(model = %self.model, messages = history.len(), "OpenAI structured completion");
        let system = format!(
            "{}\n\nRespond with a JSON object matching this schema:\n{}",
            system, schema
        );
        self.chat(&system, history, true).await
    }
}
