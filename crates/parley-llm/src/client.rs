//! Runtime-selected model client
//!
//! The CLI picks a provider from configuration; `LlmClient` lets the rest of
//! the workspace stay generic over a single concrete `ModelClient`.

use crate::{LlmError, MockProvider, OllamaProvider, OpenAiProvider};
use async_trait::async_trait;
use parley_domain::traits::ModelClient;
use parley_domain::ChatMessage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which provider backs an [`LlmClient`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Local Ollama server
    #[default]
    Ollama,
    /// OpenAI-compatible chat completions API
    OpenAi,
    /// Scripted mock (offline runs and tests)
    Mock,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::Ollama => "ollama",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Mock => "mock",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(ProviderKind::Ollama),
            "openai" => Ok(ProviderKind::OpenAi),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(LlmError::Config(format!("unknown provider '{}'", other))),
        }
    }
}

/// A model client chosen at runtime
#[derive(Debug, Clone)]
pub enum LlmClient {
    /// Ollama backend
    Ollama(OllamaProvider),
    /// OpenAI-compatible backend
    OpenAi(OpenAiProvider),
    /// Mock backend
    Mock(MockProvider),
}

impl LlmClient {
    /// Provider kind of this client
    pub fn kind(&self) -> ProviderKind {
        match self {
            LlmClient::Ollama(_) => ProviderKind::Ollama,
            LlmClient::OpenAi(_) => ProviderKind::OpenAi,
            LlmClient::Mock(_) => ProviderKind::Mock,
        }
    }
}

#[async_trait]
impl ModelClient for LlmClient {
    type Error = LlmError;

    async fn complete(&self, system: &str, history: &[ChatMessage]) -> Result<String, Self::Error> {
        match self {
            LlmClient::Ollama(p) => p.complete(system, history).await,
            LlmClient::OpenAi(p) => p.complete(system, history).await,
            LlmClient::Mock(p) => p.complete(system, history).await,
        }
    }

    async fn complete_structured(
        &self,
        system: &str,
        history: &[ChatMessage],
        schema: &str,
    ) -> Result<String, Self::Error> {
        match self {
            LlmClient::Ollama(p) => p.complete_structured(system, history, schema).await,
            LlmClient::OpenAi(p) => p.complete_structured(system, history, schema).await,
            LlmClient::Mock(p) => p.complete_structured(system, history, schema).await,
        }
    }
}
