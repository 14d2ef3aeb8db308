//! Tavily web search
//!
//! `POST {endpoint}/search` with a bearer API key. Each result becomes a web
//! document tagged with its URL.

use crate::RetrievalError;
use async_trait::async_trait;
use parley_domain::traits::Retriever;
use parley_domain::Document;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Default Tavily API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.tavily.com";

/// Default environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "TAVILY_API_KEY";

/// Default timeout for search requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    url: String,
    #[serde(default)]
    content: String,
}

/// Web search through the Tavily API
#[derive(Debug, Clone)]
pub struct TavilySearch {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl TavilySearch {
    /// Create a client for `endpoint` authenticated with `api_key`
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create a client reading its API key from the environment variable `var`
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` when the variable is unset or blank.
    pub fn from_env(endpoint: impl Into<String>, var: &str) -> Result<Self, RetrievalError> {
        match std::env::var(var) {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(endpoint, key)),
            _ => Err(RetrievalError::MissingApiKey(var.to_string())),
        }
    }
}

fn parse_response(body: &str) -> Result<Vec<Document>, RetrievalError> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| RetrievalError::InvalidResponse(format!("Tavily response: {}", e)))?;

    Ok(response
        .results
        .into_iter()
        .map(|r| Document::web(r.url, r.content))
        .collect())
}

#[async_trait]
impl Retriever for TavilySearch {
    type Error = RetrievalError;

    fn name(&self) -> &str {
        "tavily"
    }

    async fn retrieve(&self, query: &str, max_docs: usize) -> Result<Vec<Document>, Self::Error> {
        let url = format!("{}/search", self.endpoint);
        let body = SearchRequest {
            query,
            max_results: max_docs,
            search_depth: "basic",
            include_raw_content: false,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| RetrievalError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RetrievalError::Communication(format!("Failed to read body: {}", e)))?;

        if !status.is_success() {
            return Err(RetrievalError::Communication(format!("HTTP {}", status)));
        }

        let mut docs = parse_response(&text)?;
        docs.truncate(max_docs);
        debug!(query, found = docs.len(), "Tavily search complete");
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_domain::DocumentSource;

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "query": "union bindings",
            "results": [
                {"title": "Review", "url": "https://a.example", "content": "Stiff", "score": 0.9},
                {"title": "Guide", "url": "https://b.example", "content": "Soft", "score": 0.7}
            ]
        }"#;
        let docs = parse_response(body).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(
            docs[0].source,
            DocumentSource::Web {
                url: "https://a.example".to_string()
            }
        );
        assert_eq!(docs[1].content, "Soft");
    }

    #[test]
    fn test_parse_response_without_results() {
        assert!(parse_response(r#"{"query": "x"}"#).unwrap().is_empty());
        assert!(matches!(
            parse_response("not json"),
            Err(RetrievalError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_from_env_missing_key() {
        let err = TavilySearch::from_env(DEFAULT_ENDPOINT, "PARLEY_TEST_UNSET_TAVILY_KEY")
            .unwrap_err();
        assert!(matches!(err, RetrievalError::MissingApiKey(_)));
    }

    #[test]
    fn test_request_serialization() {
        let body = SearchRequest {
            query: "bindings",
            max_results: 3,
            search_depth: "basic",
            include_raw_content: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["max_results"], 3);
        assert_eq!(json["query"], "bindings");
    }

    #[tokio::test]
    #[ignore] // Requires TAVILY_API_KEY and network access
    async fn test_tavily_integration() {
        let search = TavilySearch::from_env(DEFAULT_ENDPOINT, DEFAULT_API_KEY_ENV).unwrap();
        let docs = search.retrieve("snowboard bindings", 3).await.unwrap();
        assert!(docs.len() <= 3);
    }
}
