//! Wikipedia lookup through the MediaWiki action API
//!
//! A lookup is a ranked search (`generator=search` with `prop=info` for the
//! canonical URLs) followed by one plain-text extract request per hit.
//! TextExtracts only returns a full article body for a single page per
//! request, so the bodies cannot be batched.

use crate::RetrievalError;
use async_trait::async_trait;
use parley_domain::traits::Retriever;
use parley_domain::Document;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Default MediaWiki API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://en.wikipedia.org/w/api.php";

/// Default timeout for lookups (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest extract kept per article (characters)
pub const MAX_EXTRACT_CHARS: usize = 4_000;

const USER_AGENT: &str = concat!("parley/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<QueryPages>,
}

#[derive(Debug, Deserialize)]
struct QueryPages {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    index: usize,
    #[serde(default)]
    extract: String,
    fullurl: Option<String>,
}

/// A ranked search hit, before its body is fetched
#[derive(Debug, Clone, PartialEq, Eq)]
struct Hit {
    title: String,
    url: String,
}

/// Encyclopedia lookup against Wikipedia
#[derive(Debug, Clone)]
pub struct WikipediaSearch {
    endpoint: String,
    client: reqwest::Client,
}

impl WikipediaSearch {
    /// Create a client for a MediaWiki API endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    async fn get(&self, params: &[(&str, &str)]) -> Result<String, RetrievalError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(params)
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
        Ok(text)
    }

    async fn fetch_extract(&self, title: &str) -> Result<Option<String>, RetrievalError> {
        let body = self
            .get(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("prop", "extracts"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;
        parse_extract(&body)
    }
}

impl Default for WikipediaSearch {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

fn parse_pages(body: &str) -> Result<Vec<Page>, RetrievalError> {
    let response: QueryResponse = serde_json::from_str(body)
        .map_err(|e| RetrievalError::InvalidResponse(format!("MediaWiki response: {}", e)))?;

    // No `query` key means the search had no hits
    let mut pages = response.query.map(|q| q.pages).unwrap_or_default();
    pages.sort_by_key(|p| p.index);
    Ok(pages)
}

fn parse_search(body: &str) -> Result<Vec<Hit>, RetrievalError> {
    Ok(parse_pages(body)?
        .into_iter()
        .map(|p| {
            let url = p.fullurl.unwrap_or_else(|| {
                format!("https://en.wikipedia.org/wiki/{}", p.title.replace(' ', "_"))
            });
            Hit { title: p.title, url }
        })
        .collect())
}

/// Plain-text body of the single page in an extract response, capped
fn parse_extract(body: &str) -> Result<Option<String>, RetrievalError> {
    let extract = parse_pages(body)?
        .into_iter()
        .next()
        .map(|p| p.extract)
        .filter(|e| !e.trim().is_empty());
    Ok(extract.map(|e| e.chars().take(MAX_EXTRACT_CHARS).collect()))
}

#[async_trait]
impl Retriever for WikipediaSearch {
    type Error = RetrievalError;

    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn retrieve(&self, query: &str, max_docs: usize) -> Result<Vec<Document>, Self::Error> {
        let limit = max_docs.to_string();
        let body = self
            .get(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("generator", "search"),
                ("gsrsearch", query),
                ("gsrlimit", limit.as_str()),
                ("prop", "info"),
                ("inprop", "url"),
            ])
            .await?;

        let mut hits = parse_search(&body)?;
        hits.truncate(max_docs);

        let mut docs = Vec::with_capacity(hits.len());
        for hit in hits {
            match self.fetch_extract(&hit.title).await? {
                Some(content) => docs.push(Document::encyclopedia(hit.url, None, content)),
                None => debug!(title = %hit.title, "Skipping article without text"),
            }
        }

        debug!(query, found = docs.len(), "Wikipedia lookup complete");
        Ok(docs)
    }
}
