//! Parley Retrieval Layer
//!
//! Implementations of the `Retriever` trait from `parley-domain`.
//!
//! # Retrievers
//!
//! - `TavilySearch`: general web search through the Tavily `/search` API
//! - `WikipediaSearch`: encyclopedia lookup through the MediaWiki API
//! - `StaticRetriever`: fixed documents for offline runs and tests
//! - `SearchClient`: one of the above, picked at runtime
//!
//! # Examples
//!
//! ```
//! use parley_domain::{traits::Retriever, Document};
//! use parley_retrieval::StaticRetriever;
//!
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let web = StaticRetriever::new(
//!     "web",
//!     vec![Document::web("https://example.com", "Bindings overview")],
//! );
//! let docs = rt.block_on(web.retrieve("snowboard bindings", 3)).unwrap();
//! assert_eq!(docs.len(), 1);
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod tavily;
pub mod wikipedia;

use async_trait::async_trait;
use parley_domain::traits::Retriever;
use parley_domain::Document;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use client::SearchClient;
pub use tavily::TavilySearch;
pub use wikipedia::WikipediaSearch;

/// Errors that can occur while retrieving documents
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Response body could not be understood
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Required API key is not configured
    #[error("Missing API key: set {0}")]
    MissingApiKey(String),

    /// Generic error
    #[error("Retrieval error: {0}")]
    Other(String),
}

/// Retriever backed by a fixed list of documents
///
/// Every query returns the first `max_docs` documents. Queries are recorded
/// so tests can check what was asked.
#[derive(Debug, Clone)]
pub struct StaticRetriever {
    name: String,
    documents: Vec<Document>,
    fail: bool,
    queries: Arc<Mutex<Vec<String>>>,
}

impl StaticRetriever {
    /// Create a retriever returning `documents`
    pub fn new(name: impl Into<String>, documents: Vec<Document>) -> Self {
        Self {
            name: name.into(),
            documents,
            fail: false,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a retriever that returns nothing
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Create a retriever whose every call fails
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            fail: true,
            ..Self::empty(name)
        }
    }

    /// Queries received so far
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    type Error = RetrievalError;

    fn name(&self) -> &str {
        &self.name
    }

    async fn retrieve(&self, query: &str, max_docs: usize) -> Result<Vec<Document>, Self::Error> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(RetrievalError::Other(format!("{} is unavailable", self.name)));
        }
        Ok(self.documents.iter().take(max_docs).cloned().collect())
    }
}
