//! Runtime-selected retriever

use crate::{RetrievalError, StaticRetriever, TavilySearch, WikipediaSearch};
use async_trait::async_trait;
use parley_domain::traits::Retriever;
use parley_domain::Document;

/// A retriever chosen at runtime
///
/// Lets callers that configure web and encyclopedia lookups from a file
/// use one concrete `Retriever` type for both.
#[derive(Debug, Clone)]
pub enum SearchClient {
    /// Tavily web search
    Tavily(TavilySearch),
    /// Wikipedia lookup
    Wikipedia(WikipediaSearch),
    /// Fixed documents
    Static(StaticRetriever),
}

#[async_trait]
impl Retriever for SearchClient {
    type Error = RetrievalError;

    fn name(&self) -> &str {
        match self {
            SearchClient::Tavily(r) => r.name(),
            SearchClient::Wikipedia(r) => r.name(),
            SearchClient::Static(r) => r.name(),
        }
    }

    async fn retrieve(&self, query: &str, max_docs: usize) -> Result<Vec<Document>, Self::Error> {
        match self {
            SearchClient::Tavily(r) => r.retrieve(query, max_docs).await,
            SearchClient::Wikipedia(r) => r.retrieve(query, max_docs).await,
            SearchClient::Static(r) => r.retrieve(query, max_docs).await,
        }
    }
}
