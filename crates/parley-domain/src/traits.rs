//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Implementations live in `parley-llm` and `parley-retrieval`.

use crate::{ChatMessage, Document};
use async_trait::async_trait;

/// Trait for language-model calls
///
/// Implemented by the infrastructure layer (parley-llm). Implementations must
/// be shareable across interview tasks.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Error type for model calls
    type Error: std::fmt::Display + Send + Sync + 'static;

    /// Generate a free-text reply to `history` under the `system` instructions
    async fn complete(
        &self,
        system: &str,
        history: &[ChatMessage],
    ) -> Result<String, Self::Error>;

    /// Generate a JSON reply conforming to `schema`
    ///
    /// Returns the raw JSON text; callers validate it into their own types.
    async fn complete_structured(
        &self,
        system: &str,
        history: &[ChatMessage],
        schema: &str,
    ) -> Result<String, Self::Error>;
}

/// Trait for document lookup services
///
/// Implemented by the infrastructure layer (parley-retrieval) for web search
/// and encyclopedia lookup alike.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Error type for retrieval calls
    type Error: std::fmt::Display + Send + Sync + 'static;

    /// Short name used in logs
    fn name(&self) -> &str;

    /// Fetch up to `max_docs` documents for `query`
    async fn retrieve(&self, query: &str, max_docs: usize) -> Result<Vec<Document>, Self::Error>;
}
