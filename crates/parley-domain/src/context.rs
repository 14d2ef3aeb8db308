//! Retrieved context - source-tagged snippets that ground persona answers

use serde::{Deserialize, Serialize};

/// Separator placed between formatted documents
pub const DOCUMENT_SEPARATOR: &str = "\n\n---\n\n";

/// Where a retrieved document came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DocumentSource {
    /// A web search hit
    Web {
        /// Page URL
        url: String,
    },

    /// An encyclopedia article or document page
    Encyclopedia {
        /// Article URL or document path
        source: String,
        /// Optional page marker
        page: Option<String>,
    },
}

/// A single retrieved document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Source identifier
    pub source: DocumentSource,

    /// Document text
    pub content: String,
}

impl Document {
    /// Create a web document
    pub fn web(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: DocumentSource::Web { url: url.into() },
            content: content.into(),
        }
    }

    /// Create an encyclopedia document
    pub fn encyclopedia(
        source: impl Into<String>,
        page: Option<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            source: DocumentSource::Encyclopedia {
                source: source.into(),
                page,
            },
            content: content.into(),
        }
    }

    /// Plain citation string for a sources list
    ///
    /// # Examples
    ///
    /// ```
    /// use parley_domain::Document;
    ///
    /// let doc = Document::encyclopedia("docs/binding.pdf", Some("7".to_string()), "...");
    /// assert_eq!(doc.citation(), "docs/binding.pdf, page 7");
    /// ```
    pub fn citation(&self) -> String {
        match &self.source {
            DocumentSource::Web { url } => url.clone(),
            DocumentSource::Encyclopedia { source, page: Some(page) } if !page.is_empty() => {
                format!("{}, page {}", source, page)
            }
            DocumentSource::Encyclopedia { source, .. } => source.clone(),
        }
    }

    /// Render the document as a tagged snippet
    pub fn render(&self) -> String {
        match &self.source {
            DocumentSource::Web { url } => {
                format!("<Document href=\"{}\"/>\n{}\n</Document>", url, self.content)
            }
            DocumentSource::Encyclopedia { source, page } => format!(
                "<Document source=\"{}\" page=\"{}\"/>\n{}\n</Document>",
                source,
                page.as_deref().unwrap_or(""),
                self.content
            ),
        }
    }
}

/// Documents gathered by one retrieval step
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    /// Documents in retrieval order (web first, then encyclopedia)
    pub documents: Vec<Document>,
}

impl ContextEntry {
    /// Build an entry from web results followed by encyclopedia results
    pub fn from_sources(web: Vec<Document>, encyclopedia: Vec<Document>) -> Self {
        let mut documents = web;
        documents.extend(encyclopedia);
        Self { documents }
    }

    /// Whether the retrieval step found nothing
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Render every document, separated by [`DOCUMENT_SEPARATOR`]
    pub fn render(&self) -> String {
        self.documents
            .iter()
            .map(Document::render)
            .collect::<Vec<_>>()
            .join(DOCUMENT_SEPARATOR)
    }
}

/// Accumulated context for one interview
///
/// Grows by exactly one entry per retrieval step and never shrinks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedContext {
    entries: Vec<ContextEntry>,
}

impl RetrievedContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the result of a retrieval step
    pub fn push(&mut self, entry: ContextEntry) {
        self.entries.push(entry);
    }

    /// Number of retrieval steps recorded
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no retrieval step has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in order
    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    /// Every document across all entries, in order
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.entries.iter().flat_map(|e| e.documents.iter())
    }

    /// Render all non-empty entries for inclusion in a prompt
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .filter(|e| !e.is_empty())
            .map(ContextEntry::render)
            .collect::<Vec<_>>()
            .join(DOCUMENT_SEPARATOR)
    }
}
