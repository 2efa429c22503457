//! Retriever trait: vector lookup over the mission document corpus.
//!
//! The pipeline never owns the vector store. A retriever takes a query
//! text, an optional mission filter and a result count, and hands back
//! the matching chunks in ranked order. Chunks are not deduplicated here;
//! that is the context assembler's job.

use crate::error::RetrievalError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Descriptive metadata attached to every chunk in the collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Mission key, e.g. `apollo_13`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission: Option<String>,

    /// Source identifier (file name, transcript id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Document category, e.g. `technical_transcript`
    #[serde(
        default,
        rename = "document_category",
        alias = "category",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
}

/// One retrieved unit of source text plus its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    #[serde(default)]
    pub metadata: ChunkMetadata,
}

impl RetrievedChunk {
    pub fn new(text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}

/// A query against the vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalQuery {
    /// The search text
    pub text: String,

    /// Maximum number of results
    #[serde(default = "default_result_count")]
    pub result_count: usize,

    /// Equality filter on the `mission` metadata field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mission: Option<String>,
}

fn default_result_count() -> usize {
    3
}

impl RetrievalQuery {
    /// Build a query, normalizing the mission filter.
    ///
    /// `all`, `none` and the empty string mean "no filter"; anything else is
    /// lower-cased to match the stored mission keys.
    pub fn new(text: impl Into<String>, result_count: usize, mission: Option<&str>) -> Self {
        let mission = mission
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !matches!(m.as_str(), "" | "all" | "none"));
        Self {
            text: text.into(),
            result_count,
            mission,
        }
    }
}

/// The core Retriever trait.
///
/// Implementations: local on-disk collection, Chroma HTTP server, and
/// scripted retrievers in tests.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// The backend name (e.g., "local", "chroma").
    fn name(&self) -> &str;

    /// Return the best matching chunks for the query, best first.
    async fn retrieve(
        &self,
        query: &RetrievalQuery,
    ) -> std::result::Result<Vec<RetrievedChunk>, RetrievalError>;

    /// Number of chunks in the collection, when the backend can tell.
    async fn count(&self) -> std::result::Result<usize, RetrievalError>;
}
