//! Local vector collection: a directory of JSON collection files.
//!
//! Each collection is one file, `<dir>/<collection>.json`, holding the
//! chunks with their metadata and pre-computed embeddings. The file is
//! read once when the collection is opened; queries are ranked in memory
//! by cosine similarity.
//!
//! ```json
//! {
//!   "name": "nasa_space_missions_text",
//!   "embedding_model": "text-embedding-3-small",
//!   "chunks": [
//!     { "id": "a13_0001", "text": "...", "metadata": { "mission": "apollo_13" }, "embedding": [0.1, ...] }
//!   ]
//! }
//! ```

use async_trait::async_trait;
use missionrag_core::error::RetrievalError;
use missionrag_core::retrieval::{ChunkMetadata, RetrievalQuery, RetrievedChunk, Retriever};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::embed::QueryEmbedder;
use crate::vector::vector_search;

/// One chunk as persisted in a collection file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    pub id: String,
    #[serde(alias = "document")]
    pub text: String,
    #[serde(default)]
    pub metadata: ChunkMetadata,
    #[serde(default)]
    pub embedding: Vec<f32>,
}

/// On-disk layout of a collection file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    #[serde(default)]
    pub chunks: Vec<StoredChunk>,
}

impl CollectionFile {
    /// Read and parse a collection file.
    pub fn read(path: &Path) -> Result<Self, RetrievalError> {
        let content = std::fs::read_to_string(path).map_err(|e| RetrievalError::StoreUnavailable {
            location: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content)
            .map_err(|e| RetrievalError::Corrupted(format!("{}: {e}", path.display())))
    }
}

/// Path of a named collection inside a store directory.
pub fn collection_path(dir: &Path, collection: &str) -> PathBuf {
    dir.join(format!("{collection}.json"))
}

/// A collection loaded from disk and queried in memory.
pub struct LocalCollection {
    name: String,
    chunks: Vec<StoredChunk>,
    /// Length of the stored embeddings, from the first chunk that has one.
    dimensions: Option<usize>,
    embedder: QueryEmbedder,
}

impl LocalCollection {
    /// Open `<dir>/<collection>.json`.
    pub fn open(
        dir: &Path,
        collection: &str,
        embedder: QueryEmbedder,
    ) -> Result<Self, RetrievalError> {
        if !dir.is_dir() {
            return Err(RetrievalError::StoreUnavailable {
                location: dir.display().to_string(),
                reason: "directory does not exist".into(),
            });
        }

        let path = collection_path(dir, collection);
        if !path.exists() {
            return Err(RetrievalError::CollectionNotFound(collection.to_string()));
        }

        let file = CollectionFile::read(&path)?;
        if let Some(model) = &file.embedding_model {
            if model != embedder.model() {
                warn!(
                    collection = %file.name,
                    stored = %model,
                    query = %embedder.model(),
                    "Query embedding model differs from collection model"
                );
            }
        }

        info!(collection = %file.name, chunks = file.chunks.len(), "Local collection loaded");
        Ok(Self::from_chunks(file.name, file.chunks, embedder))
    }

    /// Build a collection from chunks already in memory.
    pub fn from_chunks(
        name: impl Into<String>,
        chunks: Vec<StoredChunk>,
        embedder: QueryEmbedder,
    ) -> Self {
        let dimensions = chunks
            .iter()
            .map(|c| c.embedding.len())
            .find(|&len| len > 0);
        Self {
            name: name.into(),
            chunks,
            dimensions,
            embedder,
        }
    }

    pub fn collection_name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl Retriever for LocalCollection {
    fn name(&self) -> &str {
        "local"
    }

    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        let query_embedding = self.embedder.embed(&query.text).await?;
        if let Some(stored) = self.dimensions {
            if query_embedding.len() != stored {
                return Err(RetrievalError::QueryFailed(format!(
                    "query embedding has {} dimensions, collection '{}' stores {stored}",
                    query_embedding.len(),
                    self.name
                )));
            }
        }

        let mission = query.mission.as_deref();
        let ranked = vector_search(&self.chunks, &query_embedding, query.result_count, |chunk| {
            mission.is_none_or(|m| chunk.metadata.mission.as_deref() == Some(m))
        });

        debug!(
            collection = %self.name,
            mission = ?mission,
            hits = ranked.len(),
            "Local collection queried"
        );

        Ok(ranked
            .into_iter()
            .map(|(_, chunk)| RetrievedChunk::new(chunk.text.clone(), chunk.metadata.clone()))
            .collect())
    }

    async fn count(&self) -> Result<usize, RetrievalError> {
        Ok(self.chunks.len())
    }
}
