//! Vector retrieval backends for MissionRAG.
//!
//! - `local`: collection files in a store directory, ranked in memory
//! - `chroma`: a Chroma server over HTTP
//! - `discovery`: listing the stores and collections available on disk

pub mod chroma;
pub mod discovery;
pub mod embed;
pub mod local;
pub mod vector;

#[cfg(test)]
pub(crate) mod test_support;

pub use chroma::ChromaHttpRetriever;
pub use discovery::{BackendInfo, DocCount, discover_backends};
pub use embed::QueryEmbedder;
pub use local::{CollectionFile, LocalCollection, StoredChunk};
pub use vector::{cosine_similarity, vector_search};

use std::path::Path;
use std::sync::Arc;

use missionrag_core::Retriever;
use missionrag_core::error::RetrievalError;
use tracing::info;

/// Where the collection lives.
#[derive(Debug, Clone)]
pub enum StoreLocation<'a> {
    Directory(&'a Path),
    Server(&'a str),
}

/// Open the named collection.
///
/// Errors are returned as values; the caller decides whether a missing
/// store ends the run or just gets reported.
pub async fn open_retriever(
    location: StoreLocation<'_>,
    collection: &str,
    embedder: QueryEmbedder,
) -> Result<Arc<dyn Retriever>, RetrievalError> {
    let retriever: Arc<dyn Retriever> = match location {
        StoreLocation::Directory(dir) => {
            info!(dir = %dir.display(), collection, "Opening local collection");
            Arc::new(LocalCollection::open(dir, collection, embedder)?)
        }
        StoreLocation::Server(url) => {
            info!(url, collection, "Connecting to Chroma server");
            Arc::new(ChromaHttpRetriever::connect(url, collection, embedder).await?)
        }
    };
    Ok(retriever)
}
