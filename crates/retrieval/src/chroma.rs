//! Chroma HTTP retriever.
//!
//! Talks to a running Chroma server over its REST API. The collection id
//! is resolved once on connect; each query embeds the text locally through
//! the provider and sends the vector, so the server needs no embedding
//! function of its own.

use async_trait::async_trait;
use missionrag_core::error::RetrievalError;
use missionrag_core::retrieval::{ChunkMetadata, RetrievalQuery, RetrievedChunk, Retriever};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::embed::QueryEmbedder;

pub struct ChromaHttpRetriever {
    base_url: String,
    collection_id: String,
    collection_name: String,
    embedder: QueryEmbedder,
    client: reqwest::Client,
}

impl ChromaHttpRetriever {
    /// Connect to `base_url` and resolve the named collection.
    pub async fn connect(
        base_url: &str,
        collection: &str,
        embedder: QueryEmbedder,
    ) -> Result<Self, RetrievalError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| RetrievalError::StoreUnavailable {
                location: base_url.clone(),
                reason: e.to_string(),
            })?;

        let url = format!("{base_url}/api/v1/collections/{collection}");
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| RetrievalError::StoreUnavailable {
                location: base_url.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Chroma collection lookup failed");
            return Err(RetrievalError::CollectionNotFound(collection.to_string()));
        }

        let info: CollectionInfo = response
            .json()
            .await
            .map_err(|e| RetrievalError::Corrupted(format!("collection info: {e}")))?;

        info!(collection = %info.name, id = %info.id, "Connected to Chroma collection");

        Ok(Self {
            base_url,
            collection_id: info.id,
            collection_name: info.name,
            embedder,
            client,
        })
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    fn query_body(embedding: Vec<f32>, query: &RetrievalQuery) -> serde_json::Value {
        let mut body = serde_json::json!({
            "query_embeddings": [embedding],
            "n_results": query.result_count,
            "include": ["documents", "metadatas", "distances"],
        });
        if let Some(mission) = &query.mission {
            body["where"] = serde_json::json!({ "mission": mission });
        }
        body
    }
}

#[async_trait]
impl Retriever for ChromaHttpRetriever {
    fn name(&self) -> &str {
        "chroma"
    }

    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        let embedding = self.embedder.embed(&query.text).await?;
        let url = format!("{}/api/v1/collections/{}/query", self.base_url, self.collection_id);

        let response = self
            .client
            .post(&url)
            .json(&Self::query_body(embedding, query))
            .send()
            .await
            .map_err(|e| RetrievalError::QueryFailed(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::QueryFailed(format!("status {status}: {body}")));
        }

        let result: QueryResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::QueryFailed(format!("unparseable response: {e}")))?;

        let chunks = result.into_chunks();
        debug!(collection = %self.collection_name, hits = chunks.len(), "Chroma queried");
        Ok(chunks)
    }

    async fn count(&self) -> Result<usize, RetrievalError> {
        let url = format!("{}/api/v1/collections/{}/count", self.base_url, self.collection_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RetrievalError::QueryFailed(e.to_string()))?;

        response
            .json::<usize>()
            .await
            .map_err(|e| RetrievalError::QueryFailed(e.to_string()))
    }
}

// --- Chroma API types (internal) ---

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
    name: String,
}

/// Query results come back as one inner list per query embedding.
#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<ChunkMetadata>>>>,
}

impl QueryResponse {
    fn into_chunks(self) -> Vec<RetrievedChunk> {
        let documents = self
            .documents
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default();
        let mut metadatas = self
            .metadatas
            .and_then(|m| m.into_iter().next())
            .unwrap_or_default()
            .into_iter();

        documents
            .into_iter()
            .map(|doc| {
                let metadata = metadatas.next().flatten().unwrap_or_default();
                (doc, metadata)
            })
            .filter_map(|(doc, metadata)| doc.map(|text| RetrievedChunk::new(text, metadata)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_query_response() {
        let data = r#"{
            "ids": [["a13_1", "a13_2"]],
            "documents": [["Houston, we've had a problem.", "The number 2 oxygen tank failed."]],
            "metadatas": [[{"mission": "apollo_13", "source": "transcript.txt", "document_category": "mission_transcript"}, null]],
            "distances": [[0.12, 0.34]]
        }"#;
        let parsed: QueryResponse = serde_json::from_str(data).unwrap();
        let chunks = parsed.into_chunks();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata.mission.as_deref(), Some("apollo_13"));
        assert_eq!(chunks[0].metadata.category.as_deref(), Some("mission_transcript"));
        assert_eq!(chunks[1].metadata, ChunkMetadata::default());
    }

    #[test]
    fn empty_query_response_yields_no_chunks() {
        let parsed: QueryResponse = serde_json::from_str(r#"{"documents": [[]]}"#).unwrap();
        assert!(parsed.into_chunks().is_empty());

        let parsed: QueryResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.into_chunks().is_empty());
    }

    #[test]
    fn query_body_includes_mission_filter() {
        let query = RetrievalQuery::new("launch", 3, Some("challenger"));
        let body = ChromaHttpRetriever::query_body(vec![0.1, 0.2], &query);
        assert_eq!(body["n_results"], 3);
        assert_eq!(body["where"]["mission"], "challenger");

        let query = RetrievalQuery::new("launch", 3, Some("all"));
        let body = ChromaHttpRetriever::query_body(vec![0.1], &query);
        assert!(body.get("where").is_none());
    }
}
