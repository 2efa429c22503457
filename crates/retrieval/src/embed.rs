//! Query embedding through the configured provider.

use std::sync::Arc;

use missionrag_core::error::RetrievalError;
use missionrag_core::provider::{EmbeddingRequest, Provider};

/// Turns query text into a vector using the provider's embeddings endpoint.
///
/// The model must be the one the collection was built with.
#[derive(Clone)]
pub struct QueryEmbedder {
    provider: Arc<dyn Provider>,
    model: String,
}

impl QueryEmbedder {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs: vec![text.to_string()],
            })
            .await
            .map_err(|e| RetrievalError::EmbeddingFailed(e.to_string()))?;

        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::EmbeddingFailed("empty embedding response".into()))
    }
}
