//! Shared test helpers.

use async_trait::async_trait;
use missionrag_core::error::ProviderError;
use missionrag_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse,
};

/// Embeds every input as the same fixed vector.
pub struct FixedEmbeddingProvider {
    vector: Vec<f32>,
}

impl FixedEmbeddingProvider {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}

#[async_trait]
impl Provider for FixedEmbeddingProvider {
    fn name(&self) -> &str {
        "fixed_embedding"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::NotConfigured("completion not scripted".into()))
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        Ok(EmbeddingResponse {
            embeddings: request.inputs.iter().map(|_| self.vector.clone()).collect(),
            model: request.model,
            usage: None,
        })
    }
}
