//! Shared test helpers.

use async_trait::async_trait;
use missionrag_core::error::{ProviderError, RetrievalError};
use missionrag_core::message::Message;
use missionrag_core::provider::{
    EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse,
};
use missionrag_core::retrieval::{ChunkMetadata, RetrievalQuery, RetrievedChunk, Retriever};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays scripted completions in order; errors once the script runs out.
pub struct ScriptedJudge {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    embeddings: Option<Vec<Vec<f32>>>,
    embedded: Mutex<Vec<String>>,
}

impl ScriptedJudge {
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
            prompts: Mutex::new(Vec::new()),
            embeddings: None,
            embedded: Mutex::new(Vec::new()),
        }
    }

    pub fn with_embeddings(mut self, embeddings: Vec<Vec<f32>>) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    /// Last message content of every completion request.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn embedded_inputs(&self) -> Vec<String> {
        self.embedded.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedJudge {
    fn name(&self) -> &str {
        "scripted_judge"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        if let Some(last) = request.messages.last() {
            self.prompts.lock().unwrap().push(last.content.clone());
        }
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(text) => Ok(ProviderResponse {
                message: Message::assistant(text),
                usage: None,
                model: request.model,
            }),
            None => Err(ProviderError::ApiError {
                status_code: 500,
                message: "script exhausted".into(),
            }),
        }
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        self.embedded.lock().unwrap().extend(request.inputs);
        match &self.embeddings {
            Some(embeddings) => Ok(EmbeddingResponse {
                embeddings: embeddings.clone(),
                model: request.model,
                usage: None,
            }),
            None => Err(ProviderError::NotConfigured("embeddings not scripted".into())),
        }
    }
}

/// Returns fixed chunks; panics on a chosen question.
pub struct StaticRetriever {
    chunks: Vec<RetrievedChunk>,
    panic_on: Option<String>,
}

impl StaticRetriever {
    pub fn new(chunks: Vec<RetrievedChunk>) -> Self {
        Self {
            chunks,
            panic_on: None,
        }
    }

    pub fn panicking_on(mut self, question: &str) -> Self {
        self.panic_on = Some(question.to_string());
        self
    }
}

#[async_trait]
impl Retriever for StaticRetriever {
    fn name(&self) -> &str {
        "static"
    }

    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<RetrievedChunk>, RetrievalError> {
        if self.panic_on.as_deref() == Some(query.text.as_str()) {
            panic!("index corrupted while reading {}", query.text);
        }
        Ok(self.chunks.iter().take(query.result_count).cloned().collect())
    }

    async fn count(&self) -> Result<usize, RetrievalError> {
        Ok(self.chunks.len())
    }
}

pub fn mission_chunk(mission: &str, text: &str) -> RetrievedChunk {
    RetrievedChunk::new(
        text,
        ChunkMetadata {
            mission: Some(mission.into()),
            source: Some(format!("{mission}_transcript.txt")),
            category: Some("mission_transcript".into()),
        },
    )
}
