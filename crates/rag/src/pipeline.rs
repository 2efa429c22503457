//! The retrieve → assemble → generate flow for one question.
//!
//! # Flow
//!
//! 1. Query the retriever (optionally filtered by mission)
//! 2. Assemble the hits into a context block
//! 3. Generate an answer grounded in that block
//!
//! A retrieval failure is logged and treated as "no documents": the
//! question is still answered, from general knowledge.

use std::sync::Arc;

use missionrag_config::AppConfig;
use missionrag_core::message::Message;
use missionrag_core::retrieval::{RetrievalQuery, RetrievedChunk, Retriever};
use tracing::{info, warn};

use crate::context::ContextAssembler;
use crate::generator::{AnswerGenerator, GeneratedAnswer};

pub struct RagPipeline {
    retriever: Arc<dyn Retriever>,
    assembler: ContextAssembler,
    generator: AnswerGenerator,
    model: String,
    n_results: usize,
}

/// Everything produced while answering one question.
#[derive(Debug, Clone)]
pub struct RagAnswer {
    pub answer: GeneratedAnswer,
    /// Raw retriever hits, before deduplication.
    pub chunks: Vec<RetrievedChunk>,
    /// The assembled context block sent to the model.
    pub context: String,
}

impl RagAnswer {
    /// Chunk texts, in retrieval order. These are what the scorer sees.
    pub fn contexts(&self) -> Vec<String> {
        self.chunks.iter().map(|c| c.text.clone()).collect()
    }
}

impl RagPipeline {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        generator: AnswerGenerator,
        model: impl Into<String>,
        n_results: usize,
    ) -> Self {
        Self {
            retriever,
            assembler: ContextAssembler::default(),
            generator,
            model: model.into(),
            n_results,
        }
    }

    pub fn from_config(
        retriever: Arc<dyn Retriever>,
        generator: AnswerGenerator,
        config: &AppConfig,
    ) -> Self {
        Self {
            retriever,
            assembler: ContextAssembler::from_config(&config.context),
            generator,
            model: config.default_model.clone(),
            n_results: config.retrieval.n_results,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answer one question.
    pub async fn answer(
        &self,
        question: &str,
        mission: Option<&str>,
        history: &[Message],
    ) -> RagAnswer {
        let query = RetrievalQuery::new(question, self.n_results, mission);

        let chunks = match self.retriever.retrieve(&query).await {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(retriever = self.retriever.name(), error = %e, "Error retrieving documents");
                Vec::new()
            }
        };

        let context = self.assembler.assemble(&chunks);
        let answer = self
            .generator
            .generate(question, &context, history, &self.model)
            .await;

        info!(
            chunks = chunks.len(),
            failed = answer.is_failed(),
            "Question answered"
        );

        RagAnswer {
            answer,
            chunks,
            context,
        }
    }
}
