//! Answer generation against the chat model.
//!
//! Builds `[system, ...recent history, user]` and sends it through the
//! provider. Provider failures never escape: they come back as
//! [`GeneratedAnswer::Failed`] so a batch run can keep going.

use std::sync::Arc;

use missionrag_config::AppConfig;
use missionrag_core::message::Message;
use missionrag_core::provider::{Provider, ProviderRequest};
use tracing::{debug, warn};

use crate::context::window::{DEFAULT_HISTORY_LIMIT, window};

/// Persona and grounding rules for every answer.
pub const SYSTEM_PROMPT: &str = "You are a NASA mission expert and historian with deep knowledge of space exploration,
particularly the Apollo program and Space Shuttle missions. You have extensive expertise in:

- Apollo 11: The first Moon landing mission (July 1969)
- Apollo 13: The famous \"successful failure\" mission with the oxygen tank explosion (April 1970)
- Space Shuttle Challenger: The tragic disaster during launch (January 1986)

When answering questions:
1. Base your responses primarily on the provided context from NASA documents
2. Cite specific sources when available (e.g., \"According to the technical transcript...\")
3. If the context doesn't contain enough information, acknowledge this clearly
4. Provide accurate technical details while making them accessible
5. When discussing tragedies, maintain a respectful and factual tone
6. If you're unsure about something, say so rather than making up information

You have access to mission transcripts, technical documents, and official NASA records.
Always prioritize accuracy and cite your sources from the provided context.";

/// Outcome of one generation call.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneratedAnswer {
    Answer(String),
    Failed(String),
}

impl GeneratedAnswer {
    /// The text shown to the user and stored in results.
    pub fn text(&self) -> String {
        match self {
            GeneratedAnswer::Answer(text) => text.clone(),
            GeneratedAnswer::Failed(reason) => format!("Error generating response: {reason}"),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, GeneratedAnswer::Failed(_))
    }
}

pub struct AnswerGenerator {
    provider: Arc<dyn Provider>,
    temperature: f32,
    max_tokens: u32,
    history_limit: usize,
}

impl AnswerGenerator {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            temperature: 0.7,
            max_tokens: 1500,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn from_config(provider: Arc<dyn Provider>, config: &AppConfig) -> Self {
        Self {
            provider,
            temperature: config.default_temperature,
            max_tokens: config.default_max_tokens,
            history_limit: config.context.history_limit,
        }
    }

    /// The exact message list sent for a question.
    pub fn build_messages(&self, question: &str, context: &str, history: &[Message]) -> Vec<Message> {
        let recent = window(history, self.history_limit);
        let mut messages = Vec::with_capacity(recent.len() + 2);
        messages.push(Message::system(SYSTEM_PROMPT));
        messages.extend(recent.iter().cloned());
        messages.push(Message::user(user_prompt(question, context)));
        messages
    }

    /// Generate an answer with `model`.
    pub async fn generate(
        &self,
        question: &str,
        context: &str,
        history: &[Message],
        model: &str,
    ) -> GeneratedAnswer {
        let request = ProviderRequest {
            model: model.to_string(),
            messages: self.build_messages(question, context, history),
            temperature: self.temperature,
            max_tokens: Some(self.max_tokens),
        };

        match self.provider.complete(request).await {
            Ok(response) => {
                debug!(
                    model = %response.model,
                    answer_len = response.message.content.len(),
                    "Answer generated"
                );
                GeneratedAnswer::Answer(response.message.content)
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Answer generation failed");
                GeneratedAnswer::Failed(e.to_string())
            }
        }
    }
}

fn user_prompt(question: &str, context: &str) -> String {
    if context.is_empty() {
        format!(
            "Question: {question}\n\n\
             Note: No specific NASA documents were retrieved for this query. \
             Please answer based on your general knowledge, but clearly indicate \
             when you're not referencing specific mission documents."
        )
    } else {
        format!(
            "Based on the following NASA mission documents, please answer my question.\n\n\
             {context}\n\n\
             Question: {question}\n\n\
             Please provide a detailed answer based on the context above. \
             If the context doesn't contain relevant information, say so clearly."
        )
    }
}
