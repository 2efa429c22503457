//! MissionRAG question answering.
//!
//! Turns retrieved mission documents into a prompt context and asks the
//! chat model for a grounded answer.

pub mod context;
pub mod generator;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::{ContextAssembler, DEFAULT_HISTORY_LIMIT, assemble, window};
pub use generator::{AnswerGenerator, GeneratedAnswer, SYSTEM_PROMPT};
pub use pipeline::{RagAnswer, RagPipeline};
