//! LLM provider implementations for MissionRAG.
//!
//! All providers implement the `missionrag_core::Provider` trait.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;
