//! # MissionRAG Core
//!
//! Domain types, traits, and error definitions for the MissionRAG
//! question-answering and evaluation pipeline. This crate has **no network
//! or framework dependencies**: it defines the domain model that the
//! provider, retrieval, RAG and evaluation crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (text generation, embeddings, vector
//! retrieval) is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping a hosted service for a local one via configuration
//! - Easy testing with scripted mock implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod provider;
pub mod retrieval;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Conversation, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse};
pub use retrieval::{ChunkMetadata, RetrievalQuery, RetrievedChunk, Retriever};
