//! Context assembly: retrieved chunks in, one prompt-ready block out.
//!
//! The assembled block looks like:
//!
//! ```text
//! === RELEVANT NASA MISSION DOCUMENTS ===
//!
//!
//! --- Source 1: Apollo 13 | Mission Transcript | a13_transcript.txt ---
//!
//! <chunk text, at most 2000 characters>
//!
//! === END OF DOCUMENTS ===
//! ```
//!
//! # Determinism
//!
//! Assembly is a pure function of the chunk sequence: no I/O, no clock,
//! identical input order always yields identical output.

use missionrag_config::ContextConfig;
use missionrag_core::retrieval::RetrievedChunk;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::debug;

pub const CONTEXT_HEADER: &str = "=== RELEVANT NASA MISSION DOCUMENTS ===\n";
pub const CONTEXT_FOOTER: &str = "\n=== END OF DOCUMENTS ===";
pub const TRUNCATION_MARKER: &str = "...[truncated]";

const UNKNOWN_MISSION: &str = "Unknown Mission";
const UNKNOWN_SOURCE: &str = "Unknown Source";
const GENERAL_CATEGORY: &str = "General";

/// The context assembler. Stateless; create one and reuse it.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    /// Characters kept per chunk before the truncation marker.
    max_chunk_chars: usize,
    /// Leading characters that make up a chunk's duplicate signature.
    signature_chars: usize,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(2000, 200)
    }
}

impl ContextAssembler {
    pub fn new(max_chunk_chars: usize, signature_chars: usize) -> Self {
        Self {
            max_chunk_chars,
            signature_chars,
        }
    }

    pub fn from_config(config: &ContextConfig) -> Self {
        Self::new(config.max_chunk_chars, config.signature_chars)
    }

    /// Assemble retrieved chunks into a single context block.
    ///
    /// Returns the empty string for an empty input, so the caller can tell
    /// "no context" apart from a context with no surviving chunks.
    pub fn assemble(&self, chunks: &[RetrievedChunk]) -> String {
        if chunks.is_empty() {
            return String::new();
        }

        let mut parts: Vec<String> = vec![CONTEXT_HEADER.to_string()];
        let mut seen: HashSet<[u8; 32]> = HashSet::new();
        let mut duplicates = 0usize;
        let mut truncated = 0usize;

        for (i, chunk) in chunks.iter().enumerate() {
            if !seen.insert(self.signature(&chunk.text)) {
                duplicates += 1;
                continue;
            }

            let meta = &chunk.metadata;
            let mission = display_name(meta.mission.as_deref().unwrap_or(UNKNOWN_MISSION));
            let category = display_name(meta.category.as_deref().unwrap_or(GENERAL_CATEGORY));
            let source = meta.source.as_deref().unwrap_or(UNKNOWN_SOURCE);

            parts.push(format!(
                "\n--- Source {}: {} | {} | {} ---\n",
                i + 1,
                mission,
                category,
                source
            ));

            match truncate_chars(&chunk.text, self.max_chunk_chars) {
                Some(head) => {
                    truncated += 1;
                    parts.push(format!("{head}{TRUNCATION_MARKER}"));
                }
                None => parts.push(chunk.text.clone()),
            }
        }

        parts.push(CONTEXT_FOOTER.to_string());

        debug!(
            chunks = chunks.len(),
            duplicates, truncated, "Context assembled"
        );

        parts.join("\n")
    }

    /// SHA-256 over the first `signature_chars` characters.
    fn signature(&self, text: &str) -> [u8; 32] {
        let prefix = match text.char_indices().nth(self.signature_chars) {
            Some((byte_idx, _)) => &text[..byte_idx],
            None => text,
        };
        Sha256::digest(prefix.as_bytes()).into()
    }
}

/// Assemble with the default limits (2000-character chunks, 200-character signatures).
pub fn assemble(chunks: &[RetrievedChunk]) -> String {
    ContextAssembler::default().assemble(chunks)
}

/// `apollo_13` → `Apollo 13`, `mission_transcript` → `Mission Transcript`.
///
/// Title-cases each run of letters: the first letter goes upper case, the
/// rest lower case, and any non-letter starts a new word.
pub fn display_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_word = false;

    for ch in raw.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }

    out
}

/// The first `max` characters of `text`, or `None` when it already fits.
fn truncate_chars(text: &str, max: usize) -> Option<&str> {
    text.char_indices().nth(max).map(|(byte_idx, _)| &text[..byte_idx])
}
