//! Vector similarity utilities.
//!
//! Pure-Rust implementations of:
//! - Cosine similarity
//! - Top-k ranking of stored chunks against a query embedding

use crate::local::StoredChunk;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    (dot / denom) as f32
}

/// Rank chunks by cosine similarity to a query embedding.
///
/// Returns at most `limit` chunks sorted by descending similarity. Ties keep
/// collection order. Only chunks accepted by `filter` are considered.
pub fn vector_search<'a>(
    chunks: &'a [StoredChunk],
    query_embedding: &[f32],
    limit: usize,
    filter: impl Fn(&StoredChunk) -> bool,
) -> Vec<(f32, &'a StoredChunk)> {
    let mut scored: Vec<(f32, &StoredChunk)> = chunks
        .iter()
        .filter(|chunk| filter(chunk))
        .map(|chunk| (cosine_similarity(&chunk.embedding, query_embedding), chunk))
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored
}
