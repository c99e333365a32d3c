//! Cosine-similarity retrieval over embedded chunks.
//!
//! Scores every chunk vector against the query, keeps those at or above the
//! threshold, and returns the best `top_k` in descending score order. The
//! sort is stable, so chunks with equal scores keep their original relative
//! order. Vectors that cannot be scored — zero norm (including degraded
//! placeholders from a failed embedding batch) or a dimension mismatch — are
//! skipped rather than surfacing as `NaN` scores.

use std::cmp::Ordering;

use crate::embedding::Embedding;
use crate::types::Chunk;

/// Cosine similarity of two vectors, or `None` when undefined.
///
/// Undefined when the vectors differ in length, are empty, or either has
/// zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        None
    } else {
        Some(dot / denominator)
    }
}

/// Ranks `chunks` against `query` by cosine similarity.
///
/// Chunks and embeddings are paired by position. Degenerate inputs (empty
/// chunk list, empty embedding list, `top_k == 0`) yield an empty result.
pub fn search_similar_chunks<'a>(
    query: &[f32],
    embeddings: &[Embedding],
    chunks: &'a [Chunk],
    top_k: usize,
    threshold: f32,
) -> Vec<(&'a Chunk, f32)> {
    if chunks.is_empty() || embeddings.is_empty() || top_k == 0 {
        return Vec::new();
    }

    let mut scored: Vec<(&Chunk, f32)> = chunks
        .iter()
        .zip(embeddings.iter())
        .filter_map(|(chunk, embedding)| {
            cosine_similarity(&embedding.vector, query).map(|score| (chunk, score))
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored
        .into_iter()
        .filter(|(_, score)| *score >= threshold)
        .take(top_k)
        .collect()
}
