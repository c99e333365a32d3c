//! Core chunk record, metadata conventions, and the crate error taxonomy.
//!
//! A [`Chunk`] is a bounded segment of source text plus provenance: a
//! deterministic id, half-open byte offsets into the original document, and an
//! open metadata map merged from caller-supplied context and strategy
//! internals. Offsets always land on `char` boundaries so they can be used to
//! slice the original text directly.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Open metadata map attached to every chunk: string keys, JSON values.
pub type Metadata = serde_json::Map<String, Value>;

/// Metadata keys the chunking strategies populate themselves.
///
/// Caller-supplied values under these keys are overwritten by the strategy;
/// each overwrite is logged at `warn` rather than silently absorbed.
pub const RESERVED_METADATA_KEYS: &[&str] = &[
    "chunk_index",
    "total_chunks",
    "sentence_count",
    "paragraph_index",
    "section_title",
    "section_type",
    "section",
    "chunking_strategy",
    "optimal_chunk_size",
    "optimal_overlap",
];

/// A segment of source text with provenance metadata.
///
/// `start_pos..end_pos` is the half-open byte span the chunk was cut from
/// (best-effort for strategies that reassemble text from fragments: the span
/// covers the first through last contributing fragment). `text` is always
/// trimmed and non-empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Trimmed chunk text.
    pub text: String,
    /// `{source_label}_{index}` — unique within one chunking run.
    pub chunk_id: String,
    /// Byte offset where the chunk starts in the original text.
    pub start_pos: usize,
    /// Byte offset where the chunk ends (exclusive).
    pub end_pos: usize,
    /// Caller metadata merged with strategy-specific fields.
    pub metadata: Metadata,
}

impl Chunk {
    /// Zero-based position of this chunk within its run.
    pub fn chunk_index(&self) -> Option<usize> {
        self.metadata
            .get("chunk_index")
            .and_then(Value::as_u64)
            .map(|value| value as usize)
    }

    /// Total number of chunks produced by the run this chunk belongs to.
    pub fn total_chunks(&self) -> Option<usize> {
        self.metadata
            .get("total_chunks")
            .and_then(Value::as_u64)
            .map(|value| value as usize)
    }

    /// Byte span of this chunk in the original document.
    pub fn span(&self) -> std::ops::Range<usize> {
        self.start_pos..self.end_pos
    }
}

/// Inserts a strategy-owned metadata key, warning when it displaces a
/// caller-supplied value.
pub(crate) fn insert_reserved(metadata: &mut Metadata, key: &str, value: Value) {
    if let Some(previous) = metadata.insert(key.to_string(), value) {
        warn!(
            key,
            ?previous,
            "caller metadata collides with a reserved key; strategy value kept"
        );
    }
}

/// Resolves the source label used to build chunk ids.
pub(crate) fn source_label(metadata: &Metadata) -> String {
    metadata
        .get("source_id")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

/// Errors raised while configuring or running a chunking strategy.
///
/// All strategies are pure functions of their inputs; the only failure mode
/// is a configuration that cannot make progress.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// The sizing options cannot produce a terminating run.
    #[error("invalid chunking options: {reason}")]
    InvalidOptions { reason: String },
}

/// Errors raised by the embedding backends.
///
/// Per-batch remote failures are *not* represented here: the remote backend
/// recovers them locally with degraded zero vectors (see
/// [`crate::embedding::Embedding::degraded`]). Only configuration problems and
/// fatal local-encoder failures surface as errors.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// A remote model was selected without a credential.
    #[error("model '{model}' requires an API credential but none was supplied")]
    MissingCredential { model: String },

    /// The selected backend cannot be constructed in this build.
    #[error("embedding backend for '{model}' is unavailable: {reason}")]
    BackendUnavailable { model: String, reason: String },

    /// The backend failed fatally (local model load or encode failure).
    #[error("embedding backend failed: {0}")]
    Backend(String),

    /// The HTTP client could not be constructed.
    #[error("failed to construct HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Errors surfaced by the end-to-end pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Chunking(#[from] ChunkingError),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_chunk() -> Chunk {
        let mut metadata = Metadata::new();
        metadata.insert("source_id".into(), json!("abc123"));
        metadata.insert("chunk_index".into(), json!(2));
        metadata.insert("total_chunks".into(), json!(5));
        Chunk {
            text: "Quarterly revenue grew.".into(),
            chunk_id: "abc123_2".into(),
            start_pos: 40,
            end_pos: 63,
            metadata,
        }
    }

    #[test]
    fn chunk_round_trips_through_json() {
        let chunk = sample_chunk();
        let serialized = serde_json::to_string(&chunk).unwrap();
        let restored: Chunk = serde_json::from_str(&serialized).unwrap();
        assert_eq!(chunk, restored);
    }

    #[test]
    fn chunk_accessors_read_metadata() {
        let chunk = sample_chunk();
        assert_eq!(chunk.chunk_index(), Some(2));
        assert_eq!(chunk.total_chunks(), Some(5));
        assert_eq!(chunk.span(), 40..63);
    }

    #[test]
    fn reserved_insert_overwrites_caller_value() {
        let mut metadata = Metadata::new();
        metadata.insert("chunk_index".into(), json!("caller supplied"));
        insert_reserved(&mut metadata, "chunk_index", json!(7));
        assert_eq!(metadata.get("chunk_index"), Some(&json!(7)));
    }

    #[test]
    fn source_label_defaults_to_unknown() {
        assert_eq!(source_label(&Metadata::new()), "unknown");
        let mut metadata = Metadata::new();
        metadata.insert("source_id".into(), json!("f1a2b3c4"));
        assert_eq!(source_label(&metadata), "f1a2b3c4");
    }
}
