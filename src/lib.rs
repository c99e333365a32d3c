//! ```text
//! Filing text ──► chunking::chunk_text ──────────────► Vec<Chunk>
//!      │                 ▲
//!      │     chunking::chunk_filing_sections
//!      │     (per-category sizing profiles)
//!      ▼
//! pipeline::VectorPipeline ──► embedding::EmbeddingProvider ──► Vec<Embedding>
//!                                        │
//!                    remote API batches ─┼─ local encoder ─┼─ deterministic mock
//!                                        ▼
//! search::search_similar_chunks ──► ranked (chunk, score) results
//! ```
//!
//! Chunking is pure and synchronous; only the embedding backends block on
//! external resources. Batches inside a provider run sequentially and output
//! order always matches input order, so concurrent pipeline calls are safe as
//! long as each owns its inputs.

pub mod chunking;
pub mod embedding;
pub mod pipeline;
pub mod search;
pub mod types;

pub use chunking::{
    ChunkingOptions, ChunkingStrategy, FilingSection, SectionCategory, SectionProfile,
    chunk_filing_sections, chunk_text, find_sentence_boundary, split_sentences,
};
pub use embedding::{
    EmbedderConfig, Embedding, EmbeddingModel, EmbeddingProvider, MockEmbeddingProvider,
    ModelFamily, RemoteEmbeddingProvider, SharedEmbeddingProvider, build_provider,
};
pub use pipeline::{PipelineOutcome, PipelineRequest, VectorPipeline, content_source_id};
pub use search::{cosine_similarity, search_similar_chunks};
pub use types::{
    Chunk, ChunkingError, EmbeddingError, Metadata, PipelineError, RESERVED_METADATA_KEYS,
};
