//! End-to-end chunk → embed orchestration.
//!
//! [`VectorPipeline`] owns an embedding provider and turns one input document
//! into an index-aligned `(chunks, embeddings)` pair. When the caller's
//! metadata carries no `source_id`, one is derived from a content hash of the
//! input, so re-processing identical text yields identical `chunk_id`
//! prefixes while any byte difference produces a fresh id space.

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::chunking::{ChunkingOptions, ChunkingStrategy, chunk_text};
use crate::embedding::{EmbedderConfig, Embedding, SharedEmbeddingProvider, build_provider};
use crate::types::{Chunk, EmbeddingError, Metadata, PipelineError};

/// One document to push through the pipeline.
#[derive(Clone, Debug)]
pub struct PipelineRequest {
    pub text: String,
    pub strategy: ChunkingStrategy,
    pub options: ChunkingOptions,
    pub metadata: Metadata,
}

impl PipelineRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            strategy: ChunkingStrategy::Sentence,
            options: ChunkingOptions::default(),
            metadata: Metadata::new(),
        }
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: ChunkingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: ChunkingOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Index-aligned result of one pipeline run.
#[derive(Clone, Debug)]
pub struct PipelineOutcome {
    pub chunks: Vec<Chunk>,
    pub embeddings: Vec<Embedding>,
}

impl PipelineOutcome {
    /// Number of chunks whose embedding degraded to a zero placeholder.
    pub fn degraded_count(&self) -> usize {
        self.embeddings
            .iter()
            .filter(|embedding| embedding.is_degraded())
            .count()
    }
}

/// Composes the chunker and an embedding provider into a single call.
pub struct VectorPipeline {
    provider: SharedEmbeddingProvider,
}

impl VectorPipeline {
    pub fn builder() -> VectorPipelineBuilder {
        VectorPipelineBuilder::default()
    }

    /// Chunks the request's text and embeds the chunks in order.
    ///
    /// No retry wrapping happens here beyond what the provider already does;
    /// per-batch degradation in the remote backend surfaces through the
    /// outcome's embedding flags, not as an error.
    pub async fn run(&self, request: PipelineRequest) -> Result<PipelineOutcome, PipelineError> {
        let PipelineRequest {
            text,
            strategy,
            options,
            mut metadata,
        } = request;

        if !metadata.contains_key("source_id") {
            metadata.insert(
                "source_id".to_string(),
                Value::from(content_source_id(&text)),
            );
        }

        info!(%strategy, "chunking input text");
        let chunks = chunk_text(&text, strategy, &options, &metadata)?;

        info!(
            chunks = chunks.len(),
            model = self.provider.model_id(),
            "generating embeddings"
        );
        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let embeddings = self.provider.embed_batch(&texts).await?;

        Ok(PipelineOutcome { chunks, embeddings })
    }
}

/// Deterministic short source id derived from the input text.
///
/// SHA-256 truncated to 8 hex characters: stable across repeated calls on
/// identical text, different on any byte change.
pub fn content_source_id(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest
        .iter()
        .take(4)
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// Builder for [`VectorPipeline`] instances.
#[derive(Default)]
pub struct VectorPipelineBuilder {
    provider: Option<SharedEmbeddingProvider>,
}

impl VectorPipelineBuilder {
    /// Uses an already-constructed provider (e.g. a mock in tests).
    #[must_use]
    pub fn with_provider(mut self, provider: SharedEmbeddingProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Builds and uses the provider described by `config`.
    pub fn with_embedder(mut self, config: &EmbedderConfig) -> Result<Self, EmbeddingError> {
        self.provider = Some(build_provider(config)?);
        Ok(self)
    }

    /// Builds the pipeline.
    ///
    /// # Panics
    ///
    /// Panics if no provider was configured.
    pub fn build(self) -> VectorPipeline {
        VectorPipeline {
            provider: self
                .provider
                .expect("VectorPipelineBuilder requires an embedding provider"),
        }
    }

    /// Builds the pipeline, returning `None` if no provider was configured.
    pub fn try_build(self) -> Option<VectorPipeline> {
        Some(VectorPipeline {
            provider: self.provider?,
        })
    }
}

impl From<SharedEmbeddingProvider> for VectorPipeline {
    fn from(provider: SharedEmbeddingProvider) -> Self {
        Self { provider }
    }
}
