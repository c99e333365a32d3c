//! Pluggable embedding backends.
//!
//! [`EmbeddingProvider`] is the seam between the pipeline and whatever turns
//! chunk text into vectors. Three implementations ship with the crate:
//!
//! * [`remote::RemoteEmbeddingProvider`] — batched calls to an
//!   OpenAI-compatible embeddings API, degrading failed batches to zero
//!   vectors instead of aborting the run.
//! * `local::LocalEncoderProvider` — an in-process encoder over `fastembed`,
//!   behind the `local-embeddings` feature; failures here are fatal.
//! * [`MockEmbeddingProvider`] — deterministic vectors for tests and demos.
//!
//! Every backend preserves input order and returns exactly one
//! [`Embedding`] per input text; an empty input yields an empty output
//! without contacting the backend.

#[cfg(feature = "local-embeddings")]
pub mod local;
pub mod remote;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

use crate::types::EmbeddingError;

pub use remote::RemoteEmbeddingProvider;

#[cfg(feature = "local-embeddings")]
pub use local::LocalEncoderProvider;

pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Which kind of backend serves a model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    /// Served over HTTP by an embeddings API; requires a credential.
    RemoteApi,
    /// Served in-process by a local encoder.
    LocalEncoder,
}

/// The embedding models the crate knows how to dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingModel {
    /// `text-embedding-ada-002` (remote, 1536-dim).
    Ada002,
    /// `text-embedding-3-small` (remote, 1536-dim).
    Small3,
    /// `text-embedding-3-large` (remote, 3072-dim).
    Large3,
    /// `all-MiniLM-L6-v2` (local, 384-dim).
    AllMiniLmL6V2,
    /// `paraphrase-multilingual-mpnet-base-v2` (local, 768-dim).
    MultilingualMpnet,
}

impl EmbeddingModel {
    /// Wire identifier used in API requests and encoder lookups.
    pub fn id(self) -> &'static str {
        match self {
            EmbeddingModel::Ada002 => "text-embedding-ada-002",
            EmbeddingModel::Small3 => "text-embedding-3-small",
            EmbeddingModel::Large3 => "text-embedding-3-large",
            EmbeddingModel::AllMiniLmL6V2 => "all-MiniLM-L6-v2",
            EmbeddingModel::MultilingualMpnet => "paraphrase-multilingual-mpnet-base-v2",
        }
    }

    pub fn family(self) -> ModelFamily {
        match self {
            EmbeddingModel::Ada002 | EmbeddingModel::Small3 | EmbeddingModel::Large3 => {
                ModelFamily::RemoteApi
            }
            EmbeddingModel::AllMiniLmL6V2 | EmbeddingModel::MultilingualMpnet => {
                ModelFamily::LocalEncoder
            }
        }
    }

    /// Output dimensionality; degraded fallback vectors use this size.
    pub fn dimension(self) -> usize {
        match self {
            EmbeddingModel::Ada002 | EmbeddingModel::Small3 => 1536,
            EmbeddingModel::Large3 => 3072,
            EmbeddingModel::AllMiniLmL6V2 => 384,
            EmbeddingModel::MultilingualMpnet => 768,
        }
    }
}

impl Default for EmbeddingModel {
    fn default() -> Self {
        EmbeddingModel::AllMiniLmL6V2
    }
}

impl fmt::Display for EmbeddingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A vector produced for one chunk, 1:1 by position with the input texts.
///
/// `degraded` marks the placeholder zero vectors substituted when a remote
/// batch fails; downstream similarity search must be able to tell these from
/// real embeddings, so the marker is explicit rather than inferred from the
/// values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub vector: Vec<f32>,
    pub degraded: bool,
}

impl Embedding {
    /// A backend-produced vector.
    pub fn real(vector: Vec<f32>) -> Self {
        Self {
            vector,
            degraded: false,
        }
    }

    /// A zero placeholder of the given dimensionality.
    pub fn degraded(dimension: usize) -> Self {
        Self {
            vector: vec![0.0; dimension],
            degraded: true,
        }
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }
}

/// Configuration for building an embedding provider.
#[derive(Clone, Debug)]
pub struct EmbedderConfig {
    pub model: EmbeddingModel,
    pub batch_size: usize,
    pub api_key: Option<String>,
    pub normalize: bool,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self::new(EmbeddingModel::default())
    }
}

impl EmbedderConfig {
    pub fn new(model: EmbeddingModel) -> Self {
        Self {
            model,
            batch_size: DEFAULT_BATCH_SIZE,
            api_key: None,
            normalize: true,
        }
    }

    /// Reads the API credential from the environment (`OPENAI_API_KEY`),
    /// loading a `.env` file first when present.
    pub fn from_env(model: EmbeddingModel) -> Self {
        dotenvy::dotenv().ok();
        Self::new(model).with_api_key(std::env::var("OPENAI_API_KEY").ok())
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    #[must_use]
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }
}

/// Implemented by concrete embedding backends.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Wire identifier of the underlying model.
    fn model_id(&self) -> &str;

    /// Output dimensionality of the vectors this provider produces.
    fn dimension(&self) -> usize;

    /// Embeds `texts`, returning one vector per input in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError>;

    /// Embeds a single text.
    async fn embed_one(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| EmbeddingError::Backend("backend returned no vector".into()))
    }
}

/// Shared handle to a provider, cloneable across pipeline instances.
pub type SharedEmbeddingProvider = Arc<dyn EmbeddingProvider>;

/// Builds the provider matching the configured model family.
///
/// Selecting a remote model without a credential is a configuration error;
/// selecting a local model in a build without the `local-embeddings` feature
/// reports the backend as unavailable.
pub fn build_provider(config: &EmbedderConfig) -> Result<SharedEmbeddingProvider, EmbeddingError> {
    match config.model.family() {
        ModelFamily::RemoteApi => Ok(Arc::new(RemoteEmbeddingProvider::new(config)?)),
        ModelFamily::LocalEncoder => {
            #[cfg(feature = "local-embeddings")]
            {
                Ok(Arc::new(local::LocalEncoderProvider::new(config)?))
            }
            #[cfg(not(feature = "local-embeddings"))]
            {
                Err(EmbeddingError::BackendUnavailable {
                    model: config.model.id().to_string(),
                    reason: "crate built without the `local-embeddings` feature".into(),
                })
            }
        }
    }
}

/// Scales `vector` to unit length; zero vectors are left untouched.
pub(crate) fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}

/// Deterministic embedding provider for tests and offline demos.
///
/// Vectors are derived from a SHA-256 digest of the text, so equal inputs
/// always produce equal vectors and distinct inputs almost surely differ.
#[derive(Clone, Debug)]
pub struct MockEmbeddingProvider {
    dimension: usize,
}

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self { dimension: 32 }
    }

    #[must_use]
    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension.max(1);
        self
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let digest = Sha256::digest(text.as_bytes());
        let mut vector: Vec<f32> = digest
            .iter()
            .cycle()
            .take(self.dimension)
            .map(|byte| (f32::from(*byte) - 127.5) / 127.5)
            .collect();
        l2_normalize(&mut vector);
        vector
    }
}

impl Default for MockEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn model_id(&self) -> &str {
        "mock-embedding"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        Ok(texts
            .iter()
            .map(|text| Embedding::real(self.vector_for(text)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_table_is_consistent() {
        assert_eq!(EmbeddingModel::Ada002.dimension(), 1536);
        assert_eq!(EmbeddingModel::Large3.dimension(), 3072);
        assert_eq!(EmbeddingModel::AllMiniLmL6V2.dimension(), 384);
        assert_eq!(EmbeddingModel::Ada002.family(), ModelFamily::RemoteApi);
        assert_eq!(
            EmbeddingModel::MultilingualMpnet.family(),
            ModelFamily::LocalEncoder
        );
        assert_eq!(EmbeddingModel::Small3.id(), "text-embedding-3-small");
        assert_eq!(EmbeddingModel::default(), EmbeddingModel::AllMiniLmL6V2);
    }

    #[test]
    fn degraded_embeddings_are_zero_and_flagged() {
        let embedding = Embedding::degraded(16);
        assert_eq!(embedding.dimension(), 16);
        assert!(embedding.is_degraded());
        assert!(embedding.vector.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn remote_model_without_credential_is_a_config_error() {
        let config = EmbedderConfig::new(EmbeddingModel::Small3);
        let err = build_provider(&config).map(|_| ()).unwrap_err();
        assert!(matches!(err, EmbeddingError::MissingCredential { .. }));
    }

    #[tokio::test]
    async fn mock_provider_is_deterministic() {
        let provider = MockEmbeddingProvider::new();
        let inputs = vec![
            "Hello world".to_string(),
            "Goodbye world".to_string(),
            "Hello world".to_string(),
        ];
        let first = provider.embed_batch(&inputs).await.unwrap();
        let second = provider.embed_batch(&inputs).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0], first[2], "identical text, identical embedding");
        assert_ne!(first[0], first[1], "different text, different embedding");
    }

    #[tokio::test]
    async fn mock_provider_embeds_empty_input_to_empty_output() {
        let provider = MockEmbeddingProvider::new();
        assert!(provider.embed_batch(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mock_vectors_have_unit_norm_and_requested_dimension() {
        let provider = MockEmbeddingProvider::new().with_dimension(64);
        let embedding = provider.embed_one("some filing text").await.unwrap();
        assert_eq!(embedding.dimension(), 64);
        let norm: f32 = embedding.vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }
}
