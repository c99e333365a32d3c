//! Local encoder backend built on `fastembed`.
//!
//! The named model is loaded once when the provider is constructed and reused
//! for every call; encoding runs in one pass with internal batching. Unlike
//! the remote backend there is no partial-failure path: a load or encode
//! failure is fatal and propagates to the caller.

use async_trait::async_trait;
use fastembed::{EmbeddingModel as EncoderModel, InitOptions, TextEmbedding};
use std::sync::Mutex;

use super::{
    DEFAULT_BATCH_SIZE, EmbedderConfig, Embedding, EmbeddingModel, EmbeddingProvider, l2_normalize,
};
use crate::types::EmbeddingError;

/// In-process encoder provider.
pub struct LocalEncoderProvider {
    model: EmbeddingModel,
    encoder: Mutex<TextEmbedding>,
    batch_size: usize,
    normalize: bool,
}

impl LocalEncoderProvider {
    /// Loads the pretrained encoder for `config.model`.
    pub fn new(config: &EmbedderConfig) -> Result<Self, EmbeddingError> {
        let encoder_model = match config.model {
            EmbeddingModel::AllMiniLmL6V2 => EncoderModel::AllMiniLML6V2,
            EmbeddingModel::MultilingualMpnet => EncoderModel::ParaphraseMLMpnetBaseV2,
            other => {
                return Err(EmbeddingError::BackendUnavailable {
                    model: other.id().to_string(),
                    reason: "not a local encoder model".into(),
                });
            }
        };

        let encoder = TextEmbedding::try_new(
            InitOptions::new(encoder_model).with_show_download_progress(false),
        )
        .map_err(|err| EmbeddingError::Backend(err.to_string()))?;

        let batch_size = if config.batch_size == 0 {
            DEFAULT_BATCH_SIZE
        } else {
            config.batch_size
        };

        Ok(Self {
            model: config.model,
            encoder: Mutex::new(encoder),
            batch_size,
            normalize: config.normalize,
        })
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEncoderProvider {
    fn model_id(&self) -> &str {
        self.model.id()
    }

    fn dimension(&self) -> usize {
        self.model.dimension()
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let documents: Vec<&str> = texts.iter().map(String::as_str).collect();
        let encoder = self
            .encoder
            .lock()
            .map_err(|_| EmbeddingError::Backend("encoder mutex poisoned".into()))?;
        let vectors = encoder
            .embed(documents, Some(self.batch_size))
            .map_err(|err| EmbeddingError::Backend(err.to_string()))?;

        Ok(vectors
            .into_iter()
            .map(|mut vector| {
                if self.normalize {
                    l2_normalize(&mut vector);
                }
                Embedding::real(vector)
            })
            .collect())
    }
}
