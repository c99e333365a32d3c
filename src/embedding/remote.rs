//! Remote embeddings backend over an OpenAI-compatible batch API.
//!
//! Texts are grouped into batches of `batch_size` and each batch is submitted
//! as one request. A failed batch (transport error, non-success status,
//! malformed or short response) does not abort the call: every text in that
//! batch receives a degraded zero vector of the model dimension, the failure
//! is logged once, and processing continues with the next batch. Callers that
//! care about search correctness must check [`Embedding::is_degraded`]
//! downstream.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use super::{DEFAULT_BATCH_SIZE, EmbedderConfig, Embedding, EmbeddingModel, EmbeddingProvider};
use crate::types::EmbeddingError;

pub const DEFAULT_REMOTE_ENDPOINT: &str = "https://api.openai.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Batched client for a remote embeddings API.
pub struct RemoteEmbeddingProvider {
    client: Client,
    model: EmbeddingModel,
    api_key: String,
    base_url: String,
    batch_size: usize,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingsItem>,
}

#[derive(Deserialize)]
struct EmbeddingsItem {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

impl RemoteEmbeddingProvider {
    /// Builds a provider for `config.model`.
    ///
    /// The credential must be present and non-empty; its absence is a
    /// configuration error, not a runtime fallback.
    pub fn new(config: &EmbedderConfig) -> Result<Self, EmbeddingError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| EmbeddingError::MissingCredential {
                model: config.model.id().to_string(),
            })?
            .to_string();

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let batch_size = if config.batch_size == 0 {
            DEFAULT_BATCH_SIZE
        } else {
            config.batch_size
        };

        Ok(Self {
            client,
            model: config.model,
            api_key,
            base_url: DEFAULT_REMOTE_ENDPOINT.to_string(),
            batch_size,
        })
    }

    /// Overrides the API base URL (primarily for tests against mock servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn request_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, String> {
        let url = format!("{}/embeddings", self.base_url);
        let request = EmbeddingsRequest {
            model: self.model.id(),
            input: batch,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| err.to_string())?
            .error_for_status()
            .map_err(|err| err.to_string())?;

        let body: EmbeddingsResponse = response.json().await.map_err(|err| err.to_string())?;
        if body.data.len() != batch.len() {
            return Err(format!(
                "expected {} vectors, received {}",
                batch.len(),
                body.data.len()
            ));
        }

        let mut items = body.data;
        items.sort_by_key(|item| item.index);
        Ok(items.into_iter().map(|item| item.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbeddingProvider {
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

        let mut embeddings = Vec::with_capacity(texts.len());
        for (batch_index, batch) in texts.chunks(self.batch_size).enumerate() {
            match self.request_batch(batch).await {
                Ok(vectors) => embeddings.extend(vectors.into_iter().map(Embedding::real)),
                Err(reason) => {
                    warn!(
                        batch = batch_index,
                        size = batch.len(),
                        model = self.model.id(),
                        %reason,
                        "embedding batch failed; substituting degraded zero vectors"
                    );
                    embeddings.extend(
                        std::iter::repeat_with(|| Embedding::degraded(self.dimension()))
                            .take(batch.len()),
                    );
                }
            }
        }
        Ok(embeddings)
    }
}
