//! OpenAI sentence encoder
//!
//! Implements the grouping engine's synchronous [`SentenceEncoder`] on top of
//! the async OpenAI client. The engine runs on a blocking thread, so each
//! call is driven to completion on the captured runtime handle.

use async_openai::{
    config::OpenAIConfig,
    types::embeddings::{CreateEmbeddingRequest, EmbeddingInput},
    Client,
};
use tokio::runtime::Handle;
use tracing::{debug, info};

use headline_grouping::{EmbeddingVector, GroupingError, SentenceEncoder};

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const EMBEDDING_DIMENSION: usize = 1536;
/// Inputs per embeddings request
const BATCH_SIZE: usize = 256;

/// OpenAI embedding client usable from synchronous code
pub struct OpenAiEncoder {
    client: Client<OpenAIConfig>,
    model: String,
    dimension: usize,
    runtime: Handle,
}

impl OpenAiEncoder {
    /// Create an encoder
    ///
    /// Uses text-embedding-3-small (1536 dimensions). `runtime` must outlive
    /// the encoder and must not be driving the calling thread.
    pub fn new(api_key: String, runtime: Handle) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Client::with_config(config),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimension: EMBEDDING_DIMENSION,
            runtime,
        }
    }

    /// Create from `OPENAI_API_KEY`, failing fast when it is not set
    pub fn from_env(runtime: Handle) -> Result<Self, GroupingError> {
        match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key, runtime)),
            _ => Err(GroupingError::EncoderUnavailable(
                "OPENAI_API_KEY is not set".to_string(),
            )),
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, GroupingError> {
        let request = CreateEmbeddingRequest {
            model: self.model.clone(),
            input: EmbeddingInput::StringArray(texts.to_vec()),
            encoding_format: None,
            dimensions: None,
            user: None,
        };

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| GroupingError::Encoder(e.to_string()))?;

        if response.data.len() != texts.len() {
            return Err(GroupingError::EmbeddingCount {
                expected: texts.len(),
                actual: response.data.len(),
            });
        }

        let mut data = response.data;
        data.sort_by_key(|embedding| embedding.index);

        let mut vectors = Vec::with_capacity(data.len());
        for embedding in data {
            if embedding.embedding.len() != self.dimension {
                return Err(GroupingError::DimensionMismatch {
                    expected: self.dimension,
                    actual: embedding.embedding.len(),
                });
            }
            vectors.push(embedding.embedding);
        }
        Ok(vectors)
    }
}

impl SentenceEncoder for OpenAiEncoder {
    fn encode(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, GroupingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(BATCH_SIZE) {
            debug!("Embedding batch of {} texts", batch.len());
            vectors.extend(self.runtime.block_on(self.embed_batch(batch))?);
        }

        info!(
            "Generated {} embeddings: dimension={}, model={}",
            vectors.len(),
            self.dimension,
            self.model
        );
        Ok(vectors)
    }
}
