//! Embeddings from the model server's OpenAI-compatible endpoint.

use super::Embedder;
use crate::config::{EmbeddingSettings, ServerSettings};
use crate::error::{DocsageError, Result};
use crate::openai::create_client;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use std::sync::OnceLock;
use tracing::{debug, instrument};

/// Server-backed embedder.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: OnceLock<usize>,
}

impl OpenAIEmbedder {
    /// Create an embedder from settings.
    pub fn new(server: &ServerSettings, settings: &EmbeddingSettings) -> Result<Self> {
        let client = create_client(server)?;
        Ok(Self::with_client(client, &settings.model, settings.dimensions))
    }

    /// Create an embedder with a custom client.
    pub fn with_client(
        client: async_openai::Client<async_openai::config::OpenAIConfig>,
        model: &str,
        dimensions: Option<usize>,
    ) -> Self {
        let lock = OnceLock::new();
        if let Some(d) = dimensions {
            let _ = lock.set(d);
        }
        Self {
            client,
            model: model.to_string(),
            dimensions: lock,
        }
    }

    /// The model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Pin the dimension on first use and reject any vector that differs.
    fn check_dimensions(&self, embedding: &[f32]) -> Result<()> {
        let expected = *self.dimensions.get_or_init(|| embedding.len());
        if embedding.len() != expected {
            return Err(DocsageError::DimensionMismatch {
                expected,
                actual: embedding.len(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| DocsageError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        const BATCH_SIZE: usize = 32;
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(BATCH_SIZE) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(chunk.to_vec()))
                .build()
                .map_err(|e| DocsageError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| DocsageError::OpenAI(format!("Embedding API error: {}", e)))?;

            if response.data.len() != chunk.len() {
                return Err(DocsageError::Embedding(format!(
                    "Expected {} embeddings, server returned {}",
                    chunk.len(),
                    response.data.len()
                )));
            }

            // Sort by index to ensure correct order
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            // Indices must be exactly 0..n so each vector maps to one input.
            if let Some((slot, bad)) = embeddings
                .iter()
                .enumerate()
                .find(|(slot, e)| e.index as usize != *slot)
            {
                return Err(DocsageError::Embedding(format!(
                    "Embedding at slot {} has index {}",
                    slot, bad.index
                )));
            }

            for embedding_data in embeddings {
                self.check_dimensions(&embedding_data.embedding)?;
                all_embeddings.push(embedding_data.embedding);
            }
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> Option<usize> {
        self.dimensions.get().copied()
    }
}
