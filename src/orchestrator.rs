//! Retrieval pipeline orchestrator.
//!
//! Builds the corpus and index once, then answers questions by embedding the
//! query, looking up the nearest document and handing it to the generator.

use crate::config::{Prompts, Settings};
use crate::corpus::{Document, DocumentSource, FetchReport, HttpSource, SkippedUrl};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{DocsageError, Result};
use crate::generation::{ChatGenerator, Generator};
use crate::index::FlatL2Index;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Readiness of an orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    /// Corpus indexed; queries are served.
    Ready,
    /// No document could be fetched; every query fails with `EmptyCorpus`.
    Degraded,
}

/// Options that shape how queries are answered.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Token limit passed to the generator.
    pub max_tokens: u32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self { max_tokens: 150 }
    }
}

/// A retrieved document with its distance to the query.
#[derive(Debug, Clone, Serialize)]
pub struct Retrieved {
    pub document: Document,
    /// Squared L2 distance (lower is closer).
    pub distance: f32,
}

/// Where an answer's context came from.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    pub position: usize,
    pub url: String,
    pub distance: f32,
}

/// A generated answer with its source.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub text: String,
    pub source: SourceRef,
}

/// The retrieval orchestrator.
///
/// Owns the corpus and its index. Both are immutable after construction, so
/// queries take `&self` and may run concurrently.
pub struct Orchestrator {
    documents: Vec<Document>,
    skipped: Vec<SkippedUrl>,
    index: Option<FlatL2Index>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    options: QueryOptions,
}

impl Orchestrator {
    /// Build the server-backed pipeline described by `settings`.
    pub async fn from_settings(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let source = HttpSource::new(&settings.corpus)?;
        let embedder = Arc::new(OpenAIEmbedder::new(&settings.server, &settings.embedding)?);
        let generator = Arc::new(
            ChatGenerator::new(&settings.server, &settings.generation)?.with_prompts(prompts),
        );

        info!(
            "Using embedding model {} and generation model {}",
            embedder.model(),
            generator.model()
        );

        let options = QueryOptions {
            max_tokens: settings.generation.max_tokens,
        };

        Self::initialize(&source, &settings.corpus.urls, embedder, generator, options).await
    }

    /// Fetch the corpus, embed it and build the index.
    ///
    /// An empty corpus is not an error: the orchestrator comes up
    /// [`PipelineState::Degraded`] and refuses queries.
    #[instrument(skip_all, fields(urls = urls.len()))]
    pub async fn initialize(
        source: &dyn DocumentSource,
        urls: &[String],
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        options: QueryOptions,
    ) -> Result<Self> {
        let FetchReport { documents, skipped } = source.fetch(urls).await;

        if documents.is_empty() {
            warn!("No documents fetched; queries will fail until restart");
            return Ok(Self {
                documents,
                skipped,
                index: None,
                embedder,
                generator,
                options,
            });
        }

        info!("Embedding {} documents", documents.len());
        let texts: Vec<String> = documents.iter().map(|d| d.raw_text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        Self::with_embeddings(documents, skipped, &embeddings, embedder, generator, options)
    }

    /// Assemble an orchestrator from documents and their precomputed embeddings.
    ///
    /// Document `i` must carry position `i`; it is looked up by index slot.
    pub fn with_embeddings(
        documents: Vec<Document>,
        skipped: Vec<SkippedUrl>,
        embeddings: &[Vec<f32>],
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        options: QueryOptions,
    ) -> Result<Self> {
        if embeddings.len() != documents.len() {
            return Err(DocsageError::Embedding(format!(
                "Expected {} embeddings, got {}",
                documents.len(),
                embeddings.len()
            )));
        }

        if let Some((slot, doc)) = documents
            .iter()
            .enumerate()
            .find(|(slot, doc)| doc.position != *slot)
        {
            return Err(DocsageError::InvalidInput(format!(
                "Document {} at slot {} has position {}",
                doc.url, slot, doc.position
            )));
        }

        let index = if documents.is_empty() {
            None
        } else {
            let index = FlatL2Index::build(embeddings)?;
            info!(
                "Indexed {} documents ({} dimensions)",
                index.len(),
                index.dimension()
            );
            Some(index)
        };

        Ok(Self {
            documents,
            skipped,
            index,
            embedder,
            generator,
            options,
        })
    }

    /// Current readiness.
    pub fn state(&self) -> PipelineState {
        if self.index.is_some() {
            PipelineState::Ready
        } else {
            PipelineState::Degraded
        }
    }

    /// The indexed documents, in position order.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// URLs that could not be fetched at startup.
    pub fn skipped(&self) -> &[SkippedUrl] {
        &self.skipped
    }

    /// Find the `k` documents nearest to `query`.
    #[instrument(skip(self))]
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Retrieved>> {
        let index = self.index.as_ref().ok_or(DocsageError::EmptyCorpus)?;

        let query_embedding = self.embedder.embed(query).await?;
        let neighbors = index.search(&query_embedding, k)?;

        neighbors
            .into_iter()
            .map(|n| {
                let document = self.documents.get(n.position).cloned().ok_or_else(|| {
                    DocsageError::InvalidInput(format!("Index position {} has no document", n.position))
                })?;
                Ok(Retrieved {
                    document,
                    distance: n.distance,
                })
            })
            .collect()
    }

    /// Answer `query` from its nearest document.
    #[instrument(skip(self))]
    pub async fn ask(&self, query: &str) -> Result<Answer> {
        let nearest = self
            .retrieve(query, 1)
            .await?
            .into_iter()
            .next()
            .ok_or(DocsageError::EmptyIndex)?;

        debug!(
            "Nearest document {} ({}) at distance {:.4}",
            nearest.document.position, nearest.document.url, nearest.distance
        );

        let text = self
            .generator
            .generate(query, &nearest.document.raw_text, self.options.max_tokens)
            .await?;

        if text.trim().is_empty() {
            return Err(DocsageError::GenerationFailure(
                "Generator returned no text".to_string(),
            ));
        }

        Ok(Answer {
            text,
            source: SourceRef {
                position: nearest.document.position,
                url: nearest.document.url,
                distance: nearest.distance,
            },
        })
    }
}
