//! HTTP document source.

use super::{DocumentSource, FetchReport, ParagraphExtractor};
use crate::config::{parse_http_url, CorpusSettings};
use crate::error::{DocsageError, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Fetches pages over HTTP and keeps their paragraph text.
pub struct HttpSource {
    client: reqwest::Client,
    extractor: ParagraphExtractor,
    max_concurrent: usize,
}

impl HttpSource {
    /// Create a source from corpus settings.
    pub fn new(settings: &CorpusSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.fetch_timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| DocsageError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, settings.max_concurrent_fetches))
    }

    /// Create a source with a custom HTTP client.
    pub fn with_client(client: reqwest::Client, max_concurrent: usize) -> Self {
        Self {
            client,
            extractor: ParagraphExtractor::new(),
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Fetch a single page and extract its paragraph text.
    ///
    /// Every failure is reported as [`DocsageError::FetchFailure`].
    #[instrument(skip(self))]
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        let failure = |reason: String| DocsageError::FetchFailure {
            url: url.to_string(),
            reason,
        };

        let parsed = parse_http_url(url).map_err(|e| failure(e.to_string()))?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failure(format!("HTTP {}", status)));
        }

        let body = response.text().await.map_err(|e| failure(e.to_string()))?;
        let text = self.extractor.extract(&body);
        debug!("Extracted {} characters from {}", text.len(), url);

        Ok(text)
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    #[instrument(skip(self, urls), fields(count = urls.len()))]
    async fn fetch(&self, urls: &[String]) -> FetchReport {
        // `buffered` keeps results in input order regardless of completion order.
        let results: Vec<(String, Result<String>)> = stream::iter(urls.iter().cloned())
            .map(|url| async move {
                let result = self.fetch_page(&url).await;
                (url, result)
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let report = FetchReport::from_results(results);
        info!(
            "Fetched {} of {} pages ({} skipped)",
            report.documents.len(),
            urls.len(),
            report.skipped.len()
        );
        report
    }
}
