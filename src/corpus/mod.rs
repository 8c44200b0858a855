//! Reference corpus: documents fetched once at startup.
//!
//! A [`DocumentSource`] turns a list of URLs into documents. Per-URL failures
//! never abort the fetch; they are recorded in the [`FetchReport`] and the
//! remaining pages keep their relative order.

mod html;
mod http;

pub use html::ParagraphExtractor;
pub use http::HttpSource;

use crate::error::DocsageError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A fetched reference page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Position in the corpus ordering. Also the document's index position.
    pub position: usize,
    /// Source URL.
    pub url: String,
    /// Paragraph text extracted from the page. May be empty.
    pub raw_text: String,
    /// When the page was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document.
    pub fn new(position: usize, url: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            position,
            url: url.into(),
            raw_text: raw_text.into(),
            fetched_at: Utc::now(),
        }
    }

    /// Number of characters in the extracted text.
    pub fn char_count(&self) -> usize {
        self.raw_text.chars().count()
    }
}

/// A URL that could not be turned into a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedUrl {
    pub url: String,
    pub reason: String,
}

/// Outcome of fetching a URL list.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// Successfully fetched documents, positions `0..n`.
    pub documents: Vec<Document>,
    /// URLs that failed, in input order.
    pub skipped: Vec<SkippedUrl>,
}

impl FetchReport {
    /// Assemble a report from per-URL results given in input order.
    ///
    /// Positions are assigned consecutively over the successes only.
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = (String, crate::error::Result<String>)>,
    {
        let mut report = FetchReport::default();

        for (url, result) in results {
            match result {
                Ok(text) => {
                    let position = report.documents.len();
                    report.documents.push(Document::new(position, url, text));
                }
                Err(e) => {
                    warn!("Skipping {}: {}", url, e);
                    let reason = match e {
                        DocsageError::FetchFailure { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    report.skipped.push(SkippedUrl { url, reason });
                }
            }
        }

        report
    }
}

/// Produces the corpus documents for a list of URLs.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch every URL once, skipping the ones that fail.
    async fn fetch(&self, urls: &[String]) -> FetchReport;
}
