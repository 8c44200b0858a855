//! Deterministic test doubles for the retrieval pipeline.

#![allow(dead_code)]

use async_trait::async_trait;
use docsage::corpus::{Document, DocumentSource, FetchReport, SkippedUrl};
use docsage::embedding::Embedder;
use docsage::error::{DocsageError, Result};
use docsage::generation::Generator;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Embedder returning fixed vectors per text.
pub struct FixedEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
    pub calls: AtomicUsize,
}

impl FixedEmbedder {
    pub fn new(pairs: &[(&str, Vec<f32>)], fallback: Vec<f32>) -> Self {
        Self {
            vectors: pairs
                .iter()
                .map(|(text, v)| (text.to_string(), v.clone()))
                .collect(),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> Option<usize> {
        Some(self.fallback.len())
    }
}

/// Generator returning canned text and recording its inputs.
pub struct CannedGenerator {
    reply: Option<String>,
    pub seen: Mutex<Vec<(String, String, u32)>>,
}

impl CannedGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// A generator whose every call fails.
    pub fn failing() -> Self {
        Self {
            reply: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String, u32)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for CannedGenerator {
    async fn generate(&self, query: &str, context: &str, max_tokens: u32) -> Result<String> {
        self.seen
            .lock()
            .unwrap()
            .push((query.to_string(), context.to_string(), max_tokens));
        self.reply
            .clone()
            .ok_or_else(|| DocsageError::GenerationFailure("model unavailable".to_string()))
    }
}

/// Source returning a fixed set of documents.
pub struct StaticSource {
    pub texts: Vec<(&'static str, &'static str)>,
    pub skipped: Vec<(&'static str, &'static str)>,
}

impl StaticSource {
    pub fn new(texts: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            texts,
            skipped: Vec::new(),
        }
    }

    pub fn empty(skipped: Vec<(&'static str, &'static str)>) -> Self {
        Self {
            texts: Vec::new(),
            skipped,
        }
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    async fn fetch(&self, _urls: &[String]) -> FetchReport {
        FetchReport {
            documents: self
                .texts
                .iter()
                .enumerate()
                .map(|(i, (url, text))| Document::new(i, *url, *text))
                .collect(),
            skipped: self
                .skipped
                .iter()
                .map(|(url, reason)| SkippedUrl {
                    url: url.to_string(),
                    reason: reason.to_string(),
                })
                .collect(),
        }
    }
}

pub fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|u| u.to_string()).collect()
}
