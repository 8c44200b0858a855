//! Native Ollama API: model listing and pulling with progress.
//!
//! A pull is reported as a finite stream of [`PullEvent`]s decoded from the
//! server's newline-delimited JSON. Dropping the stream drops the HTTP
//! response, which aborts the transfer.

use crate::config::ServerSettings;
use crate::error::{DocsageError, Result};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::Deserialize;
use std::collections::VecDeque;
use std::fmt::Display;
use std::time::Duration;
use tracing::{debug, instrument};

/// One progress report from a model pull.
#[derive(Debug, Clone, PartialEq)]
pub enum PullEvent {
    /// A phase without byte counts (e.g. "pulling manifest").
    Status(String),
    /// Download progress for the current layer.
    Progress {
        status: String,
        completed: u64,
        total: u64,
    },
    /// The model is ready.
    Success,
}

impl PullEvent {
    /// Completion percentage for progress events.
    pub fn percent(&self) -> Option<u8> {
        match self {
            PullEvent::Progress { completed, total, .. } if *total > 0 => {
                Some(((*completed).min(*total) * 100 / *total) as u8)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PullLine {
    status: Option<String>,
    total: Option<u64>,
    completed: Option<u64>,
    error: Option<String>,
    message: Option<String>,
}

/// Decode one line of the pull response.
pub fn parse_pull_line(line: &str) -> Result<PullEvent> {
    let raw: PullLine = serde_json::from_str(line)?;

    if let Some(error) = raw.error {
        return Err(DocsageError::ModelPull(error));
    }

    match (raw.status, raw.total, raw.completed) {
        (Some(status), _, _) if status == "success" => Ok(PullEvent::Success),
        (Some(status), _, _) if status == "error" => Err(DocsageError::ModelPull(
            raw.message
                .unwrap_or_else(|| "No specific error message provided".to_string()),
        )),
        (Some(status), Some(total), completed) => Ok(PullEvent::Progress {
            status,
            completed: completed.unwrap_or(0),
            total,
        }),
        (Some(status), None, _) => Ok(PullEvent::Status(status)),
        (None, _, _) => Err(DocsageError::ModelPull(format!(
            "Unrecognized progress line: {}",
            line
        ))),
    }
}

/// Splits a byte stream into lines across chunk boundaries.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes and return every complete, non-blank line.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(newline) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=newline).collect();
            let text = String::from_utf8_lossy(&line).trim().to_string();
            if !text.is_empty() {
                lines.push(text);
            }
        }
        lines
    }

    /// Return the trailing line that had no newline, if any.
    pub fn finish(&mut self) -> Option<String> {
        let text = String::from_utf8_lossy(&self.buf).trim().to_string();
        self.buf.clear();
        (!text.is_empty()).then_some(text)
    }
}

struct DecodeState<S> {
    inner: S,
    lines: LineBuffer,
    pending: VecDeque<String>,
    finished: bool,
}

/// Turn a raw byte stream into pull events.
pub fn decode_pull_stream<S, B, E>(bytes: S) -> impl Stream<Item = Result<PullEvent>>
where
    S: Stream<Item = std::result::Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
{
    let state = DecodeState {
        inner: bytes,
        lines: LineBuffer::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(line) = st.pending.pop_front() {
                return Some((parse_pull_line(&line), st));
            }
            if st.finished {
                return None;
            }
            match st.inner.next().await {
                Some(Ok(chunk)) => {
                    let lines = st.lines.push(chunk.as_ref());
                    st.pending.extend(lines);
                }
                Some(Err(e)) => {
                    st.finished = true;
                    return Some((Err(DocsageError::ModelPull(e.to_string())), st));
                }
                None => {
                    st.finished = true;
                    if let Some(rest) = st.lines.finish() {
                        st.pending.push_back(rest);
                    }
                }
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
    #[serde(default)]
    size: u64,
}

/// A model installed on the server.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalModel {
    pub name: String,
    pub size_bytes: u64,
}

/// Client for the native Ollama endpoints.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a client for the configured server.
    ///
    /// Only the connect phase has a timeout; pulls may run for minutes.
    pub fn new(server: &ServerSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DocsageError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: server.native_base(),
        })
    }

    /// List models installed on the server.
    #[instrument(skip(self))]
    pub async fn list_models(&self) -> Result<Vec<LocalModel>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await?
            .error_for_status()?;

        let tags: TagsResponse = response.json().await?;
        debug!("Server reports {} models", tags.models.len());

        Ok(tags
            .models
            .into_iter()
            .map(|m| LocalModel {
                name: m.name,
                size_bytes: m.size,
            })
            .collect())
    }

    /// Start pulling `model` and stream its progress.
    #[instrument(skip(self))]
    pub async fn pull(&self, model: &str) -> Result<BoxStream<'static, Result<PullEvent>>> {
        let response = self
            .client
            .post(format!("{}/api/pull", self.base_url))
            .json(&serde_json::json!({ "model": model, "stream": true }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocsageError::ModelPull(format!("HTTP {}: {}", status, body.trim())));
        }

        Ok(decode_pull_stream(Box::pin(response.bytes_stream())).boxed())
    }
}
