//! Error types for docsage.

use thiserror::Error;

/// Library-level error type for docsage operations.
#[derive(Error, Debug)]
pub enum DocsageError {
    #[error("Failed to fetch {url}: {reason}")]
    FetchFailure { url: String, reason: String },

    #[error("No documents available: the corpus is empty, so there is nothing to search")]
    EmptyCorpus,

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Cannot search an empty index")]
    EmptyIndex,

    #[error("Answer generation failed: {0}")]
    GenerationFailure(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model pull failed: {0}")]
    ModelPull(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("Model server error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for docsage operations.
pub type Result<T> = std::result::Result<T, DocsageError>;
