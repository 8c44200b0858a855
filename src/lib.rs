//! docsage - question answering over reference pages with a local LLM
//!
//! A local-first CLI tool that fetches a fixed list of web pages, indexes them
//! with embeddings from a local Ollama server, and answers questions by
//! handing the closest page to a text-completion model.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management and prompt templates
//! - `corpus` - Reference page fetching and paragraph extraction
//! - `embedding` - Embedding generation
//! - `index` - Exact nearest-neighbor index over embeddings
//! - `generation` - Answer generation from a question and a passage
//! - `orchestrator` - Retrieval pipeline coordination
//! - `chat` - Multi-turn streaming chat with the model server
//! - `ollama` - Model listing and pulling on the native Ollama API
//!
//! # Example
//!
//! ```rust,no_run
//! use docsage::config::Settings;
//! use docsage::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::from_settings(&settings).await?;
//!
//!     let answer = orchestrator.ask("What replaces javax.* in Spring Boot 3?").await?;
//!     println!("{}\n(source: {})", answer.text, answer.source.url);
//!
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod ollama;
pub mod openai;
pub mod orchestrator;

pub use error::{DocsageError, Result};
