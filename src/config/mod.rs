//! Configuration module for docsage.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{ChatPrompts, Prompts, RagPrompts};
pub use settings::{
    parse_http_url, ChatSettings, CorpusSettings, EmbeddingSettings, GeneralSettings,
    GenerationSettings, PromptSettings, ServerSettings, Settings,
};
