//! Answer generation from a question and a retrieved passage.

mod openai;

pub use openai::ChatGenerator;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for text completion conditioned on a context passage.
///
/// Calls may take seconds. Output is generally non-deterministic.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce an answer to `query` using `context`, limited to `max_tokens`.
    async fn generate(&self, query: &str, context: &str, max_tokens: u32) -> Result<String>;
}

/// Cut `context` to at most `max_chars` characters.
pub fn truncate_context(context: &str, max_chars: usize) -> &str {
    match context.char_indices().nth(max_chars) {
        Some((byte_offset, _)) => &context[..byte_offset],
        None => context,
    }
}
