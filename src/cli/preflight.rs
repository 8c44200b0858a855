//! Pre-flight checks before expensive operations.
//!
//! Validates configuration before starting operations that would otherwise
//! fail midway, e.g. after fetching every reference page.

use crate::config::{parse_http_url, Settings};
use crate::error::{DocsageError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Building the corpus needs reference URLs and a model server.
    Corpus,
    /// Chat, pull and model listing only need the model server.
    Server,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Corpus => settings.validate(),
        Operation::Server => {
            parse_http_url(&settings.server.host)
                .map_err(|e| DocsageError::Config(format!("server.host: {}", e)))?;
            Ok(())
        }
    }
}
