//! Models command implementation.

use crate::cli::output::format_size;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::ollama::OllamaClient;
use anyhow::Result;

/// Run the models command.
pub async fn run_models(settings: Settings) -> Result<()> {
    preflight::check(Operation::Server, &settings)?;

    let client = OllamaClient::new(&settings.server)?;

    match client.list_models().await {
        Ok(models) => {
            if models.is_empty() {
                Output::info("No models installed. Use 'docsage pull <model>' to add one.");
                return Ok(());
            }

            Output::header(&format!("Installed models ({})", models.len()));
            println!();
            for model in &models {
                let mut line = format!("{} ({})", model.name, format_size(model.size_bytes));
                if base_name(&model.name) == base_name(&settings.generation.model) {
                    line.push_str(" [generation]");
                }
                if base_name(&model.name) == base_name(&settings.embedding.model) {
                    line.push_str(" [embedding]");
                }
                Output::list_item(&line);
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list models: {}", e));
            Output::info(&format!("Is the server running at {}?", settings.server.host));
            return Err(e.into());
        }
    }

    Ok(())
}

/// Model name without a `:latest` tag.
fn base_name(name: &str) -> &str {
    name.strip_suffix(":latest").unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("llama3:latest"), "llama3");
        assert_eq!(base_name("llama3:8b"), "llama3:8b");
        assert_eq!(base_name("all-minilm"), "all-minilm");
    }
}
