//! Search command implementation.

use super::pipeline::load_pipeline;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(query: &str, k: usize, settings: Settings) -> Result<()> {
    let orchestrator = load_pipeline(&settings).await?;

    let spinner = Output::spinner("Searching...");
    let results = orchestrator.retrieve(query, k).await;
    spinner.finish_and_clear();

    match results {
        Ok(hits) => {
            if hits.is_empty() {
                Output::warning("No results.");
            } else {
                Output::success(&format!("Found {} results", hits.len()));
                for hit in &hits {
                    Output::search_result(
                        hit.document.position,
                        &hit.document.url,
                        hit.distance,
                        &hit.document.raw_text,
                    );
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
