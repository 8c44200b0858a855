//! Shared corpus startup for commands that query the index.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, PipelineState};
use anyhow::Result;

/// Fetch and index the corpus, reporting progress and skipped pages.
pub(super) async fn load_pipeline(settings: &Settings) -> Result<Orchestrator> {
    if let Err(e) = preflight::check(Operation::Corpus, settings) {
        Output::error(&format!("{}", e));
        Output::info(&format!(
            "Check the configuration at {}",
            Settings::default_config_path().display()
        ));
        return Err(e.into());
    }

    let spinner = Output::spinner(&format!(
        "Fetching and indexing {} reference pages...",
        settings.corpus.urls.len()
    ));
    let result = Orchestrator::from_settings(settings).await;
    spinner.finish_and_clear();

    let orchestrator = result?;

    for skipped in orchestrator.skipped() {
        Output::warning(&format!("Skipped {}: {}", skipped.url, skipped.reason));
    }

    match orchestrator.state() {
        PipelineState::Ready => Output::success(&format!(
            "Indexed {} of {} pages",
            orchestrator.documents().len(),
            settings.corpus.urls.len()
        )),
        PipelineState::Degraded => {
            Output::warning("No reference page could be fetched; questions cannot be answered.")
        }
    }

    Ok(orchestrator)
}
