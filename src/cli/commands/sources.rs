//! Sources command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::corpus::{DocumentSource, HttpSource};
use anyhow::Result;

/// Run the sources command: fetch the corpus without embedding it.
pub async fn run_sources(settings: Settings) -> Result<()> {
    preflight::check(Operation::Corpus, &settings)?;

    let source = HttpSource::new(&settings.corpus)?;

    let spinner = Output::spinner(&format!(
        "Fetching {} reference pages...",
        settings.corpus.urls.len()
    ));
    let report = source.fetch(&settings.corpus.urls).await;
    spinner.finish_and_clear();

    Output::header(&format!("Reference pages ({})", report.documents.len()));
    println!();
    for doc in &report.documents {
        Output::document_info(doc.position, &doc.url, doc.char_count());
    }

    if !report.skipped.is_empty() {
        Output::header(&format!("Skipped ({})", report.skipped.len()));
        println!();
        for skipped in &report.skipped {
            Output::list_item(&format!("{} - {}", skipped.url, skipped.reason));
        }
    }

    let total_chars: usize = report.documents.iter().map(|d| d.char_count()).sum();
    println!();
    Output::kv("Fetched", &format!("{} of {}", report.documents.len(), settings.corpus.urls.len()));
    Output::kv("Total characters", &total_chars.to_string());

    Ok(())
}
