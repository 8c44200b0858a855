//! Pull command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::ollama::{OllamaClient, PullEvent};
use anyhow::Result;
use futures::StreamExt;

/// Run the pull command.
pub async fn run_pull(model: &str, settings: Settings) -> Result<()> {
    preflight::check(Operation::Server, &settings)?;

    let client = OllamaClient::new(&settings.server)?;
    let mut events = match client.pull(model).await {
        Ok(events) => events,
        Err(e) => {
            Output::error(&format!("Failed to pull model: {}", e));
            return Err(e.into());
        }
    };

    let bar = Output::progress_bar(100, &format!("Pulling {}", model));

    while let Some(event) = events.next().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                bar.finish_and_clear();
                Output::error(&format!("Error pulling the model: {}", e));
                return Err(e.into());
            }
        };

        if let Some(percent) = event.percent() {
            bar.set_position(percent as u64);
        }

        match event {
            PullEvent::Success => {
                bar.finish_and_clear();
                Output::success(&format!("Model {} pulled successfully!", model));
                return Ok(());
            }
            PullEvent::Progress { status, .. } | PullEvent::Status(status) => {
                bar.set_message(status);
            }
        }
    }

    bar.finish_and_clear();
    Output::warning("Server closed the stream before reporting success.");
    Ok(())
}
