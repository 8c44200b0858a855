//! Ask command implementation.

use super::pipeline::load_pipeline;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::DocsageError;
use crate::orchestrator::{Answer, Orchestrator};
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the ask command.
pub async fn run_ask(
    question: Option<&str>,
    model: Option<String>,
    max_tokens: Option<u32>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(model) = model {
        settings.generation.model = model;
    }
    if let Some(max_tokens) = max_tokens {
        settings.generation.max_tokens = max_tokens;
    }

    let orchestrator = load_pipeline(&settings).await?;

    match question {
        Some(question) => {
            let answer = answer_one(&orchestrator, question).await?;
            print_answer(&answer);
            Ok(())
        }
        None => interactive(&orchestrator).await,
    }
}

async fn answer_one(orchestrator: &Orchestrator, question: &str) -> Result<Answer> {
    let spinner = Output::spinner("Generating answer...");
    let result = orchestrator.ask(question).await;
    spinner.finish_and_clear();

    match result {
        Ok(answer) => Ok(answer),
        Err(DocsageError::EmptyCorpus) => {
            Output::error("Not ready: no reference pages were fetched.");
            Err(DocsageError::EmptyCorpus.into())
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            Err(e.into())
        }
    }
}

fn print_answer(answer: &Answer) {
    println!("\n{}\n", answer.text);
    Output::kv("Source", &answer.source.url);
    Output::kv("Distance", &format!("{:.4}", answer.source.distance));
}

async fn interactive(orchestrator: &Orchestrator) -> Result<()> {
    println!(
        "\n{}\n",
        style("Ask a question about the reference pages, or 'exit' to quit.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("Question:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        // A failed question leaves the pipeline ready for the next one.
        if let Ok(answer) = answer_one(orchestrator, input).await {
            print_answer(&answer);
        }
    }

    Ok(())
}
