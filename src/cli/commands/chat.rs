//! Interactive chat command.

use crate::chat::ChatSession;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(model: Option<String>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Server, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;

    let mut session = ChatSession::new(&settings.server, &settings.chat, &prompts)?;
    if let Some(model) = model {
        session = session.with_model(&model);
    }

    println!("\n{}", style(format!("docsage chat ({})", session.model())).bold().cyan());
    println!(
        "{}\n",
        style("Type your message, or 'exit' to quit. Use 'reset' to start a new conversation.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
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

        if input.eq_ignore_ascii_case("reset") || input.eq_ignore_ascii_case("clear") {
            session.reset();
            Output::info("Conversation reset.");
            continue;
        }

        print!("\n{} ", style("Assistant:").cyan().bold());
        stdout.flush()?;

        let result = session
            .send(input, |delta| {
                print!("{}", delta);
                let _ = io::stdout().flush();
            })
            .await;

        match result {
            Ok(_) => println!("\n"),
            Err(e) => {
                println!();
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
