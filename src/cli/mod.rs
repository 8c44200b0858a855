//! CLI module for docsage.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// docsage - question answering over reference pages with a local LLM
///
/// Fetches a fixed set of web pages, indexes them with embeddings from a local
/// Ollama server and answers questions from the closest page.
#[derive(Parser, Debug)]
#[command(name = "docsage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "DOCSAGE_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a question from the reference pages (interactive if no question is given)
    Ask {
        /// The question to ask
        question: Option<String>,

        /// Generation model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Maximum tokens in the answer
        #[arg(long)]
        max_tokens: Option<u32>,
    },

    /// Show the reference pages closest to a query
    Search {
        /// Search query
        query: String,

        /// Number of pages to return
        #[arg(short, default_value = "3")]
        k: usize,
    },

    /// Fetch the reference pages and show what was retrieved
    Sources,

    /// Start an interactive chat session with the model server
    Chat {
        /// Chat model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Download a model to the server
    Pull {
        /// Model name (e.g. llama3, all-minilm)
        model: String,
    },

    /// List models installed on the server
    Models,

    /// Start HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,
}
