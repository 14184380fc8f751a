// SPDX-FileCopyrightText: 2026 Haggle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Haggle - marketplace chat from the terminal.
//!
//! This is the binary entry point for the Haggle chat client.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod context;
mod shell;
mod status;

/// Haggle - marketplace chat from the terminal.
#[derive(Parser, Debug)]
#[command(name = "haggle", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the unread badge and the conversation list.
    Status {
        /// Restrict to one conversation kind.
        #[arg(long, default_value = "all")]
        filter: String,
    },
    /// Open a conversation in an interactive shell.
    Shell {
        /// Conversation id to open.
        chat_id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match haggle_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            haggle_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.client.log_level.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Some(Commands::Status { filter }) => status::run_status(&config, &filter).await,
        Some(Commands::Shell { chat_id }) => shell::run_shell(&config, &chat_id).await,
        None => {
            println!("haggle: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
