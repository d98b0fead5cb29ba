// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mnemos - retrieval-augmented conversational memory for coding assistants.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod output;
mod runtime;
mod serve;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mnemos_config::MnemosConfig;
use mnemos_core::MnemosError;

/// Mnemos - retrieval-augmented conversational memory.
#[derive(Parser, Debug)]
#[command(name = "mnemos", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Launch an interactive REPL session.
    Shell,
    /// Answer one question and exit.
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Store a fact in the knowledge base.
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// List stored facts, or the ones closest to a query.
    Facts {
        #[arg(long)]
        search: Option<String>,
        /// Number of search results (defaults to knowledge.top_k).
        #[arg(long, short)]
        k: Option<usize>,
    },
    /// Show the conversation context.
    Context {
        /// Drop every entry instead.
        #[arg(long)]
        clear: bool,
    },
    /// Print the effective configuration.
    Config,
}

fn load_config(path: Option<&std::path::Path>) -> MnemosConfig {
    let result = match path {
        Some(path) => mnemos_config::load_and_validate_path(path),
        None => mnemos_config::load_and_validate(),
    };
    match result {
        Ok(config) => config,
        Err(errors) => {
            mnemos_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

async fn run(command: Commands, config: MnemosConfig) -> Result<(), MnemosError> {
    if !matches!(command, Commands::Config) {
        runtime::init_tracing(&config.agent.log_level);
    }

    match command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Shell => shell::run_shell(config).await,
        Commands::Ask { question } => commands::run_ask(&config, &question.join(" ")).await,
        Commands::Add { text } => commands::run_add(&config, &text.join(" ")).await,
        Commands::Facts { search, k } => commands::run_facts(&config, search.as_deref(), k).await,
        Commands::Context { clear } => commands::run_context(&config, clear).await,
        Commands::Config => commands::run_config(&config),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let Some(command) = cli.command else {
        println!("mnemos: use --help for available commands");
        return;
    };

    if let Err(e) = run(command, config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
