// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemos shell` command implementation.
//!
//! Launches an interactive REPL with colored prompt, streaming output,
//! and readline history. Every line goes through the assistant, so
//! `add <fact>` stores knowledge and anything else is answered.

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use mnemos_config::MnemosConfig;
use mnemos_core::MnemosError;

use crate::output::print_answer;
use crate::runtime::open_assistant;

/// Shell-only commands, handled before anything reaches the assistant.
#[derive(Debug, PartialEq, Eq)]
enum ShellCommand {
    Quit,
    Clear,
    Facts,
    Help,
}

fn parse_command(line: &str) -> Option<ShellCommand> {
    match line {
        "/quit" | "/exit" => Some(ShellCommand::Quit),
        "/clear" => Some(ShellCommand::Clear),
        "/facts" => Some(ShellCommand::Facts),
        "/help" => Some(ShellCommand::Help),
        _ => None,
    }
}

fn print_help(prefix: &str) {
    println!("  {}<text>  store a fact", prefix.trim_end().yellow());
    println!("  {}   list stored facts", "/facts".yellow());
    println!("  {}   forget the conversation", "/clear".yellow());
    println!("  {}    leave the shell", "/quit".yellow());
}

/// Runs the `mnemos shell` interactive REPL.
pub async fn run_shell(config: MnemosConfig) -> Result<(), MnemosError> {
    let assistant = open_assistant(&config).await?;

    let mut rl = DefaultEditor::new()
        .map_err(|e| MnemosError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("{} shell", config.agent.name).bold().green());
    println!(
        "Type {} for commands, {} to exit.\n",
        "/help".yellow(),
        "/quit".yellow()
    );

    let prompt = format!("{}> ", config.agent.name.green());
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(&line);

                match parse_command(trimmed) {
                    Some(ShellCommand::Quit) => break,
                    Some(ShellCommand::Help) => print_help(&config.knowledge.command_prefix),
                    Some(ShellCommand::Facts) => {
                        for fact in assistant.knowledge().facts().await {
                            println!("{:>4}  {}", fact.id, fact.text);
                        }
                    }
                    Some(ShellCommand::Clear) => match assistant.context().clear().await {
                        Ok(()) => println!("{}", "context cleared".dimmed()),
                        Err(e) => eprintln!("{}: {e}", "error".red()),
                    },
                    None => {
                        // Errors are already printed as they stream.
                        let _ = print_answer(assistant.answer(trimmed)).await;
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    assistant.shutdown().await?;
    println!("{}", "goodbye".dimmed());
    Ok(())
}
