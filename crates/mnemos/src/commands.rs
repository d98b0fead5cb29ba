// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommands: `ask`, `add`, `facts`, `context`, and `config`.

use colored::Colorize;

use mnemos_agent::Assistant;
use mnemos_config::MnemosConfig;
use mnemos_core::MnemosError;

use crate::output::print_answer;
use crate::runtime::open_assistant;

/// Flushes and shuts the assistant down after `result`, keeping the first error.
async fn finish(assistant: Assistant, result: Result<(), MnemosError>) -> Result<(), MnemosError> {
    let shutdown = assistant.shutdown().await;
    result.and(shutdown)
}

pub async fn run_ask(config: &MnemosConfig, question: &str) -> Result<(), MnemosError> {
    let assistant = open_assistant(config).await?;
    let result = print_answer(assistant.answer(question))
        .await
        .map(|_| ())
        .map_err(MnemosError::provider);
    finish(assistant, result).await
}

pub async fn run_add(config: &MnemosConfig, text: &str) -> Result<(), MnemosError> {
    let assistant = open_assistant(config).await?;
    let result = assistant.add_knowledge(text).await.map(|fact| {
        println!("{} #{}: {}", "added fact".green(), fact.id, fact.text);
    });
    finish(assistant, result).await
}

pub async fn run_facts(
    config: &MnemosConfig,
    search: Option<&str>,
    k: Option<usize>,
) -> Result<(), MnemosError> {
    let assistant = open_assistant(config).await?;
    let result = match search {
        Some(query) => {
            let k = k.unwrap_or(config.knowledge.top_k);
            assistant.search(query, k).await.map(|hits| {
                for hit in hits {
                    println!(
                        "{:>4}  {}  {}",
                        hit.fact.id,
                        format!("{:.4}", hit.distance).dimmed(),
                        hit.fact.text
                    );
                }
            })
        }
        None => {
            for fact in assistant.knowledge().facts().await {
                println!("{:>4}  {}", fact.id, fact.text);
            }
            Ok(())
        }
    };
    finish(assistant, result).await
}

pub async fn run_context(config: &MnemosConfig, clear: bool) -> Result<(), MnemosError> {
    let assistant = open_assistant(config).await?;
    let context = assistant.context();
    let result = if clear {
        let dropped = context.len().await;
        context.clear().await.map(|()| {
            println!("cleared {dropped} context entries");
        })
    } else {
        for entry in context.entries().await {
            println!("{} {}", format!("[{}]", entry.role).cyan(), entry.content);
        }
        Ok(())
    };
    finish(assistant, result).await
}

/// The effective configuration as TOML, with the API key masked.
fn render_config(config: &MnemosConfig) -> Result<String, MnemosError> {
    let mut shown = config.clone();
    if shown.openai.api_key.is_some() {
        shown.openai.api_key = Some("********".to_string());
    }
    toml::to_string_pretty(&shown)
        .map_err(|e| MnemosError::Internal(format!("failed to render config: {e}")))
}

pub fn run_config(config: &MnemosConfig) -> Result<(), MnemosError> {
    print!("{}", render_config(config)?);
    Ok(())
}
