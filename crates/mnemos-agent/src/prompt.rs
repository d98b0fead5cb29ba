// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Answer prompt assembly.

use mnemos_context::ContextEntry;
use mnemos_knowledge::ScoredFact;

/// Instruction line used when `agent.system_prompt` is not set.
pub const DEFAULT_PREAMBLE: &str = "You are a highly capable coding assistant AI. \
Provide working code, explanations, optimizations, and emojis.";

/// Builds the answer prompt.
///
/// Facts appear in ranking order and context entries in conversation order,
/// one per line.
pub fn build_prompt(
    preamble: &str,
    question: &str,
    facts: &[ScoredFact],
    context: &[ContextEntry],
) -> String {
    let facts = facts
        .iter()
        .map(|f| f.fact.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let context = context
        .iter()
        .map(|e| e.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    format!("{preamble}\n\nQuestion: {question}\nFacts:\n{facts}\nContext:\n{context}\n\nAnswer:")
}
