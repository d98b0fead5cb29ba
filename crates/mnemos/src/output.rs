// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal rendering of streamed answers.

use std::io::Write;

use colored::Colorize;
use futures::StreamExt;

use mnemos_agent::{AnswerStream, ERROR_MARKER};

/// What a new answer item adds to the terminal.
#[derive(Debug, PartialEq, Eq)]
pub enum Rendered<'a> {
    /// Text to append after what is already shown.
    Delta(&'a str),
    /// A failure message.
    Error(&'a str),
}

/// Compares `item` against the text already `shown`.
///
/// Items normally extend the previous one; anything else is the error item.
pub fn render<'a>(shown: &str, item: &'a str) -> Rendered<'a> {
    if let Some(delta) = item.strip_prefix(shown)
        && !(shown.is_empty() && item.starts_with(ERROR_MARKER))
    {
        return Rendered::Delta(delta);
    }
    Rendered::Error(
        item.strip_prefix(ERROR_MARKER)
            .map(str::trim)
            .unwrap_or(item),
    )
}

/// Prints `answer` to stdout as it streams.
///
/// Returns the final text, or the error message if the answer failed.
pub async fn print_answer(mut answer: AnswerStream) -> Result<String, String> {
    let mut shown = String::new();
    let mut failure = None;
    let mut stdout = std::io::stdout();

    while let Some(item) = answer.next().await {
        match render(&shown, &item) {
            Rendered::Delta(delta) => {
                print!("{delta}");
                let _ = stdout.flush();
                shown.push_str(delta);
            }
            Rendered::Error(message) => {
                if !shown.is_empty() {
                    println!();
                }
                eprintln!("{}: {message}", "error".red());
                failure = Some(message.to_string());
            }
        }
    }
    if !shown.is_empty() {
        println!();
    }

    match failure {
        Some(message) => Err(message),
        None => Ok(shown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growing_items_render_as_deltas() {
        assert_eq!(render("", "Here"), Rendered::Delta("Here"));
        assert_eq!(render("Here", "Here is"), Rendered::Delta(" is"));
    }

    #[test]
    fn error_after_partial_text() {
        assert_eq!(
            render("Here is the f", "[ERROR] provider error: reset"),
            Rendered::Error("provider error: reset")
        );
    }

    #[test]
    fn error_as_first_item() {
        assert_eq!(
            render("", "[ERROR] operation timed out after 30s"),
            Rendered::Error("operation timed out after 30s")
        );
    }
}
