// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval-augmented answering loop for Mnemos.
//!
//! [`Assistant`] owns the knowledge store and the conversation context.
//! Each question is answered by retrieving the nearest facts, adding the
//! recent context window, and streaming the model's reply back as growing
//! prefixes through an [`AnswerStream`].

pub mod answer;
pub mod assistant;
pub mod prompt;
pub mod shutdown;

pub use answer::{AnswerStream, ERROR_MARKER};
pub use assistant::{Assistant, HealthReport};
pub use prompt::{build_prompt, DEFAULT_PREAMBLE};
pub use shutdown::install_signal_handler;
