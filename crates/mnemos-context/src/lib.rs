// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation context for Mnemos.
//!
//! Keeps the ordered history of user turns, assistant replies, and summaries,
//! bounded by summarizing older turns once the history grows too long.

pub mod compaction;
pub mod manager;
pub mod types;

pub use manager::ContextManager;
pub use types::{ContextEntry, Role, SummaryOutcome};
