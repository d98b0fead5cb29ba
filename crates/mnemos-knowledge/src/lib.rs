// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge store for Mnemos.
//!
//! Facts are short texts embedded once at insertion time and searched by
//! nearest-neighbour distance. The store seeds itself with a few built-in
//! facts on first run and persists every addition.

pub mod embedder;
pub mod index;
pub mod store;
pub mod types;

pub use embedder::HashingEmbedder;
pub use index::FlatIndex;
pub use store::KnowledgeStore;
pub use types::{Fact, ScoredFact, SEED_FACTS};
