// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge domain types.

use serde::{Deserialize, Serialize};

/// Facts written to a brand-new store, in id order.
pub const SEED_FACTS: [&str; 4] = [
    "Python programming and debugging tips.",
    "How to fix common errors in code.",
    "General computer troubleshooting steps.",
    "AI, machine learning, and coding best practices.",
];

/// A stored piece of knowledge. Ids are positions: the first fact is 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    pub id: usize,
    pub text: String,
}

/// A fact returned by search, with its distance to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredFact {
    pub fact: Fact,
    /// Squared Euclidean distance; smaller is closer.
    pub distance: f32,
}
