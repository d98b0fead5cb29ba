// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for vector embedding generation.

use async_trait::async_trait;

use crate::error::MnemosError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{EmbeddingInput, EmbeddingOutput};

/// Adapter for turning text into fixed-dimension vectors.
///
/// Implementations must be deterministic for a given model: the same text
/// always maps to the same vector, and every vector has `dimensions()` entries.
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    /// Dimension of every vector this adapter produces.
    fn dimensions(&self) -> usize;

    /// Generates one embedding per input text, preserving order.
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemosError>;
}
