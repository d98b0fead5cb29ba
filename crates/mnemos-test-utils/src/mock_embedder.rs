// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding adapter that counts calls and can be switched to fail.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use mnemos_core::traits::{EmbeddingAdapter, PluginAdapter};
use mnemos_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use mnemos_core::MnemosError;
use mnemos_knowledge::HashingEmbedder;

/// Deterministic embedder backed by feature hashing.
pub struct MockEmbedder {
    inner: HashingEmbedder,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl MockEmbedder {
    /// # Panics
    ///
    /// Panics when `dimensions` is zero.
    pub fn new(dimensions: usize) -> Self {
        Self {
            inner: HashingEmbedder::new(dimensions).expect("mock embedder needs dimensions > 0"),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Number of `embed` calls so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make subsequent `embed` calls fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        if self.failing.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("mock embedder set to fail".into()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), MnemosError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemosError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(MnemosError::provider("mock embedding failure"));
        }
        self.inner.embed(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_calls_and_fails_on_demand() {
        let embedder = MockEmbedder::new(8);
        let input = EmbeddingInput {
            texts: vec!["a".into()],
        };
        assert!(embedder.embed(input.clone()).await.is_ok());

        embedder.set_failing(true);
        assert!(embedder.embed(input).await.unwrap_err().is_provider());
        assert_eq!(embedder.calls(), 2);
        assert!(matches!(
            embedder.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }
}
