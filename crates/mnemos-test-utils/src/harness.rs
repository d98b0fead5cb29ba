// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete assistant with mock adapters and a
//! temp data directory. `ask()` drives the whole answering pipeline.

use std::path::Path;
use std::sync::Arc;

use futures::StreamExt;

use mnemos_agent::Assistant;
use mnemos_config::model::{ContextConfig, StorageConfig};
use mnemos_config::MnemosConfig;
use mnemos_core::{EmbeddingAdapter, MnemosError, ProviderAdapter};

use crate::mock_embedder::MockEmbedder;
use crate::mock_provider::{MockProvider, MockReply};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<MockReply>,
    dimensions: usize,
    context: ContextConfig,
    request_timeout_secs: Option<u64>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            dimensions: 64,
            context: ContextConfig::default(),
            request_timeout_secs: None,
        }
    }

    /// Queue text replies on the mock provider.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.replies.extend(responses.into_iter().map(MockReply::Text));
        self
    }

    /// Queue scripted replies on the mock provider.
    pub fn with_replies(mut self, replies: Vec<MockReply>) -> Self {
        self.replies.extend(replies);
        self
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Set the context memory and summary limits.
    pub fn with_limits(mut self, memory_limit: usize, summary_limit: usize) -> Self {
        self.context.memory_limit = memory_limit;
        self.context.summary_limit = summary_limit;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = Some(secs);
        self
    }

    /// Build the test harness, creating the data directory and the assistant.
    pub async fn build(self) -> Result<TestHarness, MnemosError> {
        let temp_dir = tempfile::TempDir::new().map_err(MnemosError::storage)?;

        let mut config = MnemosConfig {
            context: self.context,
            storage: StorageConfig::in_dir(temp_dir.path().to_string_lossy()),
            ..MnemosConfig::default()
        };
        config.embedding.dimensions = self.dimensions;
        if let Some(secs) = self.request_timeout_secs {
            config.openai.request_timeout_secs = secs;
        }

        let provider = Arc::new(MockProvider::new());
        for reply in self.replies {
            provider.add_reply(reply).await;
        }
        let embedder = Arc::new(MockEmbedder::new(self.dimensions));

        let assistant = Assistant::initialize(
            &config,
            provider.clone() as Arc<dyn ProviderAdapter>,
            embedder.clone() as Arc<dyn EmbeddingAdapter>,
        )
        .await?;

        Ok(TestHarness {
            provider,
            embedder,
            assistant,
            config,
            temp_dir,
        })
    }
}

/// A complete test environment with mock adapters and temp storage.
pub struct TestHarness {
    /// The mock generative model.
    pub provider: Arc<MockProvider>,
    /// The mock embedding model.
    pub embedder: Arc<MockEmbedder>,
    /// The assistant under test.
    pub assistant: Assistant,
    /// Configuration the assistant was built from.
    pub config: MnemosConfig,
    /// Temp directory kept alive for cleanup on drop.
    temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Answer `input` and return every streamed item.
    pub async fn ask(&self, input: &str) -> Vec<String> {
        self.assistant.answer(input).collect().await
    }

    /// Build a second assistant over the same data directory and adapters,
    /// as a restarted process would.
    pub async fn reopen(&self) -> Result<Assistant, MnemosError> {
        Assistant::initialize(
            &self.config,
            self.provider.clone() as Arc<dyn ProviderAdapter>,
            self.embedder.clone() as Arc<dyn EmbeddingAdapter>,
        )
        .await
    }

    pub fn data_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Queue a text reply on the mock provider.
    pub async fn add_provider_response(&self, text: impl Into<String>) {
        self.provider.add_response(text).await;
    }
}
