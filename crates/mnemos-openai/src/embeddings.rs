// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI embeddings adapter using the `/v1/embeddings` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use mnemos_core::traits::{EmbeddingAdapter, PluginAdapter};
use mnemos_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use mnemos_core::MnemosError;

use crate::client::has_version_suffix;
use crate::types::{EmbeddingRequest, EmbeddingResponse};

fn embeddings_endpoint(base_url: &str) -> String {
    let normalized = base_url.trim_end_matches('/');
    if normalized.ends_with("/embeddings") {
        return normalized.to_string();
    }
    if has_version_suffix(normalized) {
        return format!("{normalized}/embeddings");
    }
    format!("{normalized}/v1/embeddings")
}

/// Only the `text-embedding-3` family accepts a requested output size.
fn supports_dimensions(model: &str) -> bool {
    model.starts_with("text-embedding-3")
}

pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: SecretString,
    endpoint: String,
    model: String,
    dims: usize,
}

impl OpenAiEmbedder {
    pub fn new(
        api_key: SecretString,
        base_url: &str,
        model: impl Into<String>,
        dims: usize,
        timeout: Duration,
    ) -> Result<Self, MnemosError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MnemosError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            api_key,
            endpoint: embeddings_endpoint(base_url),
            model: model.into(),
            dims,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl PluginAdapter for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai-embeddings"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemosError> {
        debug!("OpenAI embedder shutting down");
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for OpenAiEmbedder {
    fn dimensions(&self) -> usize {
        self.dims
    }

    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemosError> {
        let req = EmbeddingRequest {
            model: self.model.clone(),
            input: input.texts,
            dimensions: supports_dimensions(&self.model).then_some(self.dims),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&req)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| MnemosError::Provider {
                message: format!("embedding request failed: {e}"),
                source: Some(Box::new(e)),
            })?
            .json::<EmbeddingResponse>()
            .await
            .map_err(|e| MnemosError::Provider {
                message: format!("failed to parse embedding response: {e}"),
                source: Some(Box::new(e)),
            })?;

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        let embeddings: Vec<Vec<f32>> = data.into_iter().map(|d| d.embedding).collect();
        debug!(count = embeddings.len(), model = %self.model, "embeddings received");

        Ok(EmbeddingOutput {
            embeddings,
            dimensions: self.dims,
        })
    }
}
