// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
    Embedding,
}

// --- Provider types ---

/// A single chat message sent to a generative model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMessage {
    /// "user", "assistant", or "system".
    pub role: String,
    pub content: String,
}

impl ProviderMessage {
    /// A user-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// A request to a generative model provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    /// Model identifier (e.g. "gpt-4o-mini").
    pub model: String,
    /// Optional system prompt prepended by the provider.
    pub system_prompt: Option<String>,
    pub messages: Vec<ProviderMessage>,
    /// Sampling temperature. `None` leaves the provider default.
    pub temperature: Option<f32>,
    /// Output length cap. `None` leaves the provider default.
    pub max_tokens: Option<u32>,
    /// Whether the response should be streamed.
    pub stream: bool,
}

/// A complete (non-streamed) response from a provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub id: String,
    pub content: String,
    pub model: String,
    pub stop_reason: Option<String>,
    pub usage: TokenUsage,
}

/// Token accounting reported by a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Kind of event carried by a [`ProviderStreamChunk`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEventType {
    /// The response has started.
    MessageStart,
    /// A fragment of generated text.
    ContentBlockDelta,
    /// Response-level metadata (stop reason, usage).
    MessageDelta,
    /// The response is complete.
    MessageStop,
    /// The provider reported an error inside the stream.
    Error,
}

/// A single chunk from a streaming provider response.
#[derive(Debug, Clone)]
pub struct ProviderStreamChunk {
    pub event_type: StreamEventType,
    /// Text fragment for `ContentBlockDelta` events.
    pub text: Option<String>,
    pub usage: Option<TokenUsage>,
    /// Error description for `Error` events.
    pub error: Option<String>,
    pub stop_reason: Option<String>,
}

impl ProviderStreamChunk {
    /// A text delta chunk.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            event_type: StreamEventType::ContentBlockDelta,
            text: Some(text.into()),
            usage: None,
            error: None,
            stop_reason: None,
        }
    }

    /// A bare event with no payload.
    pub fn event(event_type: StreamEventType) -> Self {
        Self {
            event_type,
            text: None,
            usage: None,
            error: None,
            stop_reason: None,
        }
    }
}

// --- Embedding types ---

/// Input for an embedding adapter. A single text is a batch of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// Output from an embedding adapter, one vector per input text, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}
