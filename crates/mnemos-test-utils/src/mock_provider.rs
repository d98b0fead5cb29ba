// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generative model provider for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with scripted replies, so the
//! answering loop and summarization can be exercised without network calls.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::{Mutex, Notify};

use mnemos_core::traits::{PluginAdapter, ProviderAdapter, ProviderStream};
use mnemos_core::types::{
    AdapterType, HealthStatus, ProviderRequest, ProviderResponse, ProviderStreamChunk,
    StreamEventType, TokenUsage,
};
use mnemos_core::MnemosError;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Whole text; streamed as a single delta.
    Text(String),
    /// Streamed as one delta per piece; `complete` joins them.
    Chunks(Vec<String>),
    /// Streams the pieces, then fails with `error`.
    FailAfter { chunks: Vec<String>, error: String },
    /// The request itself fails.
    Error(String),
    /// Streams the pieces, then never yields again.
    Stall(Vec<String>),
    /// Holds the request open until `gate` is notified, then replies with `text`.
    Gated { text: String, gate: Arc<Notify> },
}

/// A mock provider that returns scripted replies.
///
/// Replies are popped from a FIFO queue. When the queue is empty, the text
/// "mock response" is returned. Every request is recorded.
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty reply queue.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock provider pre-loaded with text replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(
                responses.into_iter().map(MockReply::Text).collect(),
            )),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a text reply.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.add_reply(MockReply::Text(text.into())).await;
    }

    /// Queue any scripted reply.
    pub async fn add_reply(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Every request received so far, in order.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    /// Number of non-streaming (`complete`) requests received.
    pub async fn complete_calls(&self) -> usize {
        self.requests.lock().await.iter().filter(|r| !r.stream).count()
    }

    async fn next_reply(&self, request: &ProviderRequest) -> MockReply {
        self.requests.lock().await.push(request.clone());
        let reply = self
            .replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockReply::Text("mock response".to_string()));
        match reply {
            MockReply::Gated { text, gate } => {
                gate.notified().await;
                MockReply::Text(text)
            }
            other => other,
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn usage() -> TokenUsage {
    TokenUsage {
        input_tokens: 10,
        output_tokens: 20,
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemosError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MnemosError> {
        let content = match self.next_reply(&request).await {
            MockReply::Text(text) | MockReply::Gated { text, .. } => text,
            MockReply::Chunks(chunks) | MockReply::Stall(chunks) => chunks.concat(),
            MockReply::FailAfter { error, .. } | MockReply::Error(error) => {
                return Err(MnemosError::provider(error));
            }
        };
        Ok(ProviderResponse {
            id: format!("mock-resp-{}", uuid::Uuid::new_v4()),
            content,
            model: request.model,
            stop_reason: Some("stop".to_string()),
            usage: usage(),
        })
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ProviderStream, MnemosError> {
        let (pieces, tail) = match self.next_reply(&request).await {
            MockReply::Text(text) | MockReply::Gated { text, .. } => (vec![text], Tail::Finish),
            MockReply::Chunks(chunks) => (chunks, Tail::Finish),
            MockReply::FailAfter { chunks, error } => (chunks, Tail::Fail(error)),
            MockReply::Error(error) => return Err(MnemosError::provider(error)),
            MockReply::Stall(chunks) => (chunks, Tail::Stall),
        };

        // MessageStart -> ContentBlockDelta* -> (MessageDelta -> MessageStop | error | silence)
        let mut chunks = vec![Ok(ProviderStreamChunk::event(StreamEventType::MessageStart))];
        chunks.extend(pieces.into_iter().map(|p| Ok(ProviderStreamChunk::text(p))));

        let head = stream::iter(chunks);
        let stream: ProviderStream = match tail {
            Tail::Finish => {
                let finish = ProviderStreamChunk {
                    usage: Some(usage()),
                    stop_reason: Some("stop".to_string()),
                    ..ProviderStreamChunk::event(StreamEventType::MessageDelta)
                };
                Box::pin(head.chain(stream::iter(vec![
                    Ok(finish),
                    Ok(ProviderStreamChunk::event(StreamEventType::MessageStop)),
                ])))
            }
            Tail::Fail(error) => {
                Box::pin(head.chain(stream::once(async move {
                    Err(MnemosError::provider(error))
                })))
            }
            Tail::Stall => Box::pin(head.chain(stream::pending::<
                Result<ProviderStreamChunk, MnemosError>,
            >())),
        };
        Ok(stream)
    }
}

enum Tail {
    Finish,
    Fail(String),
    Stall,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemos_core::types::ProviderMessage;

    fn request(stream: bool) -> ProviderRequest {
        ProviderRequest {
            model: "test-model".to_string(),
            system_prompt: None,
            messages: vec![ProviderMessage::user("hi")],
            temperature: None,
            max_tokens: None,
            stream,
        }
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::new();
        let resp = provider.complete(request(false)).await.unwrap();
        assert_eq!(resp.content, "mock response");
        assert_eq!(resp.model, "test-model");
    }

    #[tokio::test]
    async fn queued_responses_returned_in_order() {
        let provider = MockProvider::with_responses(vec!["first".into(), "second".into()]);
        assert_eq!(provider.complete(request(false)).await.unwrap().content, "first");
        assert_eq!(provider.complete(request(false)).await.unwrap().content, "second");
        assert_eq!(
            provider.complete(request(false)).await.unwrap().content,
            "mock response"
        );
        assert_eq!(provider.complete_calls().await, 3);
    }

    #[tokio::test]
    async fn stream_produces_correct_event_sequence() {
        let provider = MockProvider::new();
        provider
            .add_reply(MockReply::Chunks(vec!["Hel".into(), "lo".into()]))
            .await;

        let events: Vec<_> = provider
            .stream(request(true))
            .await
            .unwrap()
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .map(|c| c.unwrap())
            .collect();

        assert_eq!(events.len(), 5);
        assert_eq!(events[0].event_type, StreamEventType::MessageStart);
        assert_eq!(events[1].text.as_deref(), Some("Hel"));
        assert_eq!(events[2].text.as_deref(), Some("lo"));
        assert_eq!(events[3].event_type, StreamEventType::MessageDelta);
        assert_eq!(events[3].stop_reason.as_deref(), Some("stop"));
        assert_eq!(events[4].event_type, StreamEventType::MessageStop);
    }

    #[tokio::test]
    async fn fail_after_ends_with_an_error() {
        let provider = MockProvider::new();
        provider
            .add_reply(MockReply::FailAfter {
                chunks: vec!["Here is the f".into()],
                error: "connection reset".into(),
            })
            .await;

        let items: Vec<_> = provider.stream(request(true)).await.unwrap().collect().await;
        assert_eq!(items.len(), 3);
        assert_eq!(
            items[1].as_ref().unwrap().text.as_deref(),
            Some("Here is the f")
        );
        assert!(items[2].is_err());
    }

    #[tokio::test]
    async fn error_reply_fails_the_request() {
        let provider = MockProvider::new();
        provider.add_reply(MockReply::Error("quota".into())).await;
        assert!(provider.stream(request(true)).await.is_err());
        assert_eq!(provider.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn gated_reply_waits_for_release() {
        let provider = Arc::new(MockProvider::new());
        let gate = Arc::new(Notify::new());
        provider
            .add_reply(MockReply::Gated {
                text: "released".into(),
                gate: gate.clone(),
            })
            .await;

        let pending = tokio::spawn({
            let provider = provider.clone();
            async move { provider.complete(request(false)).await }
        });
        while provider.complete_calls().await == 0 {
            tokio::task::yield_now().await;
        }
        assert!(!pending.is_finished());

        gate.notify_one();
        assert_eq!(pending.await.unwrap().unwrap().content, "released");
    }
}
