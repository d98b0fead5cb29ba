// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible adapters for Mnemos.
//!
//! [`OpenAiProvider`] implements `ProviderAdapter` over the chat completions
//! endpoint (full and SSE-streamed responses); [`OpenAiEmbedder`] implements
//! `EmbeddingAdapter` over the embeddings endpoint. Any server speaking the
//! same protocol works by pointing `openai.base_url` at it.

pub mod client;
pub mod embeddings;
pub mod sse;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::StreamExt;
use secrecy::SecretString;
use tracing::{debug, info};

use mnemos_config::MnemosConfig;
use mnemos_core::traits::{PluginAdapter, ProviderAdapter, ProviderStream};
use mnemos_core::types::{
    AdapterType, HealthStatus, ProviderRequest, ProviderResponse, ProviderStreamChunk,
    StreamEventType, TokenUsage,
};
use mnemos_core::MnemosError;

pub use crate::client::OpenAiClient;
pub use crate::embeddings::OpenAiEmbedder;

use crate::sse::StreamEvent;
use crate::types::{ChatMessage, ChatRequest, ChatUsage};

/// Chat completions provider.
pub struct OpenAiProvider {
    client: OpenAiClient,
}

impl OpenAiProvider {
    /// Builds the provider from `openai` settings; fails when no API key is available.
    pub fn new(config: &MnemosConfig) -> Result<Self, MnemosError> {
        let api_key = resolve_api_key(&config.openai.api_key)?;
        let client = OpenAiClient::new(
            api_key,
            &config.openai.base_url,
            Duration::from_secs(config.openai.request_timeout_secs),
        )?;

        info!(
            model = config.openai.chat_model,
            endpoint = client.endpoint(),
            "OpenAI provider initialized"
        );

        Ok(Self { client })
    }

    #[cfg(test)]
    fn with_client(client: OpenAiClient) -> Self {
        Self { client }
    }

    /// Converts a provider request, placing any system prompt first.
    fn to_chat_request(&self, request: &ProviderRequest) -> ChatRequest {
        let system = request.system_prompt.clone().filter(|s| !s.is_empty());

        let messages = system
            .map(|content| ChatMessage {
                role: "system".to_string(),
                content,
            })
            .into_iter()
            .chain(request.messages.iter().map(|m| ChatMessage {
                role: m.role.clone(),
                content: m.content.clone(),
            }))
            .collect();

        ChatRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: request.stream,
        }
    }
}

/// Builds the embedder from `embedding` and `openai` settings.
pub fn embedder_from_config(config: &MnemosConfig) -> Result<OpenAiEmbedder, MnemosError> {
    let api_key = resolve_api_key(&config.openai.api_key)?;
    let embedder = OpenAiEmbedder::new(
        api_key,
        &config.openai.base_url,
        config.embedding.model.clone(),
        config.embedding.dimensions,
        Duration::from_secs(config.openai.request_timeout_secs),
    )?;
    info!(
        model = config.embedding.model,
        dimensions = config.embedding.dimensions,
        "OpenAI embedder initialized"
    );
    Ok(embedder)
}

fn to_usage(usage: ChatUsage) -> TokenUsage {
    TokenUsage {
        input_tokens: usage.prompt_tokens,
        output_tokens: usage.completion_tokens,
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
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
        debug!("OpenAI provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, MnemosError> {
        let chat_request = self.to_chat_request(&request);
        let response = self.client.complete_chat(&chat_request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| MnemosError::provider("response contained no choices"))?;

        Ok(ProviderResponse {
            id: response.id,
            content: choice.message.content.unwrap_or_default(),
            model: response.model,
            stop_reason: choice.finish_reason,
            usage: response.usage.map(to_usage).unwrap_or_default(),
        })
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ProviderStream, MnemosError> {
        let chat_request = self.to_chat_request(&request);
        let event_stream = self.client.stream_chat(&chat_request).await?;

        let chunk_stream = event_stream.filter_map(|result| async move {
            match result {
                Ok(event) => map_stream_event(event),
                Err(e) => Some(Err(e)),
            }
        });

        Ok(Box::pin(chunk_stream))
    }
}

/// Text deltas become `ContentBlockDelta`, finish reasons and usage become
/// `MessageDelta`, and `[DONE]` becomes `MessageStop`. Empty deltas are dropped.
fn map_stream_event(event: StreamEvent) -> Option<Result<ProviderStreamChunk, MnemosError>> {
    match event {
        StreamEvent::Done => Some(Ok(ProviderStreamChunk::event(StreamEventType::MessageStop))),
        StreamEvent::Chunk(chunk) => {
            let usage = chunk.usage.map(to_usage);
            let choice = chunk.choices.into_iter().next();
            let (text, stop_reason) = match choice {
                Some(c) => (c.delta.content.filter(|t| !t.is_empty()), c.finish_reason),
                None => (None, None),
            };

            if let Some(text) = text {
                return Some(Ok(ProviderStreamChunk {
                    usage,
                    stop_reason,
                    ..ProviderStreamChunk::text(text)
                }));
            }
            if usage.is_some() || stop_reason.is_some() {
                return Some(Ok(ProviderStreamChunk {
                    usage,
                    stop_reason,
                    ..ProviderStreamChunk::event(StreamEventType::MessageDelta)
                }));
            }
            None
        }
    }
}

/// The configured key, or `OPENAI_API_KEY` from the environment.
pub fn resolve_api_key(config_key: &Option<String>) -> Result<SecretString, MnemosError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(SecretString::from(key.clone()));
    }

    std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| {
            MnemosError::Config(
                "OpenAI API key not found. Set openai.api_key in config or the OPENAI_API_KEY environment variable.".into(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemos_core::types::ProviderMessage;
    use secrecy::ExposeSecret;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenAiProvider {
        let client = OpenAiClient::new(
            SecretString::from("sk-test".to_string()),
            &server.uri(),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_retry_delay(Duration::from_millis(10));
        OpenAiProvider::with_client(client)
    }

    fn request(stream: bool) -> ProviderRequest {
        ProviderRequest {
            model: "gpt-4o-mini".into(),
            system_prompt: None,
            messages: vec![ProviderMessage::user("Question: why?")],
            temperature: Some(0.7),
            max_tokens: Some(64),
            stream,
        }
    }

    #[test]
    fn configured_key_wins() {
        let key = resolve_api_key(&Some("sk-config".into())).unwrap();
        assert_eq!(key.expose_secret(), "sk-config");
    }

    #[test]
    fn chat_request_puts_system_prompt_first() {
        let server_uri = "http://localhost:1";
        let client = OpenAiClient::new(
            SecretString::from("k".to_string()),
            server_uri,
            Duration::from_secs(1),
        )
        .unwrap();
        let provider = OpenAiProvider::with_client(client);

        let chat = provider.to_chat_request(&ProviderRequest {
            system_prompt: Some("Be brief.".into()),
            ..request(false)
        });
        assert_eq!(chat.messages[0].role, "system");
        assert_eq!(chat.messages[0].content, "Be brief.");
        assert_eq!(chat.messages[1].content, "Question: why?");
        assert_eq!(chat.temperature, Some(0.7));
        assert_eq!(chat.max_tokens, Some(64));
    }

    #[test]
    fn empty_deltas_are_dropped() {
        let event = StreamEvent::Chunk(
            serde_json::from_str(r#"{"choices":[{"delta":{"content":""},"finish_reason":null}]}"#)
                .unwrap(),
        );
        assert!(map_stream_event(event).is_none());
    }

    #[tokio::test]
    async fn complete_maps_first_choice_and_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "messages": [{"role": "user", "content": "Question: why?"}],
                "temperature": 0.7,
                "max_tokens": 64
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "c1",
                "model": "gpt-4o-mini",
                "choices": [{"message": {"role": "assistant", "content": "Because."}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 4, "completion_tokens": 2}
            })))
            .mount(&server)
            .await;

        let resp = provider(&server).complete(request(false)).await.unwrap();
        assert_eq!(resp.content, "Because.");
        assert_eq!(resp.stop_reason.as_deref(), Some("stop"));
        assert_eq!(resp.usage.input_tokens, 4);
    }

    #[tokio::test]
    async fn stream_maps_deltas_and_done() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Here is \"},\"finish_reason\":null}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"the fix\"},\"finish_reason\":null}]}\n\n",
            "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let chunks: Vec<_> = provider(&server)
            .stream(request(true))
            .await
            .unwrap()
            .map(|c| c.unwrap())
            .collect()
            .await;

        let text: String = chunks.iter().filter_map(|c| c.text.clone()).collect();
        assert_eq!(text, "Here is the fix");
        assert_eq!(chunks[2].event_type, StreamEventType::MessageDelta);
        assert_eq!(chunks[2].stop_reason.as_deref(), Some("stop"));
        assert_eq!(chunks[3].event_type, StreamEventType::MessageStop);
    }

    #[tokio::test]
    async fn stream_open_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let result = provider(&server).stream(request(true)).await;
        let err = match result {
            Ok(_) => panic!("expected an error"),
            Err(e) => e,
        };
        assert!(err.to_string().contains("Incorrect API key"));
    }
}
