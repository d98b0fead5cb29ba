// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The streamed answer to one question.
//!
//! Nothing happens until the stream is first polled. The first poll records
//! the question in the context, retrieves facts, builds the prompt, and opens
//! the provider stream; every later item is the answer so far. However the
//! stream ends, including being dropped mid-way, the text produced so far is
//! recorded as the assistant's reply.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::{self, FusedStream, Stream, StreamExt};
use tracing::{debug, info, warn};

use mnemos_context::{ContextManager, Role};
use mnemos_core::types::{ProviderMessage, ProviderRequest, StreamEventType};
use mnemos_core::{with_timeout, MnemosError, ProviderAdapter, ProviderStream};
use mnemos_knowledge::KnowledgeStore;

use crate::prompt::build_prompt;

/// Marker prefixed to the single item reporting a failure.
pub const ERROR_MARKER: &str = "[ERROR]";

/// Everything an answer needs, shared by all answers of one assistant.
pub(crate) struct AnswerDeps {
    pub provider: Arc<dyn ProviderAdapter>,
    pub knowledge: Arc<KnowledgeStore>,
    pub context: Arc<ContextManager>,
    pub preamble: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub top_k: usize,
    pub window: usize,
    pub timeout: Duration,
}

/// A stream of growing answer prefixes.
///
/// Each item is the whole answer so far, so the last item is the final
/// answer. A failure produces one item starting with [`ERROR_MARKER`].
pub struct AnswerStream {
    inner: Pin<Box<dyn FusedStream<Item = String> + Send>>,
}

impl AnswerStream {
    /// A stream that yields nothing.
    pub fn empty() -> Self {
        Self {
            inner: Box::pin(stream::empty()),
        }
    }

    pub(crate) fn from_stream(inner: impl Stream<Item = String> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(inner.fuse()),
        }
    }

    /// Drive the stream to the end and return its last item.
    pub async fn final_text(mut self) -> Option<String> {
        let mut last = None;
        while let Some(item) = self.next().await {
            last = Some(item);
        }
        last
    }
}

impl Stream for AnswerStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl FusedStream for AnswerStream {
    fn is_terminated(&self) -> bool {
        self.inner.is_terminated()
    }
}

/// The assistant reply being accumulated.
///
/// Once armed, dropping it unfinished records the partial text on a
/// spawned task.
struct Reply {
    context: Arc<ContextManager>,
    text: String,
    armed: bool,
}

impl Reply {
    async fn finish(&mut self) {
        if !self.armed {
            return;
        }
        self.armed = false;
        self.context
            .append(Role::Assistant, std::mem::take(&mut self.text))
            .await;
    }
}

impl Drop for Reply {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let context = self.context.clone();
        let text = std::mem::take(&mut self.text);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!(chars = text.len(), "answer dropped early, recording partial reply");
                handle.spawn(async move {
                    context.append(Role::Assistant, text).await;
                });
            }
            Err(_) => warn!("answer dropped outside a runtime, partial reply not recorded"),
        }
    }
}

enum Phase {
    Start,
    Streaming(ProviderStream),
    Done,
}

struct State {
    deps: Arc<AnswerDeps>,
    question: String,
    phase: Phase,
    reply: Reply,
}

impl State {
    /// Records the question, retrieves facts, and opens the provider stream.
    async fn open(&mut self) -> Result<ProviderStream, MnemosError> {
        let deps = self.deps.clone();
        deps.context.push(Role::User, self.question.clone()).await;
        self.reply.armed = true;
        deps.context.summarize_if_needed().await;

        let facts = deps.knowledge.search(&self.question, deps.top_k).await?;
        let window = deps.context.recent_window(deps.window).await;
        let prompt = build_prompt(&deps.preamble, &self.question, &facts, &window);
        debug!(
            facts = facts.len(),
            window = window.len(),
            prompt_chars = prompt.len(),
            "answer prompt assembled"
        );

        let request = ProviderRequest {
            model: deps.model.clone(),
            system_prompt: None,
            messages: vec![ProviderMessage::user(prompt)],
            temperature: Some(deps.temperature),
            max_tokens: deps.max_tokens,
            stream: true,
        };
        with_timeout(deps.timeout, deps.provider.stream(request)).await
    }
}

/// Builds the lazy answer stream for `question`.
pub(crate) fn answer_stream(deps: Arc<AnswerDeps>, question: String) -> AnswerStream {
    let state = State {
        reply: Reply {
            context: deps.context.clone(),
            text: String::new(),
            armed: false,
        },
        deps,
        question,
        phase: Phase::Start,
    };

    AnswerStream::from_stream(stream::unfold(state, |mut st| async move {
        loop {
            match std::mem::replace(&mut st.phase, Phase::Done) {
                Phase::Start => match st.open().await {
                    Ok(provider_stream) => st.phase = Phase::Streaming(provider_stream),
                    Err(e) => {
                        warn!(error = %e, "answer failed before streaming");
                        return Some((format!("{ERROR_MARKER} {e}"), st));
                    }
                },
                Phase::Streaming(mut provider_stream) => {
                    let timeout = st.deps.timeout;
                    let next =
                        with_timeout(timeout, async { provider_stream.next().await.transpose() })
                            .await;
                    match next {
                        Ok(Some(chunk)) => match chunk.event_type {
                            StreamEventType::ContentBlockDelta => {
                                st.phase = Phase::Streaming(provider_stream);
                                if let Some(text) = chunk.text.filter(|t| !t.is_empty()) {
                                    st.reply.text.push_str(&text);
                                    let partial = st.reply.text.clone();
                                    return Some((partial, st));
                                }
                            }
                            StreamEventType::Error => {
                                let message = chunk
                                    .error
                                    .unwrap_or_else(|| "provider reported an error".to_string());
                                warn!(error = %message, "provider stream reported an error");
                                return Some((format!("{ERROR_MARKER} {message}"), st));
                            }
                            StreamEventType::MessageStop => {}
                            StreamEventType::MessageStart | StreamEventType::MessageDelta => {
                                st.phase = Phase::Streaming(provider_stream);
                            }
                        },
                        Ok(None) => {}
                        Err(e) => {
                            warn!(error = %e, partial_chars = st.reply.text.len(), "answer stream failed");
                            return Some((format!("{ERROR_MARKER} {e}"), st));
                        }
                    }
                }
                Phase::Done => {
                    info!(chars = st.reply.text.len(), "answer complete");
                    st.reply.finish().await;
                    return None;
                }
            }
        }
    }))
}
