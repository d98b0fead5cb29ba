// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for streamed chat completions.
//!
//! Each event's `data` is either a JSON chunk or the `[DONE]` sentinel.

use std::pin::Pin;

use eventsource_stream::Eventsource;
use futures::stream::{Stream, StreamExt};
use mnemos_core::MnemosError;

use crate::types::{ApiErrorResponse, ChatStreamChunk};

/// Typed events from a streamed completion.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Chunk(ChatStreamChunk),
    /// The server sent `[DONE]`.
    Done,
}

/// Parses a streaming response body into [`StreamEvent`]s.
///
/// An `{"error": ...}` payload inside the stream becomes an `Err` item.
/// Empty keep-alive events are skipped.
pub fn parse_sse_stream(
    response: reqwest::Response,
) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, MnemosError>> + Send>> {
    let event_stream = response.bytes_stream().eventsource();

    let mapped = event_stream.filter_map(|result| async move {
        match result {
            Ok(event) => parse_data(&event.data),
            Err(e) => Some(Err(MnemosError::Provider {
                message: format!("SSE stream error: {e}"),
                source: None,
            })),
        }
    });

    Box::pin(mapped)
}

/// Interprets one `data` payload.
pub(crate) fn parse_data(data: &str) -> Option<Result<StreamEvent, MnemosError>> {
    let data = data.trim();
    if data.is_empty() {
        return None;
    }
    if data == "[DONE]" {
        return Some(Ok(StreamEvent::Done));
    }

    if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(data) {
        return Some(Err(MnemosError::provider(format!(
            "OpenAI stream error ({})",
            api_err.error.describe()
        ))));
    }

    Some(
        serde_json::from_str::<ChatStreamChunk>(data)
            .map(StreamEvent::Chunk)
            .map_err(|e| MnemosError::Provider {
                message: format!("failed to parse stream chunk: {e}"),
                source: Some(Box::new(e)),
            }),
    )
}
