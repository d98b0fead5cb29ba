// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events streaming for POST /v1/chat.
//!
//! SSE event format:
//! ```text
//! event: partial
//! data: {"text": "answer so far"}
//!
//! event: done
//! data: {"text": "final answer"}
//! ```
//!
//! A failure is reported as one `error` event, followed by `done` carrying
//! the text produced before it.

use std::convert::Infallible;

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::stream::{self, StreamExt};
use serde::Deserialize;

use mnemos_agent::{AnswerStream, ERROR_MARKER};

use crate::handlers::error_response;
use crate::server::GatewayState;

/// Request body for POST /v1/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Maps one answer item to its SSE event.
fn item_event(item: &str) -> Event {
    match item.strip_prefix(ERROR_MARKER) {
        Some(message) => Event::default()
            .event("error")
            .data(serde_json::json!({"error": message.trim()}).to_string()),
        None => Event::default()
            .event("partial")
            .data(serde_json::json!({"text": item}).to_string()),
    }
}

struct Progress {
    answer: AnswerStream,
    last_text: String,
    done: bool,
}

/// POST /v1/chat
///
/// Streams the answer as `partial` events, then one `done` event.
pub async fn post_chat(
    State(state): State<GatewayState>,
    Json(body): Json<ChatRequest>,
) -> Response {
    if body.message.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "message must not be empty");
    }

    let progress = Progress {
        answer: state.assistant.answer(&body.message),
        last_text: String::new(),
        done: false,
    };

    let events = stream::unfold(progress, |mut p| async move {
        if p.done {
            return None;
        }
        let event = match p.answer.next().await {
            Some(item) => {
                if !item.starts_with(ERROR_MARKER) {
                    p.last_text.clone_from(&item);
                }
                item_event(&item)
            }
            None => {
                p.done = true;
                Event::default()
                    .event("done")
                    .data(serde_json::json!({"text": p.last_text}).to_string())
            }
        };
        Some((Ok::<_, Infallible>(event), p))
    });

    Sse::new(events)
        .keep_alive(KeepAlive::default())
        .into_response()
}

