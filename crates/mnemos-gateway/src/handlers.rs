// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use mnemos_context::ContextEntry;
use mnemos_core::types::HealthStatus;
use mnemos_core::MnemosError;
use mnemos_knowledge::Fact;

use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" when every adapter is healthy, "degraded" otherwise.
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub provider: String,
    pub embedder: String,
    pub storage: String,
}

/// Request body for POST /v1/knowledge.
#[derive(Debug, Deserialize)]
pub struct AddKnowledgeRequest {
    pub text: String,
}

/// Response body for GET /v1/knowledge.
#[derive(Debug, Serialize)]
pub struct KnowledgeListResponse {
    pub facts: Vec<Fact>,
}

/// Response body for GET /v1/context.
#[derive(Debug, Serialize)]
pub struct ContextResponse {
    pub entries: Vec<ContextEntry>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// Bad input is the caller's fault; everything else is ours.
fn mnemos_error_response(e: MnemosError) -> Response {
    match e {
        MnemosError::InvalidInput(message) => error_response(StatusCode::BAD_REQUEST, message),
        e => {
            warn!(error = %e, "gateway request failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn describe(status: &HealthStatus) -> String {
    match status {
        HealthStatus::Healthy => "healthy".to_string(),
        HealthStatus::Degraded(reason) => format!("degraded: {reason}"),
        HealthStatus::Unhealthy(reason) => format!("unhealthy: {reason}"),
    }
}

/// GET /health
///
/// 200 when every adapter is healthy, 503 otherwise.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let report = state.assistant.health().await;
    let healthy = report.is_healthy();
    let body = HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        provider: describe(&report.provider),
        embedder: describe(&report.embedder),
        storage: describe(&report.storage),
    };
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body)).into_response()
}

/// POST /v1/knowledge
pub async fn post_knowledge(
    State(state): State<GatewayState>,
    Json(body): Json<AddKnowledgeRequest>,
) -> Response {
    match state.assistant.add_knowledge(&body.text).await {
        Ok(fact) => (StatusCode::CREATED, Json(fact)).into_response(),
        Err(e) => mnemos_error_response(e),
    }
}

/// GET /v1/knowledge
pub async fn get_knowledge(State(state): State<GatewayState>) -> Json<KnowledgeListResponse> {
    Json(KnowledgeListResponse {
        facts: state.assistant.knowledge().facts().await,
    })
}

/// GET /v1/context
pub async fn get_context(State(state): State<GatewayState>) -> Json<ContextResponse> {
    Json(ContextResponse {
        entries: state.assistant.context().entries().await,
    })
}

/// DELETE /v1/context
pub async fn delete_context(State(state): State<GatewayState>) -> Response {
    match state.assistant.context().clear().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => mnemos_error_response(e),
    }
}
