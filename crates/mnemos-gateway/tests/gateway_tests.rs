// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route tests for the gateway, driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use mnemos_gateway::{router, GatewayState};
use mnemos_knowledge::SEED_FACTS;
use mnemos_test_utils::{MockReply, TestHarness};

async fn app(harness: &TestHarness) -> Router {
    let assistant = Arc::new(harness.reopen().await.unwrap());
    router(GatewayState::new(assistant))
}

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let harness = TestHarness::builder().build().await.unwrap();
    let response = app(&harness).await.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["embedder"], "healthy");
}

#[tokio::test]
async fn health_is_unavailable_when_embedder_fails() {
    let harness = TestHarness::builder().build().await.unwrap();
    let app = app(&harness).await;
    harness.embedder.set_failing(true);

    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["status"], "degraded");
}

#[tokio::test]
async fn knowledge_can_be_added_and_listed() {
    let harness = TestHarness::builder().build().await.unwrap();
    let app = app(&harness).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/knowledge",
            serde_json::json!({"text": "  Rust closures capture by reference.  "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let fact = body_json(response).await;
    assert_eq!(fact["id"], SEED_FACTS.len());
    assert_eq!(fact["text"], "Rust closures capture by reference.");

    let response = app.oneshot(get("/v1/knowledge")).await.unwrap();
    let facts = body_json(response).await["facts"].as_array().unwrap().clone();
    assert_eq!(facts.len(), SEED_FACTS.len() + 1);
    assert_eq!(facts[0]["text"], SEED_FACTS[0]);
}

#[tokio::test]
async fn blank_fact_is_rejected() {
    let harness = TestHarness::builder().build().await.unwrap();
    let response = app(&harness)
        .await
        .oneshot(json_request(
            Method::POST,
            "/v1/knowledge",
            serde_json::json!({"text": "   "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_streams_partials_then_done() {
    let harness = TestHarness::builder()
        .with_replies(vec![MockReply::Chunks(vec!["Here ".into(), "it is".into()])])
        .build()
        .await
        .unwrap();
    let app = app(&harness).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/chat",
            serde_json::json!({"message": "Show me"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );

    let body = body_text(response).await;
    let first = body.find(r#"data: {"text":"Here "}"#).unwrap();
    let second = body.find(r#"data: {"text":"Here it is"}"#).unwrap();
    let done = body.find("event: done").unwrap();
    assert!(first < second && second < done, "body: {body}");
    assert_eq!(body.matches("event: partial").count(), 2);

    let response = app.oneshot(get("/v1/context")).await.unwrap();
    let entries = body_json(response).await["entries"].clone();
    assert_eq!(entries[0]["role"], "user");
    assert_eq!(entries[0]["content"], "Show me");
    assert_eq!(entries[1]["role"], "assistant");
    assert_eq!(entries[1]["content"], "Here it is");
}

#[tokio::test]
async fn chat_failure_is_an_error_event() {
    let harness = TestHarness::builder()
        .with_replies(vec![MockReply::FailAfter {
            chunks: vec!["Half".into()],
            error: "stream dropped".into(),
        }])
        .build()
        .await
        .unwrap();

    let response = app(&harness)
        .await
        .oneshot(json_request(
            Method::POST,
            "/v1/chat",
            serde_json::json!({"message": "Go"}),
        ))
        .await
        .unwrap();

    let body = body_text(response).await;
    assert!(body.contains("event: error"), "body: {body}");
    assert!(body.contains("stream dropped"));
    assert!(body.contains(r#"event: done"#));
    assert!(body.contains(r#"data: {"text":"Half"}"#));
}

#[tokio::test]
async fn empty_chat_message_is_rejected() {
    let harness = TestHarness::builder().build().await.unwrap();
    let response = app(&harness)
        .await
        .oneshot(json_request(
            Method::POST,
            "/v1/chat",
            serde_json::json!({"message": " "}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(harness.provider.requests().await.is_empty());
}

#[tokio::test]
async fn context_can_be_cleared() {
    let harness = TestHarness::builder().build().await.unwrap();
    let app = app(&harness).await;

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            "/v1/chat",
            serde_json::json!({"message": "hello"}),
        ))
        .await
        .unwrap();
    body_text(response).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri("/v1/context")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(get("/v1/context")).await.unwrap();
    assert_eq!(body_json(response).await["entries"], serde_json::json!([]));
}
