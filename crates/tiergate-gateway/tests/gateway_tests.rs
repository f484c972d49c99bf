// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP-level tests for the gateway routes against the in-memory backend.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tiergate_config::model::{EscalationMode, Environment, TiersConfig};
use tiergate_core::{RunOutcome, Tier, Turn};
use tiergate_gateway::{GatewayState, build_router};
use tiergate_orchestrator::Orchestrator;
use tiergate_router::{EscalationPolicy, HeuristicClassifier};
use tiergate_test_utils::{BackendCall, FailPoint, FixedClassifier, MemoryBackend, test_config};
use tower::ServiceExt;

fn app_with(backend: &MemoryBackend, tiers: TiersConfig, environment: Environment) -> Router {
    let orchestrator = Orchestrator::new(
        Arc::new(backend.clone()),
        EscalationPolicy::new(Arc::new(HeuristicClassifier::new()), EscalationMode::Sticky),
        tiers,
    );
    build_router(GatewayState::new(Arc::new(orchestrator), environment))
}

fn app(backend: &MemoryBackend) -> Router {
    app_with(backend, test_config().tiers, Environment::Development)
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn first_message_returns_thread_text_and_tier() {
    let backend =
        MemoryBackend::with_replies(["The Senator supports X.\n\nSources: Internal office dataset"]);

    let (status, body) = post_json(
        app(&backend),
        "/api/chat",
        json!({"messages": [{"role": "user", "content": "What is the Senator's position on X?"}]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body["threadId"].as_str().unwrap().is_empty());
    assert_eq!(body["modelTier"], "base");
    assert_eq!(
        body["text"],
        "The Senator supports X.\n\nSources: Internal office dataset"
    );
}

#[tokio::test]
async fn ask_assistant_alias_accepts_single_message() {
    let backend = MemoryBackend::with_replies(["hello back"]);

    let (status, body) =
        post_json(app(&backend), "/api/ask-assistant", json!({"message": "hello"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "hello back");
    assert_eq!(backend.thread_count().await, 1);
}

#[tokio::test]
async fn follow_up_reuses_thread_and_keeps_sticky_tier() {
    let backend = MemoryBackend::with_replies(["first", "second"]);
    let app = app(&backend);

    let (_, first) = post_json(
        app.clone(),
        "/api/chat",
        json!({"message": "Compare the budget bill versus the substitute", "complexity": "complex"}),
    )
    .await;
    assert_eq!(first["modelTier"], "mid");
    let thread_id = first["threadId"].as_str().unwrap().to_string();

    let (status, second) = post_json(
        app,
        "/api/chat",
        json!({"message": "thanks", "threadId": thread_id, "modelTier": "mid"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["threadId"], thread_id.as_str());
    assert_eq!(second["modelTier"], "mid");
    assert_eq!(backend.thread_count().await, 1);
}

#[tokio::test]
async fn citation_artifacts_are_stripped_from_reply() {
    let backend = MemoryBackend::with_replies(["Funding rose【4:0†source】 in 2024 per Budget_2024.pdf."]);

    let (_, body) = post_json(app(&backend), "/api/chat", json!({"message": "funding?"})).await;

    assert_eq!(body["text"], "Funding rose in 2024 per .");
}

#[tokio::test]
async fn unbound_tier_is_400_with_expected_keys() {
    let backend = MemoryBackend::new();
    let mut tiers = test_config().tiers;
    tiers.high = None;

    let (status, body) = post_json(
        app_with(&backend, tiers, Environment::Development),
        "/api/chat",
        json!({"message": "hi", "forceTier": "high"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "configuration_error");
    assert_eq!(body["tier"], "high");
    assert_eq!(
        body["expectedKeys"],
        json!(["tiers.high", "TIERGATE_TIERS_HIGH"])
    );
    assert!(backend.calls().await.is_empty());
}

#[tokio::test]
async fn get_on_chat_route_is_405_json() {
    let request = Request::builder()
        .method("GET")
        .uri("/api/chat")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(&MemoryBackend::new()), request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "method_not_allowed");
}

#[tokio::test]
async fn malformed_json_is_invalid_request() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(app(&MemoryBackend::new()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn null_and_non_object_turns_are_skipped() {
    let backend = MemoryBackend::with_replies(["hello back"]);

    let (status, body) = post_json(
        app(&backend),
        "/api/chat",
        json!({"messages": [null, 5, "stray", {"role": "user", "content": "hi"}]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "hello back");
    let appended: Vec<_> = backend
        .calls()
        .await
        .into_iter()
        .filter_map(|call| match call {
            BackendCall::AppendTurn { turn, .. } => Some(turn),
            _ => None,
        })
        .collect();
    assert_eq!(appended, vec![Turn::user("hi")]);
}

#[tokio::test]
async fn empty_request_is_rejected_without_backend_calls() {
    let backend = MemoryBackend::new();

    let (status, body) = post_json(app(&backend), "/api/chat", json!({"messages": []})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
    assert!(backend.calls().await.is_empty());
}

#[tokio::test]
async fn run_timeout_is_504() {
    let backend = MemoryBackend::new();
    backend
        .set_run_outcome(RunOutcome::TimedOut {
            after: std::time::Duration::from_secs(60),
        })
        .await;

    let (status, body) = post_json(app(&backend), "/api/chat", json!({"message": "hi"})).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"], "timeout");
}

#[tokio::test]
async fn trace_is_included_in_development() {
    let backend = MemoryBackend::new();
    backend.fail_on(FailPoint::Run).await;

    let (status, body) = post_json(app(&backend), "/api/chat", json!({"message": "hi"})).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "transport_error");
    assert!(body["trace"].as_str().unwrap().contains("stage=dispatch"));
}

#[tokio::test]
async fn trace_is_withheld_in_production() {
    let backend = MemoryBackend::new();
    backend.fail_on(FailPoint::Run).await;

    let (status, body) = post_json(
        app_with(&backend, test_config().tiers, Environment::Production),
        "/api/chat",
        json!({"message": "hi"}),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.get("trace").is_none());
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn health_reports_backend_status() {
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app(&MemoryBackend::new()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn classifier_tier_flows_into_response() {
    let backend = MemoryBackend::with_replies(["deep answer"]);
    let orchestrator = Orchestrator::new(
        Arc::new(backend.clone()),
        EscalationPolicy::new(Arc::new(FixedClassifier::new(Tier::High)), EscalationMode::Sticky),
        test_config().tiers,
    );
    let app = build_router(GatewayState::new(Arc::new(orchestrator), Environment::Development));

    let (status, body) = post_json(app, "/api/chat", json!({"message": "anything"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modelTier"], "high");
    assert_eq!(backend.runs().await[0].assistant_id, "asst_high");
}
