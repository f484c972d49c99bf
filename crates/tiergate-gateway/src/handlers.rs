// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.
//!
//! Handles POST /api/chat, POST /api/ask-assistant, GET /health, and the
//! 405 fallback for other methods on the chat routes.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tiergate_config::model::Environment;
use tiergate_core::{ComplexityHint, ConversationHandle, HealthStatus, Tier, TiergateError};
use tiergate_orchestrator::{ChatOutcome, ChatRequest, IncomingTurn, RequestFailure};
use tracing::warn;

use crate::server::GatewayState;

/// Request body for the chat routes.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestBody {
    /// Turns to append to the conversation.
    #[serde(default)]
    pub messages: Option<Vec<IncomingTurn>>,
    /// Single user message, used when `messages` is empty.
    #[serde(default)]
    pub message: Option<String>,
    /// Existing conversation handle.
    #[serde(default)]
    pub thread_id: Option<String>,
    /// Last tier reported for this conversation.
    #[serde(default)]
    pub model_tier: Option<String>,
    /// Client-computed complexity hint.
    #[serde(default)]
    pub complexity: Option<String>,
    /// Explicit tier override.
    #[serde(default)]
    pub force_tier: Option<String>,
}

impl ChatRequestBody {
    /// Normalize the body into an orchestrator request.
    ///
    /// Unrecognized tier labels and hints are ignored.
    pub fn into_chat_request(self) -> ChatRequest {
        let mut turns = self.messages.unwrap_or_default();
        if turns.is_empty()
            && let Some(message) = self.message.filter(|m| !m.trim().is_empty())
        {
            turns.push(IncomingTurn {
                role: Some("user".into()),
                content: Some(message),
            });
        }

        ChatRequest {
            turns,
            conversation: self
                .thread_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .map(ConversationHandle),
            current_tier: Tier::parse_label(self.model_tier.as_deref()).unwrap_or_default(),
            hint: self
                .complexity
                .as_deref()
                .and_then(|h| h.trim().parse::<ComplexityHint>().ok()),
            forced_tier: Tier::parse_label(self.force_tier.as_deref()),
        }
    }
}

/// Response body for a successful exchange.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponseBody {
    pub thread_id: String,
    pub text: String,
    pub model_tier: Tier,
}

impl From<ChatOutcome> for ChatResponseBody {
    fn from(outcome: ChatOutcome) -> Self {
        Self {
            thread_id: outcome.conversation.0,
            text: outcome.text,
            model_tier: outcome.tier,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Stable machine-readable tag.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Tier that could not be served (configuration errors only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
    /// Configuration keys that would bind the tier (configuration errors only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_keys: Option<Vec<String>>,
    /// Diagnostic trace, withheld in production.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Detail for degraded or unhealthy states.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Binary version.
    pub version: String,
    /// Seconds since the gateway started.
    pub uptime_secs: u64,
}

/// POST /api/chat and POST /api/ask-assistant
///
/// Runs one exchange and returns the sanitized reply, the conversation
/// handle, and the tier used.
pub async fn post_chat(
    State(state): State<GatewayState>,
    body: Result<Json<ChatRequestBody>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            let error = TiergateError::InvalidRequest(rejection.body_text());
            let trace = format!("{rejection:?}");
            return error_response(&state, &error, trace);
        }
    };

    match state.orchestrator.handle(body.into_chat_request()).await {
        Ok(outcome) => Json(ChatResponseBody::from(outcome)).into_response(),
        Err(failure) => failure_response(&state, &failure),
    }
}

/// Fallback for every method other than POST on the chat routes.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            error: "method_not_allowed".to_string(),
            message: "Method not allowed".to_string(),
            tier: None,
            expected_keys: None,
            trace: None,
        }),
    )
        .into_response()
}

/// GET /health
///
/// Reports backend health. Unauthenticated.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let (status_code, status, detail) = match state.orchestrator.backend().health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy", None),
        Ok(HealthStatus::Degraded(detail)) => (StatusCode::OK, "degraded", Some(detail)),
        Ok(HealthStatus::Unhealthy(detail)) => {
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(detail))
        }
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(e.to_string())),
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            detail,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.start_time.elapsed().as_secs(),
        }),
    )
        .into_response()
}

fn failure_response(state: &GatewayState, failure: &RequestFailure) -> Response {
    let trace = format!("stage={}; {:?}", failure.stage, failure.error);
    error_response(state, &failure.error, trace)
}

fn error_response(state: &GatewayState, error: &TiergateError, trace: String) -> Response {
    let status = StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        warn!(status = status.as_u16(), tag = error.tag(), "request failed");
    }

    let (tier, expected_keys) = match error {
        TiergateError::Configuration {
            tier,
            expected_keys,
        } => (Some(*tier), Some(expected_keys.clone())),
        _ => (None, None),
    };

    let trace = match state.environment {
        Environment::Production => None,
        Environment::Development => Some(state.redact(&trace)),
    };

    (
        status,
        Json(ErrorResponse {
            error: error.tag().to_string(),
            message: state.redact(&error.to_string()),
            tier,
            expected_keys,
            trace,
        }),
    )
        .into_response()
}
