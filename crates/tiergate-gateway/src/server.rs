// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
};
use tiergate_config::model::Environment;
use tiergate_core::TiergateError;
use tiergate_orchestrator::Orchestrator;
use tiergate_security::redact;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Runs each exchange.
    pub orchestrator: Arc<Orchestrator>,
    /// Controls whether error bodies carry a diagnostic trace.
    pub environment: Environment,
    /// Secret values masked out of error messages and traces.
    pub secrets: Arc<RwLock<Vec<String>>>,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(orchestrator: Arc<Orchestrator>, environment: Environment) -> Self {
        Self {
            orchestrator,
            environment,
            secrets: Arc::new(RwLock::new(Vec::new())),
            start_time: Instant::now(),
        }
    }

    /// Share a secret store with the log writer.
    pub fn with_secrets(mut self, secrets: Arc<RwLock<Vec<String>>>) -> Self {
        self.secrets = secrets;
        self
    }

    pub(crate) fn redact(&self, text: &str) -> String {
        let secrets = self.secrets.read().unwrap_or_else(PoisonError::into_inner);
        redact(text, &secrets)
    }
}

/// Build the application router.
///
/// Routes:
/// - POST /api/chat
/// - POST /api/ask-assistant (same handler)
/// - GET /health
///
/// Any other method on the chat routes answers 405 with a JSON body.
pub fn build_router(state: GatewayState) -> Router {
    let chat = post(handlers::post_chat).fallback(handlers::method_not_allowed);

    Router::new()
        .route("/api/chat", chat.clone())
        .route("/api/ask-assistant", chat)
        .route("/health", get(handlers::get_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind `host:port` and serve until `shutdown` resolves.
pub async fn start_server<F>(
    host: &str,
    port: u16,
    state: GatewayState,
    shutdown: F,
) -> Result<(), TiergateError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TiergateError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| TiergateError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
