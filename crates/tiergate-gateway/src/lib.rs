// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway in front of the conversation orchestrator.
//!
//! Exposes the chat routes and a health probe. Every error leaves the
//! gateway as a JSON body with a stable tag.

pub mod handlers;
pub mod server;

pub use handlers::{ChatRequestBody, ChatResponseBody, ErrorResponse, HealthResponse};
pub use server::{GatewayState, build_router, start_server};
