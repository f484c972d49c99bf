// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the tiergate request router.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types shared by the classifier, orchestrator, backend, and gateway
//! crates. Backend integrations implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TiergateError;
pub use types::{
    ComplexityHint, ConversationHandle, DispatchRequest, HealthStatus, Role, RunOutcome, Tier,
    Turn,
};

// Re-export all adapter traits at crate root.
pub use traits::{AssistantBackend, CompletionModel, CompletionRequest, PluginAdapter};
