// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestration for tiergate.
//!
//! The [`Orchestrator`] selects a tier through the escalation policy, resolves
//! or creates the backend conversation, appends the client's turns, runs the
//! tier's assistant with the fixed [`DISPATCH_INSTRUCTIONS`], and returns the
//! sanitized reply together with the tier that produced it.

pub mod instructions;
pub mod orchestrator;
pub mod request;

pub use instructions::DISPATCH_INSTRUCTIONS;
pub use orchestrator::{Orchestrator, RequestFailure, Stage};
pub use request::{ChatOutcome, ChatRequest, IncomingTurn};
