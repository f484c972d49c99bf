// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-shot text completion, used by the delegated tier classifier.

use async_trait::async_trait;

use crate::error::TiergateError;
use crate::traits::adapter::PluginAdapter;

/// A stateless completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier (e.g., "gpt-4o-mini").
    pub model: String,
    /// Fixed instruction set sent as the system message.
    pub system: String,
    /// The text to be judged.
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A text model answering one prompt with one reply.
#[async_trait]
pub trait CompletionModel: PluginAdapter {
    /// Sends the request and returns the reply text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, TiergateError>;
}
