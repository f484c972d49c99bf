// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assistant backend trait: conversations, turns, and runs.

use async_trait::async_trait;

use crate::error::TiergateError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ConversationHandle, DispatchRequest, RunOutcome, Turn};

/// A hosted conversational backend with server-side conversation threads.
///
/// Every method is a single remote operation. None of them hold state in
/// process memory; the conversation lives entirely behind the handle.
#[async_trait]
pub trait AssistantBackend: PluginAdapter {
    /// Creates a new, empty conversation and returns its handle.
    async fn create_conversation(&self) -> Result<ConversationHandle, TiergateError>;

    /// Appends one turn to the conversation.
    async fn append_turn(
        &self,
        conversation: &ConversationHandle,
        turn: &Turn,
    ) -> Result<(), TiergateError>;

    /// Starts a run for the given assistant and waits, bounded, for a terminal outcome.
    async fn run_to_completion(
        &self,
        conversation: &ConversationHandle,
        request: &DispatchRequest,
    ) -> Result<RunOutcome, TiergateError>;

    /// Returns the text of the most recent assistant-authored message, if any.
    async fn latest_assistant_reply(
        &self,
        conversation: &ConversationHandle,
    ) -> Result<Option<String>, TiergateError>;
}
