// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`AssistantBackend`] over OpenAI threads, messages and runs.

use std::time::Duration;

use async_trait::async_trait;
use tiergate_core::{
    AssistantBackend, ConversationHandle, DispatchRequest, HealthStatus, PluginAdapter, Role,
    RunOutcome, TiergateError, Turn,
};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::client::OpenAiClient;
use crate::types::{
    CreateMessageRequest, CreateRunRequest, ResponseFormat, RunObject, RunStatus, ToolResources,
};

/// How many recent messages are inspected when looking for the reply.
pub const REPLY_SCAN_LIMIT: u32 = 50;

/// Per-run settings shared by every tier.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub temperature: f32,
    pub vector_store_id: Option<String>,
    pub poll_interval: Duration,
    pub run_timeout: Duration,
}

/// Assistants-API backend. Holds no conversation state of its own.
pub struct OpenAiBackend {
    client: OpenAiClient,
    settings: RunSettings,
}

impl OpenAiBackend {
    pub fn new(client: OpenAiClient, settings: RunSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    fn run_request(&self, request: &DispatchRequest) -> CreateRunRequest {
        CreateRunRequest {
            assistant_id: request.assistant_id.clone(),
            additional_instructions: Some(request.additional_instructions.clone())
                .filter(|s| !s.is_empty()),
            temperature: Some(self.settings.temperature),
            max_completion_tokens: request.max_completion_tokens,
            response_format: Some(ResponseFormat::text()),
            tool_resources: self
                .settings
                .vector_store_id
                .as_deref()
                .map(ToolResources::vector_store),
        }
    }

    /// Best-effort cancel so the thread accepts new messages.
    async fn cancel_quietly(&self, thread_id: &str, run_id: &str) {
        if let Err(e) = self.client.cancel_run(thread_id, run_id).await {
            warn!(thread_id, run_id, error = %e, "failed to cancel run");
        }
    }

    async fn settle(&self, thread_id: &str, run: &RunObject) -> RunOutcome {
        match run.status {
            RunStatus::Completed => RunOutcome::Completed,
            RunStatus::Incomplete => {
                // The partial reply is still on the thread.
                warn!(thread_id, run_id = %run.id, reason = %run.failure_reason(), "run incomplete");
                RunOutcome::Completed
            }
            RunStatus::RequiresAction => {
                self.cancel_quietly(thread_id, &run.id).await;
                RunOutcome::Failed {
                    status: run.status.as_str().to_string(),
                    reason: "run requested tool outputs".to_string(),
                }
            }
            status => RunOutcome::Failed {
                status: status.as_str().to_string(),
                reason: run.failure_reason(),
            },
        }
    }
}

/// Thread ids are interpolated into request paths.
fn checked_thread_id(handle: &ConversationHandle) -> Result<&str, TiergateError> {
    let id = handle.as_str();
    let valid = !id.is_empty()
        && id.len() <= 128
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(id)
    } else {
        Err(TiergateError::InvalidRequest(format!("malformed thread id: {id:?}")))
    }
}

#[async_trait]
impl PluginAdapter for OpenAiBackend {
    fn name(&self) -> &str {
        "openai-assistants"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, TiergateError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl AssistantBackend for OpenAiBackend {
    async fn create_conversation(&self) -> Result<ConversationHandle, TiergateError> {
        let thread = self.client.create_thread().await?;
        info!(thread_id = %thread.id, "thread created");
        Ok(ConversationHandle(thread.id))
    }

    async fn append_turn(
        &self,
        conversation: &ConversationHandle,
        turn: &Turn,
    ) -> Result<(), TiergateError> {
        let thread_id = checked_thread_id(conversation)?;
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => {
                return Err(TiergateError::InvalidRequest(
                    "system turns cannot be appended to a thread".into(),
                ));
            }
        };
        let message = CreateMessageRequest {
            role: role.to_string(),
            content: turn.content.clone(),
        };
        let created = self.client.create_message(thread_id, &message).await?;
        debug!(thread_id, message_id = %created.id, role, "turn appended");
        Ok(())
    }

    async fn run_to_completion(
        &self,
        conversation: &ConversationHandle,
        request: &DispatchRequest,
    ) -> Result<RunOutcome, TiergateError> {
        let thread_id = checked_thread_id(conversation)?;
        let deadline = Instant::now() + self.settings.run_timeout;

        let mut run = self
            .client
            .create_run(thread_id, &self.run_request(request))
            .await?;
        info!(thread_id, run_id = %run.id, tier = %request.tier, "run started");

        loop {
            if run.status.is_terminal() {
                let outcome = self.settle(thread_id, &run).await;
                debug!(thread_id, run_id = %run.id, status = run.status.as_str(), "run settled");
                return Ok(outcome);
            }

            if Instant::now() >= deadline {
                warn!(thread_id, run_id = %run.id, "run timed out");
                self.cancel_quietly(thread_id, &run.id).await;
                return Ok(RunOutcome::TimedOut {
                    after: self.settings.run_timeout,
                });
            }

            tokio::time::sleep(self.settings.poll_interval).await;
            run = match self.client.retrieve_run(thread_id, &run.id).await {
                Ok(polled) => polled,
                Err(e) => {
                    warn!(thread_id, run_id = %run.id, error = %e, "run poll failed");
                    self.cancel_quietly(thread_id, &run.id).await;
                    return Err(e);
                }
            };
        }
    }

    async fn latest_assistant_reply(
        &self,
        conversation: &ConversationHandle,
    ) -> Result<Option<String>, TiergateError> {
        let thread_id = checked_thread_id(conversation)?;
        let list = self.client.list_messages(thread_id, REPLY_SCAN_LIMIT).await?;
        Ok(list
            .data
            .iter()
            .find(|m| m.role == "assistant")
            .map(|m| m.joined_text()))
    }
}
