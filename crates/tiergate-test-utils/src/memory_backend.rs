// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory assistant backend for deterministic testing.
//!
//! `MemoryBackend` implements `AssistantBackend` with threads held in a map,
//! scripted replies, injectable failures, and a log of every call made.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tiergate_core::{
    AssistantBackend, ConversationHandle, DispatchRequest, HealthStatus, PluginAdapter, Role,
    RunOutcome, TiergateError, Turn,
};

/// A backend operation, as recorded in the call log.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateConversation,
    AppendTurn {
        conversation: String,
        turn: Turn,
    },
    Run {
        conversation: String,
        request: DispatchRequest,
    },
    LatestReply {
        conversation: String,
    },
}

/// Operation that should fail with a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    CreateConversation,
    AppendTurn,
    Run,
    LatestReply,
}

#[derive(Default)]
struct State {
    next_id: u64,
    threads: HashMap<String, Vec<Turn>>,
    replies: VecDeque<String>,
    outcome: Option<RunOutcome>,
    fail_on: Option<FailPoint>,
    calls: Vec<BackendCall>,
}

/// An assistant backend whose threads live in process memory.
///
/// A completed run appends the next scripted reply as an assistant turn.
/// With no scripted replies left, the run completes without replying.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<State>>,
}

impl MemoryBackend {
    /// Create a backend with no threads and no scripted replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend pre-loaded with replies, consumed one per completed run.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = State {
            replies: replies.into_iter().map(Into::into).collect(),
            ..State::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Queue another reply.
    pub async fn push_reply(&self, text: impl Into<String>) {
        self.state.lock().await.replies.push_back(text.into());
    }

    /// Make every run end with `outcome` instead of completing.
    pub async fn set_run_outcome(&self, outcome: RunOutcome) {
        self.state.lock().await.outcome = Some(outcome);
    }

    /// Make the given operation fail with a 503 transport error.
    pub async fn fail_on(&self, point: FailPoint) {
        self.state.lock().await.fail_on = Some(point);
    }

    /// Register an existing thread, as if created by an earlier request.
    pub async fn seed_thread(&self, id: &str, turns: Vec<Turn>) {
        self.state.lock().await.threads.insert(id.to_string(), turns);
    }

    /// Every call made so far, in order.
    pub async fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().await.calls.clone()
    }

    /// Turns currently stored on a thread.
    pub async fn turns(&self, id: &str) -> Vec<Turn> {
        self.state
            .lock()
            .await
            .threads
            .get(id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of threads that exist.
    pub async fn thread_count(&self) -> usize {
        self.state.lock().await.threads.len()
    }

    /// Dispatch requests received so far.
    pub async fn runs(&self) -> Vec<DispatchRequest> {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter_map(|call| match call {
                BackendCall::Run { request, .. } => Some(request.clone()),
                _ => None,
            })
            .collect()
    }
}

fn injected(point: FailPoint) -> TiergateError {
    TiergateError::Transport {
        status: Some(503),
        message: format!("injected failure at {point:?}"),
        source: None,
    }
}

fn no_thread(id: &str) -> TiergateError {
    TiergateError::Transport {
        status: Some(404),
        message: format!("No thread found with id '{id}'."),
        source: None,
    }
}

#[async_trait]
impl PluginAdapter for MemoryBackend {
    fn name(&self) -> &str {
        "memory-backend"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, TiergateError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl AssistantBackend for MemoryBackend {
    async fn create_conversation(&self) -> Result<ConversationHandle, TiergateError> {
        let mut state = self.state.lock().await;
        state.calls.push(BackendCall::CreateConversation);
        if state.fail_on == Some(FailPoint::CreateConversation) {
            return Err(injected(FailPoint::CreateConversation));
        }
        state.next_id += 1;
        let id = format!("thread_mem_{}", state.next_id);
        state.threads.insert(id.clone(), Vec::new());
        Ok(ConversationHandle(id))
    }

    async fn append_turn(
        &self,
        conversation: &ConversationHandle,
        turn: &Turn,
    ) -> Result<(), TiergateError> {
        let mut state = self.state.lock().await;
        state.calls.push(BackendCall::AppendTurn {
            conversation: conversation.to_string(),
            turn: turn.clone(),
        });
        if state.fail_on == Some(FailPoint::AppendTurn) {
            return Err(injected(FailPoint::AppendTurn));
        }
        if turn.role == Role::System {
            return Err(TiergateError::InvalidRequest(
                "system turns cannot be appended".into(),
            ));
        }
        let thread = state
            .threads
            .get_mut(conversation.as_str())
            .ok_or_else(|| no_thread(conversation.as_str()))?;
        thread.push(turn.clone());
        Ok(())
    }

    async fn run_to_completion(
        &self,
        conversation: &ConversationHandle,
        request: &DispatchRequest,
    ) -> Result<RunOutcome, TiergateError> {
        let mut state = self.state.lock().await;
        state.calls.push(BackendCall::Run {
            conversation: conversation.to_string(),
            request: request.clone(),
        });
        if state.fail_on == Some(FailPoint::Run) {
            return Err(injected(FailPoint::Run));
        }
        if !state.threads.contains_key(conversation.as_str()) {
            return Err(no_thread(conversation.as_str()));
        }
        if let Some(outcome) = state.outcome.clone() {
            return Ok(outcome);
        }
        if let Some(reply) = state.replies.pop_front()
            && let Some(thread) = state.threads.get_mut(conversation.as_str())
        {
            thread.push(Turn::assistant(reply));
        }
        Ok(RunOutcome::Completed)
    }

    async fn latest_assistant_reply(
        &self,
        conversation: &ConversationHandle,
    ) -> Result<Option<String>, TiergateError> {
        let mut state = self.state.lock().await;
        state.calls.push(BackendCall::LatestReply {
            conversation: conversation.to_string(),
        });
        if state.fail_on == Some(FailPoint::LatestReply) {
            return Err(injected(FailPoint::LatestReply));
        }
        let thread = state
            .threads
            .get(conversation.as_str())
            .ok_or_else(|| no_thread(conversation.as_str()))?;
        Ok(thread
            .iter()
            .rev()
            .find(|t| t.role == Role::Assistant)
            .map(|t| t.content.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiergate_core::Tier;

    fn dispatch() -> DispatchRequest {
        DispatchRequest {
            assistant_id: "asst_base".into(),
            tier: Tier::Base,
            additional_instructions: String::new(),
            max_completion_tokens: None,
        }
    }

    #[tokio::test]
    async fn completed_run_appends_scripted_reply() {
        let backend = MemoryBackend::with_replies(["first", "second"]);
        let handle = backend.create_conversation().await.unwrap();
        backend.append_turn(&handle, &Turn::user("hi")).await.unwrap();

        let outcome = backend.run_to_completion(&handle, &dispatch()).await.unwrap();
        assert_eq!(outcome, RunOutcome::Completed);
        assert_eq!(
            backend.latest_assistant_reply(&handle).await.unwrap().as_deref(),
            Some("first")
        );
        assert_eq!(backend.turns(handle.as_str()).await.len(), 2);
    }

    #[tokio::test]
    async fn unknown_thread_is_404() {
        let backend = MemoryBackend::new();
        let handle = ConversationHandle("thread_nope".into());
        let err = backend.append_turn(&handle, &Turn::user("hi")).await.unwrap_err();
        assert_eq!(err.http_status(), 404);
    }

    #[tokio::test]
    async fn injected_failure_is_503_and_logged() {
        let backend = MemoryBackend::new();
        backend.fail_on(FailPoint::CreateConversation).await;
        let err = backend.create_conversation().await.unwrap_err();
        assert_eq!(err.http_status(), 503);
        assert_eq!(backend.calls().await, vec![BackendCall::CreateConversation]);
        assert_eq!(backend.thread_count().await, 0);
    }

    #[tokio::test]
    async fn scripted_outcome_replaces_completion() {
        let backend = MemoryBackend::with_replies(["never seen"]);
        backend
            .set_run_outcome(RunOutcome::Failed {
                status: "failed".into(),
                reason: "boom".into(),
            })
            .await;
        backend.seed_thread("thread_1", vec![Turn::user("hi")]).await;
        let handle = ConversationHandle("thread_1".into());
        let outcome = backend.run_to_completion(&handle, &dispatch()).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Failed { .. }));
        assert_eq!(backend.latest_assistant_reply(&handle).await.unwrap(), None);
    }
}
