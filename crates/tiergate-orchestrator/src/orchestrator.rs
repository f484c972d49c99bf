// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-request state machine that drives one exchange with the backend.
//!
//! Stages run in this order:
//! SelectTier -> ResolveConversation -> AppendTurns -> Dispatch -> CollectReply
//! -> Sanitize -> Respond. Only the first five can end in `Fail`, so they are
//! the only ones [`Stage`] names.
//!
//! Tier selection runs first so that an unbound tier is reported before a
//! thread is created or any turn is appended.

use std::sync::Arc;

use tiergate_config::model::TiersConfig;
use tiergate_core::{
    AssistantBackend, ConversationHandle, DispatchRequest, Role, RunOutcome, Tier, TiergateError,
    Turn,
};
use tiergate_router::EscalationPolicy;
use tiergate_security::sanitize;
use tracing::{debug, info, warn};

use crate::instructions::DISPATCH_INSTRUCTIONS;
use crate::request::{ChatOutcome, ChatRequest};

/// Stages of one orchestrated exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SelectTier,
    ResolveConversation,
    AppendTurns,
    Dispatch,
    CollectReply,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::SelectTier => write!(f, "select_tier"),
            Stage::ResolveConversation => write!(f, "resolve_conversation"),
            Stage::AppendTurns => write!(f, "append_turns"),
            Stage::Dispatch => write!(f, "dispatch"),
            Stage::CollectReply => write!(f, "collect_reply"),
        }
    }
}

/// A failed exchange: the stage it stopped in and why.
#[derive(Debug, thiserror::Error)]
#[error("{stage}: {error}")]
pub struct RequestFailure {
    pub stage: Stage,
    #[source]
    pub error: TiergateError,
}

impl RequestFailure {
    fn at(stage: Stage) -> impl FnOnce(TiergateError) -> Self {
        move |error| Self { stage, error }
    }
}

/// Drives conversations against one backend with one escalation policy.
///
/// Holds no per-conversation state. Conversation handle and tier travel in
/// the request and the outcome.
pub struct Orchestrator {
    backend: Arc<dyn AssistantBackend>,
    policy: EscalationPolicy,
    tiers: TiersConfig,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn AssistantBackend>, policy: EscalationPolicy, tiers: TiersConfig) -> Self {
        Self {
            backend,
            policy,
            tiers,
        }
    }

    pub fn backend(&self) -> &Arc<dyn AssistantBackend> {
        &self.backend
    }

    /// Run one exchange to completion.
    pub async fn handle(&self, request: ChatRequest) -> Result<ChatOutcome, RequestFailure> {
        let result = self.run_stages(request).await;
        if let Err(failure) = &result {
            warn!(
                stage = %failure.stage,
                error = %failure.error,
                tag = failure.error.tag(),
                "exchange failed"
            );
        }
        result
    }

    async fn run_stages(&self, request: ChatRequest) -> Result<ChatOutcome, RequestFailure> {
        let turns: Vec<Turn> = request.turns.iter().filter_map(|t| t.normalize()).collect();

        // SelectTier
        let (tier, assistant_id) = self
            .select_tier(&request, &turns)
            .await
            .map_err(RequestFailure::at(Stage::SelectTier))?;

        // ResolveConversation
        let conversation = match request.conversation {
            Some(handle) => {
                debug!(thread_id = %handle, "reusing conversation");
                handle
            }
            None => self
                .backend
                .create_conversation()
                .await
                .map_err(RequestFailure::at(Stage::ResolveConversation))?,
        };

        // AppendTurns
        for turn in &turns {
            self.backend
                .append_turn(&conversation, turn)
                .await
                .map_err(RequestFailure::at(Stage::AppendTurns))?;
        }
        debug!(thread_id = %conversation, appended = turns.len(), "turns appended");

        // Dispatch
        let dispatch = DispatchRequest {
            assistant_id: assistant_id.to_string(),
            tier,
            additional_instructions: DISPATCH_INSTRUCTIONS.to_string(),
            max_completion_tokens: self.tiers.max_tokens_for(tier),
        };
        self.dispatch(&conversation, &dispatch)
            .await
            .map_err(RequestFailure::at(Stage::Dispatch))?;

        // CollectReply
        let reply = self
            .backend
            .latest_assistant_reply(&conversation)
            .await
            .map_err(RequestFailure::at(Stage::CollectReply))?
            .unwrap_or_default();
        if reply.is_empty() {
            debug!(thread_id = %conversation, "no assistant reply on thread");
        }

        // Sanitize
        let text = sanitize(&reply);

        // Respond
        info!(thread_id = %conversation, tier = %tier, chars = text.len(), "exchange completed");
        Ok(ChatOutcome {
            conversation,
            text,
            tier,
        })
    }

    async fn select_tier<'a>(
        &'a self,
        request: &ChatRequest,
        turns: &[Turn],
    ) -> Result<(Tier, &'a str), TiergateError> {
        if turns.is_empty() {
            return Err(TiergateError::InvalidRequest(
                "request carries no message to send".into(),
            ));
        }

        let latest_user_text = turns
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.as_str())
            .unwrap_or_default();

        let decision = self
            .policy
            .decide(
                latest_user_text,
                request.current_tier,
                request.hint,
                request.forced_tier,
            )
            .await;

        let assistant_id = self.tiers.identity_for(decision.tier).ok_or_else(|| {
            TiergateError::Configuration {
                tier: decision.tier,
                expected_keys: TiersConfig::expected_keys(decision.tier),
            }
        })?;

        Ok((decision.tier, assistant_id))
    }

    async fn dispatch(
        &self,
        conversation: &ConversationHandle,
        request: &DispatchRequest,
    ) -> Result<(), TiergateError> {
        match self.backend.run_to_completion(conversation, request).await? {
            RunOutcome::Completed => Ok(()),
            RunOutcome::Failed { status, reason } => Err(TiergateError::RunFailed { status, reason }),
            RunOutcome::TimedOut { after } => Err(TiergateError::Timeout { duration: after }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names_are_snake_case() {
        assert_eq!(Stage::SelectTier.to_string(), "select_tier");
        assert_eq!(Stage::CollectReply.to_string(), "collect_reply");
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn failures_are_logged_with_stage() {
        use tiergate_config::model::EscalationMode;
        use tiergate_router::HeuristicClassifier;
        use tiergate_test_utils::{FailPoint, MemoryBackend, test_config};

        let backend = MemoryBackend::new();
        backend.fail_on(FailPoint::Run).await;
        let orchestrator = Orchestrator::new(
            Arc::new(backend),
            EscalationPolicy::new(Arc::new(HeuristicClassifier::new()), EscalationMode::Sticky),
            test_config().tiers,
        );

        let result = orchestrator
            .handle(crate::request::ChatRequest::from_message("hello"))
            .await;
        assert!(result.is_err());
        assert!(logs_contain("exchange failed"));
        assert!(logs_contain("stage=dispatch"));
    }

    #[test]
    fn failure_display_names_stage() {
        let failure = RequestFailure {
            stage: Stage::Dispatch,
            error: TiergateError::Timeout {
                duration: std::time::Duration::from_secs(2),
            },
        };
        assert!(failure.to_string().starts_with("dispatch: "));
    }
}
