// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound turns and the request/outcome pair of one orchestrated exchange.

use serde::{Deserialize, Serialize};
use tiergate_core::{ComplexityHint, ConversationHandle, Role, Tier, Turn};

/// A turn as sent by the client, before normalization.
///
/// Deserialization never fails: missing or non-string fields become `None`,
/// and a value that is not an object at all becomes an empty turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "serde_json::Value")]
pub struct IncomingTurn {
    pub role: Option<String>,
    pub content: Option<String>,
}

impl From<serde_json::Value> for IncomingTurn {
    fn from(value: serde_json::Value) -> Self {
        let field = |name: &str| match value.get(name) {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            _ => None,
        };
        Self {
            role: field("role"),
            content: field("content"),
        }
    }
}

impl IncomingTurn {
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: Some(role.to_string()),
            content: Some(content.to_string()),
        }
    }

    /// The turn to append, if any.
    ///
    /// Turns without a role or with empty content are dropped, as are system
    /// turns. `assistant` is kept; every other role is sent as `user`.
    pub fn normalize(&self) -> Option<Turn> {
        let role = self.role.as_deref()?.trim();
        let content = self.content.as_deref().filter(|c| !c.trim().is_empty())?;
        let role = if role.eq_ignore_ascii_case("system") {
            return None;
        } else if role.eq_ignore_ascii_case("assistant") {
            Role::Assistant
        } else {
            Role::User
        };
        Some(Turn {
            role,
            content: content.to_string(),
        })
    }
}

/// Everything the orchestrator needs for one exchange.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    /// Turns to append, in order.
    pub turns: Vec<IncomingTurn>,
    /// Existing conversation, or `None` to start one.
    pub conversation: Option<ConversationHandle>,
    /// Tier the client last saw for this conversation.
    pub current_tier: Tier,
    pub hint: Option<ComplexityHint>,
    pub forced_tier: Option<Tier>,
}

impl ChatRequest {
    /// Start a new conversation with a single user message.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            turns: vec![IncomingTurn {
                role: Some("user".into()),
                content: Some(message.into()),
            }],
            ..Self::default()
        }
    }

    pub fn with_conversation(mut self, conversation: ConversationHandle) -> Self {
        self.conversation = Some(conversation);
        self
    }

    pub fn with_current_tier(mut self, tier: Tier) -> Self {
        self.current_tier = tier;
        self
    }

    pub fn with_hint(mut self, hint: ComplexityHint) -> Self {
        self.hint = Some(hint);
        self
    }

    pub fn with_forced_tier(mut self, tier: Tier) -> Self {
        self.forced_tier = Some(tier);
        self
    }
}

/// Result of a successful exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatOutcome {
    pub conversation: ConversationHandle,
    /// Sanitized reply, possibly empty.
    pub text: String,
    /// Tier actually used for this turn.
    pub tier: Tier,
}
