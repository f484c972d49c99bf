// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the tiergate pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Capability tier of the backend assistant, ordered by escalation rank.
///
/// Labels parse case-insensitively from `base|mid|high` and from the historical
/// model names `mini|4o|41`. They always render as `base|mid|high`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Cheapest tier: single-fact lookups and short questions.
    #[default]
    #[strum(to_string = "base", serialize = "mini")]
    Base,
    /// General policy questions with some nuance.
    #[strum(to_string = "mid", serialize = "4o")]
    Mid,
    /// Comparative, sensitive, or multi-part analysis.
    #[strum(to_string = "high", serialize = "41")]
    High,
}

impl Tier {
    /// All tiers in ascending rank.
    pub const ALL: [Tier; 3] = [Tier::Base, Tier::Mid, Tier::High];

    /// Parse an optional client-supplied label, ignoring anything unrecognized.
    pub fn parse_label(label: Option<&str>) -> Option<Tier> {
        label.and_then(|l| l.trim().parse().ok())
    }
}

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    /// Creates a user-authored turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant-authored turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Opaque backend identifier correlating the turns of one conversation.
///
/// Owned by the client: it travels in every request and response and is never
/// persisted server-side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationHandle(pub String);

impl ConversationHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Complexity hint computed by the client while the message was composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityHint {
    Simple,
    Complex,
}

impl ComplexityHint {
    /// Whether the hint asks for more capability than the base tier.
    pub fn is_elevated(self) -> bool {
        matches!(self, ComplexityHint::Complex)
    }
}

/// Parameters for one backend turn-taking cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    /// Backend identity (assistant id) bound to the selected tier.
    pub assistant_id: String,
    /// Tier this dispatch was selected for.
    pub tier: Tier,
    /// Instruction set layered on top of the assistant's own configuration.
    pub additional_instructions: String,
    /// Optional completion token cap for this tier.
    pub max_completion_tokens: Option<u32>,
}

/// Terminal outcome of a bounded wait on a backend run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The run finished and its reply is available on the conversation.
    Completed,
    /// The run reached a non-success terminal state.
    Failed { status: String, reason: String },
    /// The run did not finish within the allotted time.
    TimedOut { after: Duration },
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_totally_ordered() {
        assert!(Tier::Base < Tier::Mid);
        assert!(Tier::Mid < Tier::High);
        assert_eq!(Tier::High.max(Tier::Base), Tier::High);
        assert!(Tier::ALL.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn tier_parses_canonical_and_historical_labels() {
        assert_eq!("base".parse::<Tier>().unwrap(), Tier::Base);
        assert_eq!("MID".parse::<Tier>().unwrap(), Tier::Mid);
        assert_eq!("mini".parse::<Tier>().unwrap(), Tier::Base);
        assert_eq!("4o".parse::<Tier>().unwrap(), Tier::Mid);
        assert_eq!("41".parse::<Tier>().unwrap(), Tier::High);
        assert!("ultra".parse::<Tier>().is_err());
    }

    #[test]
    fn tier_displays_canonical_label() {
        assert_eq!(Tier::Base.to_string(), "base");
        assert_eq!(Tier::Mid.to_string(), "mid");
        assert_eq!(Tier::High.to_string(), "high");
        assert_eq!(serde_json::to_string(&Tier::High).unwrap(), "\"high\"");
    }

    #[test]
    fn parse_label_ignores_garbage() {
        assert_eq!(Tier::parse_label(Some(" high ")), Some(Tier::High));
        assert_eq!(Tier::parse_label(Some("nonsense")), None);
        assert_eq!(Tier::parse_label(None), None);
    }

    #[test]
    fn complexity_hint_parsing() {
        assert_eq!("complex".parse::<ComplexityHint>().unwrap(), ComplexityHint::Complex);
        assert_eq!("Simple".parse::<ComplexityHint>().unwrap(), ComplexityHint::Simple);
        assert!(ComplexityHint::Complex.is_elevated());
        assert!(!ComplexityHint::Simple.is_elevated());
    }

    #[test]
    fn turn_serializes_lowercase_role() {
        let json = serde_json::to_string(&Turn::user("hi")).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hi"}"#);
    }
}
