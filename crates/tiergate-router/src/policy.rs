// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation policy: resolves the tier for one turn.
//!
//! Priority order:
//! 1. A forced tier wins unconditionally.
//! 2. Otherwise the classifier judges the latest user message.
//! 3. A complex client hint lifts a base result to mid (never lowers, never reaches high).
//! 4. In sticky mode the result is floored at the conversation's current tier.

use std::sync::Arc;

use tiergate_config::model::EscalationMode;
use tiergate_core::{ComplexityHint, Tier};
use tracing::info;

use crate::classifier::{TierClassifier, apply_floor};

/// Why a tier was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// The client forced the tier.
    Forced,
    /// The classifier's own result.
    Classified,
    /// The client hint lifted the classifier's result.
    Hinted,
    /// The conversation's current tier held the result up.
    Floored,
}

/// The outcome of one routing decision.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingDecision {
    pub tier: Tier,
    /// Unconstrained classifier output, absent when forced.
    pub classified: Option<Tier>,
    pub reason: DecisionReason,
}

/// Combines a classifier, client hints, forced overrides, and the monotonicity regime.
pub struct EscalationPolicy {
    classifier: Arc<dyn TierClassifier>,
    mode: EscalationMode,
}

impl EscalationPolicy {
    pub fn new(classifier: Arc<dyn TierClassifier>, mode: EscalationMode) -> Self {
        Self { classifier, mode }
    }

    pub fn mode(&self) -> EscalationMode {
        self.mode
    }

    pub fn strategy(&self) -> &'static str {
        self.classifier.strategy()
    }

    /// Resolve the tier for the latest user message.
    pub async fn decide(
        &self,
        latest_user_text: &str,
        current: Tier,
        hint: Option<ComplexityHint>,
        forced: Option<Tier>,
    ) -> RoutingDecision {
        if let Some(tier) = forced {
            info!(tier = %tier, current = %current, "tier forced by client");
            return RoutingDecision {
                tier,
                classified: None,
                reason: DecisionReason::Forced,
            };
        }

        let classification = self.classifier.assess(latest_user_text).await;
        let classified = classification.tier;

        let mut tier = classified;
        let mut reason = DecisionReason::Classified;

        if hint.is_some_and(ComplexityHint::is_elevated) && tier < Tier::Mid {
            tier = Tier::Mid;
            reason = DecisionReason::Hinted;
        }

        let floored = apply_floor(tier, current, self.mode);
        if floored != tier {
            tier = floored;
            reason = DecisionReason::Floored;
        }

        info!(
            strategy = self.classifier.strategy(),
            tier = %tier,
            classified = %classified,
            current = %current,
            score = classification.score,
            reason = ?reason,
            detail = %classification.reason,
            "tier decided"
        );

        RoutingDecision {
            tier,
            classified: Some(classified),
            reason,
        }
    }
}
