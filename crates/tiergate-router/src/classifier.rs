// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic tier classification.
//!
//! Scores the latest user message with independent weighted signals and maps
//! the total onto a tier through two thresholds. No network, no latency, and
//! no dependence on earlier turns.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tiergate_config::model::{EscalationMode, RoutingConfig};
use tiergate_core::{Tier, TiergateError};

/// Signals the heuristic strategy can detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// "compare", "versus", "difference between", ...
    Comparison,
    /// Character count above the configured limit.
    LongMessage,
    /// Litigation, ethics, immigration and similar topics.
    SensitiveTopic,
    /// Several sentence-ending marks.
    MultiQuestion,
    /// "as well as", "in addition", ... in a message of some length.
    MultiIssue,
}

/// Result of classifying a message.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// The unconstrained tier for this message alone.
    pub tier: Tier,
    /// Summed signal weight (0 for the delegated strategy).
    pub score: u32,
    /// Signals that fired.
    pub signals: Vec<Signal>,
    /// Human-readable reason for the classification.
    pub reason: String,
}

impl Classification {
    pub(crate) fn fallback(reason: impl Into<String>) -> Self {
        Self {
            tier: Tier::Base,
            score: 0,
            signals: Vec::new(),
            reason: reason.into(),
        }
    }
}

/// A strategy that assigns a tier to the latest user message.
#[async_trait]
pub trait TierClassifier: Send + Sync {
    /// Short strategy name for logs.
    fn strategy(&self) -> &'static str;

    /// Unconstrained read: the tier this message warrants on its own.
    async fn assess(&self, latest_user_text: &str) -> Classification;

    /// Tier for this message, floored at `current` when `mode` is sticky.
    async fn classify(&self, latest_user_text: &str, current: Tier, mode: EscalationMode) -> Tier {
        apply_floor(self.assess(latest_user_text).await.tier, current, mode)
    }
}

/// Enforce the monotonicity regime on a candidate tier.
pub fn apply_floor(candidate: Tier, current: Tier, mode: EscalationMode) -> Tier {
    match mode {
        EscalationMode::Sticky => candidate.max(current),
        EscalationMode::PerTurn => candidate,
    }
}

static COMPARISON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:compare[sd]?|comparing|comparison|versus|vs|differences? between|differ from|contrast(?:ing)?|pros and cons|trade-?offs?)\b",
    )
    .unwrap()
});

static SENSITIVE_TOPIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:lawsuits?|litigation|legal|subpoenas?|indictments?|investigations?|ethics|scandals?|classified|immigration|deportation|abortion|firearms?|guns?|impeachment|allegations?|medical|privacy|discrimination|harassment|criminal|election fraud|campaign finance|security clearance)\b",
    )
    .unwrap()
});

static MULTI_ISSUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:as well as|in addition|additionally|furthermore|moreover|and also|another question|secondly|separately)\b|;",
    )
    .unwrap()
});

/// Weighted heuristic classifier.
pub struct HeuristicClassifier {
    mid_threshold: u32,
    high_threshold: u32,
    long_message_chars: usize,
    multi_issue_min_words: usize,
    multi_question_min: usize,
    comparison_weight: u32,
    long_message_weight: u32,
    sensitive_topic_weight: u32,
    multi_question_weight: u32,
    multi_issue_weight: u32,
    extra_sensitive: Option<Regex>,
}

impl HeuristicClassifier {
    /// Create a classifier with default weights and thresholds.
    pub fn new() -> Self {
        Self::with_routing(&RoutingConfig::default(), None)
    }

    /// Create a classifier from routing configuration.
    ///
    /// Fails only if the extra keyword list cannot be compiled into a matcher.
    pub fn from_config(config: &RoutingConfig) -> Result<Self, TiergateError> {
        let extra = keyword_matcher(&config.extra_sensitive_keywords)?;
        Ok(Self::with_routing(config, extra))
    }

    fn with_routing(config: &RoutingConfig, extra_sensitive: Option<Regex>) -> Self {
        Self {
            mid_threshold: config.mid_threshold,
            high_threshold: config.high_threshold,
            long_message_chars: config.long_message_chars,
            multi_issue_min_words: config.multi_issue_min_words,
            multi_question_min: config.multi_question_min,
            comparison_weight: config.comparison_weight,
            long_message_weight: config.long_message_weight,
            sensitive_topic_weight: config.sensitive_topic_weight,
            multi_question_weight: config.multi_question_weight,
            multi_issue_weight: config.multi_issue_weight,
            extra_sensitive,
        }
    }

    /// Score a message synchronously.
    pub fn score(&self, message: &str) -> Classification {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Classification::fallback("empty message");
        }

        let mut signals = Vec::new();

        if COMPARISON.is_match(trimmed) {
            signals.push(Signal::Comparison);
        }

        if trimmed.chars().count() > self.long_message_chars {
            signals.push(Signal::LongMessage);
        }

        if SENSITIVE_TOPIC.is_match(trimmed)
            || self.extra_sensitive.as_ref().is_some_and(|re| re.is_match(trimmed))
        {
            signals.push(Signal::SensitiveTopic);
        }

        if count_sentence_ends(trimmed) >= self.multi_question_min {
            signals.push(Signal::MultiQuestion);
        }

        let word_count = trimmed.split_whitespace().count();
        if word_count >= self.multi_issue_min_words && MULTI_ISSUE.is_match(trimmed) {
            signals.push(Signal::MultiIssue);
        }

        let score = signals
            .iter()
            .fold(0u32, |acc, s| acc.saturating_add(self.weight(*s)));
        let (tier, reason) = self.score_to_tier(score);

        Classification {
            tier,
            score,
            signals,
            reason: reason.to_string(),
        }
    }

    fn weight(&self, signal: Signal) -> u32 {
        match signal {
            Signal::Comparison => self.comparison_weight,
            Signal::LongMessage => self.long_message_weight,
            Signal::SensitiveTopic => self.sensitive_topic_weight,
            Signal::MultiQuestion => self.multi_question_weight,
            Signal::MultiIssue => self.multi_issue_weight,
        }
    }

    fn score_to_tier(&self, score: u32) -> (Tier, &'static str) {
        if score >= self.high_threshold {
            (Tier::High, "score reached high threshold")
        } else if score >= self.mid_threshold {
            (Tier::Mid, "score reached mid threshold")
        } else {
            (Tier::Base, "score below mid threshold")
        }
    }
}

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TierClassifier for HeuristicClassifier {
    fn strategy(&self) -> &'static str {
        "heuristic"
    }

    async fn assess(&self, latest_user_text: &str) -> Classification {
        self.score(latest_user_text)
    }
}

/// Count sentence-ending marks followed by whitespace or end of text.
///
/// A run such as `?!` or `...` counts once; `3.5` does not count.
fn count_sentence_ends(text: &str) -> usize {
    let mut count = 0;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if matches!(c, '.' | '?' | '!') {
            while chars.peek().is_some_and(|n| matches!(n, '.' | '?' | '!')) {
                chars.next();
            }
            if chars.peek().is_none_or(|n| n.is_whitespace()) {
                count += 1;
            }
        }
    }
    count
}

fn keyword_matcher(keywords: &[String]) -> Result<Option<Regex>, TiergateError> {
    let escaped: Vec<String> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(regex::escape)
        .collect();
    if escaped.is_empty() {
        return Ok(None);
    }
    let pattern = format!(r"(?i)\b(?:{})\b", escaped.join("|"));
    Regex::new(&pattern)
        .map(Some)
        .map_err(|e| TiergateError::Internal(format!("invalid sensitive keyword list: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_comparison_text() -> String {
        let mut text = String::from(
            "Please compare the Senator's immigration bill versus the House version, \
             focusing on enforcement funding",
        );
        while text.chars().count() <= 650 {
            text.push_str(" and how the appropriations would be distributed across agencies");
        }
        text
    }

    #[test]
    fn simple_question_is_base() {
        let c = HeuristicClassifier::new();
        let result = c.score("What is the Senator's position on X?");
        assert_eq!(result.tier, Tier::Base);
        assert_eq!(result.score, 0);
        assert!(result.signals.is_empty());
    }

    #[test]
    fn comparison_alone_reaches_mid() {
        let c = HeuristicClassifier::new();
        let result = c.score("How does the new plan compare to last year's");
        assert_eq!(result.signals, vec![Signal::Comparison]);
        assert_eq!(result.tier, Tier::Mid);
    }

    #[test]
    fn comparison_long_and_sensitive_is_high() {
        let c = HeuristicClassifier::new();
        let result = c.score(&long_comparison_text());
        assert!(result.signals.contains(&Signal::Comparison));
        assert!(result.signals.contains(&Signal::LongMessage));
        assert!(result.signals.contains(&Signal::SensitiveTopic));
        assert!(result.score >= 6);
        assert_eq!(result.tier, Tier::High);
    }

    #[test]
    fn vs_needs_word_boundary() {
        let c = HeuristicClassifier::new();
        assert!(c.score("paint on canvas").signals.is_empty());
        assert_eq!(c.score("bill A vs bill B").signals, vec![Signal::Comparison]);
    }

    #[test]
    fn multiple_questions_add_one() {
        let c = HeuristicClassifier::new();
        let result = c.score("When is the vote? Who sponsored it?");
        assert_eq!(result.signals, vec![Signal::MultiQuestion]);
        assert_eq!(result.score, 1);
        assert_eq!(result.tier, Tier::Base);
    }

    #[test]
    fn decimals_are_not_sentence_ends() {
        assert_eq!(count_sentence_ends("Rates rose 3.5 percent"), 0);
        assert_eq!(count_sentence_ends("Really?! Yes."), 2);
        assert_eq!(count_sentence_ends("Wait..."), 1);
    }

    #[test]
    fn multi_issue_requires_minimum_words() {
        let c = HeuristicClassifier::new();
        let short = c.score("Explain the bill as well as the amendment");
        assert!(!short.signals.contains(&Signal::MultiIssue));

        let long = format!(
            "Explain the highway bill {} as well as the amendment",
            "with its many provisions ".repeat(10)
        );
        assert!(c.score(&long).signals.contains(&Signal::MultiIssue));
    }

    #[test]
    fn zero_weight_disables_signal() {
        let config = RoutingConfig {
            comparison_weight: 0,
            ..RoutingConfig::default()
        };
        let c = HeuristicClassifier::from_config(&config).unwrap();
        let result = c.score("compare A versus B");
        assert_eq!(result.score, 0);
        assert_eq!(result.tier, Tier::Base);
    }

    #[test]
    fn huge_weights_saturate_instead_of_wrapping() {
        let config = RoutingConfig {
            comparison_weight: u32::MAX,
            sensitive_topic_weight: u32::MAX,
            ..RoutingConfig::default()
        };
        let c = HeuristicClassifier::from_config(&config).unwrap();
        let result = c.score("Compare the immigration bill versus the House version");
        assert_eq!(result.signals, vec![Signal::Comparison, Signal::SensitiveTopic]);
        assert_eq!(result.score, u32::MAX);
        assert_eq!(result.tier, Tier::High);
    }

    #[test]
    fn extra_keywords_count_as_sensitive() {
        let config = RoutingConfig {
            extra_sensitive_keywords: vec!["tariff".into(), "  ".into()],
            ..RoutingConfig::default()
        };
        let c = HeuristicClassifier::from_config(&config).unwrap();
        assert_eq!(c.score("What about the Tariff?").signals, vec![Signal::SensitiveTopic]);
    }

    #[test]
    fn thresholds_are_configurable() {
        let config = RoutingConfig {
            mid_threshold: 0,
            ..RoutingConfig::default()
        };
        let c = HeuristicClassifier::from_config(&config).unwrap();
        assert_eq!(c.score("hello there").tier, Tier::Mid);
    }

    #[test]
    fn empty_message_is_base() {
        let c = HeuristicClassifier::new();
        assert_eq!(c.score("").tier, Tier::Base);
        assert_eq!(c.score("   ").reason, "empty message");
    }

    #[test]
    fn floor_respects_mode() {
        assert_eq!(apply_floor(Tier::Base, Tier::High, EscalationMode::Sticky), Tier::High);
        assert_eq!(apply_floor(Tier::Base, Tier::High, EscalationMode::PerTurn), Tier::Base);
        assert_eq!(apply_floor(Tier::High, Tier::Mid, EscalationMode::Sticky), Tier::High);
    }

    #[tokio::test]
    async fn trait_classify_applies_floor() {
        let c = HeuristicClassifier::new();
        let tier = c.classify("thanks", Tier::Mid, EscalationMode::Sticky).await;
        assert_eq!(tier, Tier::Mid);
        let tier = c.classify("thanks", Tier::Mid, EscalationMode::PerTurn).await;
        assert_eq!(tier, Tier::Base);
    }
}
