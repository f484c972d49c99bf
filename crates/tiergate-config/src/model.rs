// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the tiergate router.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use tiergate_core::Tier;

/// Top-level tiergate configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TiergateConfig {
    /// HTTP listener and runtime environment.
    #[serde(default)]
    pub server: ServerConfig,

    /// OpenAI API settings shared by the assistant backend and the delegated classifier.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Backend identities bound to each tier.
    #[serde(default)]
    pub tiers: TiersConfig,

    /// Classification and escalation policy.
    #[serde(default)]
    pub routing: RoutingConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Runtime environment. Diagnostic traces are withheld in `production`.
    #[serde(default)]
    pub environment: Environment,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// OpenAI API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. Falls back to the `OPENAI_API_KEY` environment variable when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (without trailing slash).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Vector store attached to every run as a `file_search` resource.
    #[serde(default)]
    pub vector_store_id: Option<String>,

    /// Sampling temperature for assistant runs.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Interval between run status polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on waiting for a run to finish, in seconds.
    #[serde(default = "default_run_timeout_secs")]
    pub run_timeout_secs: u64,

    /// Retries for read-only requests on transient errors (429, 500, 503).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-request HTTP timeout, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            vector_store_id: None,
            temperature: default_temperature(),
            poll_interval_ms: default_poll_interval_ms(),
            run_timeout_secs: default_run_timeout_secs(),
            max_retries: default_max_retries(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_run_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    1
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Backend identity (assistant id) and completion cap per tier.
///
/// A tier without an identity is a configuration error only when the
/// escalation policy actually selects it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TiersConfig {
    /// Assistant id for the base tier.
    #[serde(default)]
    pub base: Option<String>,

    /// Assistant id for the mid tier.
    #[serde(default)]
    pub mid: Option<String>,

    /// Assistant id for the high tier.
    #[serde(default)]
    pub high: Option<String>,

    /// Completion token cap for base-tier runs.
    #[serde(default)]
    pub base_max_tokens: Option<u32>,

    /// Completion token cap for mid-tier runs.
    #[serde(default)]
    pub mid_max_tokens: Option<u32>,

    /// Completion token cap for high-tier runs.
    #[serde(default)]
    pub high_max_tokens: Option<u32>,
}

impl TiersConfig {
    /// Returns the non-blank assistant id bound to `tier`.
    pub fn identity_for(&self, tier: Tier) -> Option<&str> {
        let id = match tier {
            Tier::Base => self.base.as_deref(),
            Tier::Mid => self.mid.as_deref(),
            Tier::High => self.high.as_deref(),
        };
        id.map(str::trim).filter(|s| !s.is_empty())
    }

    /// Returns the completion token cap for `tier`, if configured.
    pub fn max_tokens_for(&self, tier: Tier) -> Option<u32> {
        match tier {
            Tier::Base => self.base_max_tokens,
            Tier::Mid => self.mid_max_tokens,
            Tier::High => self.high_max_tokens,
        }
    }

    /// Configuration keys that bind an identity to `tier`, for remediation hints.
    pub fn expected_keys(tier: Tier) -> Vec<String> {
        vec![
            format!("tiers.{tier}"),
            format!("TIERGATE_TIERS_{}", tier.to_string().to_uppercase()),
        ]
    }
}

/// Which classifier strategy assigns tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierStrategy {
    /// Weighted keyword/length signals, no network.
    #[default]
    Heuristic,
    /// Zero-temperature call to a secondary text model.
    Delegated,
}

/// Monotonicity regime for tier decisions within one conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationMode {
    /// Never report a tier below the one the conversation already reached.
    #[default]
    Sticky,
    /// Judge every turn on its own text, allowing de-escalation.
    PerTurn,
}

/// Tier classification and escalation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Classifier strategy.
    #[serde(default)]
    pub strategy: ClassifierStrategy,

    /// Monotonicity regime.
    #[serde(default)]
    pub escalation: EscalationMode,

    /// Model used by the delegated strategy.
    #[serde(default = "default_classifier_model")]
    pub classifier_model: String,

    /// Minimum heuristic score for the mid tier.
    #[serde(default = "default_mid_threshold")]
    pub mid_threshold: u32,

    /// Minimum heuristic score for the high tier.
    #[serde(default = "default_high_threshold")]
    pub high_threshold: u32,

    /// Character count above which a message counts as long.
    #[serde(default = "default_long_message_chars")]
    pub long_message_chars: usize,

    /// Minimum word count for the multi-issue signal to fire.
    #[serde(default = "default_multi_issue_min_words")]
    pub multi_issue_min_words: usize,

    /// Minimum number of sentence-ending marks (`?`, `!`, `.`) for the multi-question signal.
    #[serde(default = "default_multi_question_min")]
    pub multi_question_min: usize,

    /// Weight of comparison language ("compare", "versus", ...).
    #[serde(default = "default_two")]
    pub comparison_weight: u32,

    /// Weight of message length over `long_message_chars`.
    #[serde(default = "default_two")]
    pub long_message_weight: u32,

    /// Weight of sensitive-topic keywords.
    #[serde(default = "default_two")]
    pub sensitive_topic_weight: u32,

    /// Weight of multiple sentence-ending marks.
    #[serde(default = "default_one")]
    pub multi_question_weight: u32,

    /// Weight of multi-issue conjunctions combined with the minimum word count.
    #[serde(default = "default_one")]
    pub multi_issue_weight: u32,

    /// Additional sensitive-topic keywords, matched case-insensitively.
    #[serde(default)]
    pub extra_sensitive_keywords: Vec<String>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            strategy: ClassifierStrategy::default(),
            escalation: EscalationMode::default(),
            classifier_model: default_classifier_model(),
            mid_threshold: default_mid_threshold(),
            high_threshold: default_high_threshold(),
            long_message_chars: default_long_message_chars(),
            multi_issue_min_words: default_multi_issue_min_words(),
            multi_question_min: default_multi_question_min(),
            comparison_weight: default_two(),
            long_message_weight: default_two(),
            sensitive_topic_weight: default_two(),
            multi_question_weight: default_one(),
            multi_issue_weight: default_one(),
            extra_sensitive_keywords: Vec::new(),
        }
    }
}

fn default_classifier_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_mid_threshold() -> u32 {
    2
}

fn default_high_threshold() -> u32 {
    5
}

fn default_long_message_chars() -> usize {
    600
}

fn default_multi_issue_min_words() -> usize {
    40
}

fn default_multi_question_min() -> usize {
    2
}

fn default_two() -> u32 {
    2
}

fn default_one() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_for_ignores_blank_values() {
        let tiers = TiersConfig {
            base: Some("asst_base".into()),
            mid: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(tiers.identity_for(Tier::Base), Some("asst_base"));
        assert_eq!(tiers.identity_for(Tier::Mid), None);
        assert_eq!(tiers.identity_for(Tier::High), None);
    }

    #[test]
    fn expected_keys_name_toml_and_env() {
        assert_eq!(
            TiersConfig::expected_keys(Tier::High),
            vec!["tiers.high".to_string(), "TIERGATE_TIERS_HIGH".to_string()]
        );
    }

    #[test]
    fn routing_defaults() {
        let routing = RoutingConfig::default();
        assert_eq!(routing.strategy, ClassifierStrategy::Heuristic);
        assert_eq!(routing.escalation, EscalationMode::Sticky);
        assert_eq!(routing.mid_threshold, 2);
        assert_eq!(routing.high_threshold, 5);
        assert_eq!(routing.long_message_chars, 600);
    }

    #[test]
    fn escalation_mode_uses_snake_case() {
        let toml_str = "[routing]\nescalation = \"per_turn\"\n";
        let config: TiergateConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.routing.escalation, EscalationMode::PerTurn);
    }

    #[test]
    fn tiers_deny_unknown_fields() {
        let toml_str = "[tiers]\nultra = \"asst_x\"\n";
        assert!(toml::from_str::<TiergateConfig>(toml_str).is_err());
    }
}
