// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as threshold ordering, non-zero polling intervals, and temperature range.

use tiergate_core::Tier;

use crate::diagnostic::ConfigError;
use crate::model::TiergateConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TiergateConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.server.host.trim().is_empty() {
        fail("server.host must not be empty".to_string());
    }

    let routing = &config.routing;
    if routing.mid_threshold > routing.high_threshold {
        fail(format!(
            "routing.mid_threshold ({}) must not exceed routing.high_threshold ({})",
            routing.mid_threshold, routing.high_threshold
        ));
    }

    if routing.classifier_model.trim().is_empty() {
        fail("routing.classifier_model must not be empty".to_string());
    }

    let openai = &config.openai;
    if openai.poll_interval_ms == 0 {
        fail("openai.poll_interval_ms must be greater than 0".to_string());
    }

    if openai.run_timeout_secs == 0 {
        fail("openai.run_timeout_secs must be greater than 0".to_string());
    }

    if !(0.0..=2.0).contains(&openai.temperature) {
        fail(format!(
            "openai.temperature must be between 0 and 2, got {}",
            openai.temperature
        ));
    }

    if openai.base_url.trim().is_empty() {
        fail("openai.base_url must not be empty".to_string());
    }

    // A present-but-blank identity is almost always an unset env var.
    for tier in Tier::ALL {
        let raw = match tier {
            Tier::Base => config.tiers.base.as_deref(),
            Tier::Mid => config.tiers.mid.as_deref(),
            Tier::High => config.tiers.high.as_deref(),
        };
        if raw.is_some_and(|id| id.trim().is_empty()) {
            fail(format!("tiers.{tier} is set but blank"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
