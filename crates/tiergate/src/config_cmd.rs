// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tiergate config` subcommands.

use tiergate_config::TiergateConfig;
use tiergate_config::model::TiersConfig;
use tiergate_core::{Tier, TiergateError};

const MASK: &str = "********";

/// Print a short summary of a configuration that loaded and validated.
pub fn run_check(config: &TiergateConfig) {
    println!("configuration OK");
    for line in binding_lines(&config.tiers) {
        println!("  {line}");
    }
    println!(
        "  routing: strategy={:?} escalation={:?}",
        config.routing.strategy, config.routing.escalation
    );
}

/// Print the effective configuration as TOML with the API key masked.
pub fn run_show(config: &TiergateConfig) -> Result<(), TiergateError> {
    print!("{}", render_masked(config)?);
    Ok(())
}

fn binding_lines(tiers: &TiersConfig) -> Vec<String> {
    Tier::ALL
        .into_iter()
        .map(|tier| match tiers.identity_for(tier) {
            Some(id) => format!("{tier}: {id}"),
            None => format!(
                "{tier}: unbound (set {})",
                TiersConfig::expected_keys(tier).join(" or ")
            ),
        })
        .collect()
}

fn render_masked(config: &TiergateConfig) -> Result<String, TiergateError> {
    let mut masked = config.clone();
    if masked.openai.api_key.as_deref().is_some_and(|k| !k.is_empty()) {
        masked.openai.api_key = Some(MASK.to_string());
    }
    toml::to_string_pretty(&masked)
        .map_err(|e| TiergateError::Internal(format!("failed to render configuration: {e}")))
}
