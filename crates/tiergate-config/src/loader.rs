// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./tiergate.toml` > `~/.config/tiergate/tiergate.toml` > `/etc/tiergate/tiergate.toml`
//! with environment variable overrides via `TIERGATE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::TiergateConfig;

/// Top-level sections that environment variables may target.
const SECTIONS: &[&str] = &["server", "openai", "tiers", "routing"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tiergate/tiergate.toml` (system-wide)
/// 3. `~/.config/tiergate/tiergate.toml` (user XDG config)
/// 4. `./tiergate.toml` (local directory)
/// 5. `TIERGATE_*` environment variables
pub fn load_config() -> Result<TiergateConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<TiergateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TiergateConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TiergateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TiergateConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TiergateConfig::default()))
        .merge(Toml::file("/etc/tiergate/tiergate.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("tiergate/tiergate.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("tiergate.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider.
///
/// Only the leading section name is turned into a dot, so
/// `TIERGATE_OPENAI_VECTOR_STORE_ID` maps to `openai.vector_store_id` and
/// `TIERGATE_TIERS_HIGH_MAX_TOKENS` to `tiers.high_max_tokens`.
fn env_provider() -> Env {
    Env::prefixed("TIERGATE_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section)
            && let Some(field) = rest.strip_prefix('_')
        {
            return format!("{section}.{field}");
        }
    }
    key.to_string()
}
