// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI adapters for tiergate.
//!
//! [`OpenAiBackend`] implements [`tiergate_core::AssistantBackend`] on top of the
//! Assistants API (threads, messages, runs). [`OpenAiCompletionModel`] implements
//! [`tiergate_core::CompletionModel`] on top of Chat Completions for the
//! delegated classifier. Both share one [`OpenAiClient`].

pub mod backend;
pub mod client;
pub mod completion;
pub mod types;

use std::time::Duration;

use tiergate_config::model::OpenAiConfig;
use tiergate_core::TiergateError;
use tracing::info;

pub use backend::{OpenAiBackend, RunSettings};
pub use client::OpenAiClient;
pub use completion::OpenAiCompletionModel;

/// Builds a client from configuration.
///
/// # API Key Resolution
/// 1. `openai.api_key` if set and non-empty
/// 2. `OPENAI_API_KEY` environment variable
/// 3. Returns error if neither is available
pub fn client_from_config(config: &OpenAiConfig) -> Result<OpenAiClient, TiergateError> {
    let api_key = resolve_api_key(&config.api_key)?;
    let client = OpenAiClient::new(
        &api_key,
        &config.base_url,
        Duration::from_secs(config.request_timeout_secs),
        config.max_retries,
    )?;
    info!(base_url = %config.base_url, "OpenAI client initialized");
    Ok(client)
}

/// Builds the assistant backend from configuration.
pub fn backend_from_config(
    client: OpenAiClient,
    config: &OpenAiConfig,
) -> OpenAiBackend {
    OpenAiBackend::new(
        client,
        RunSettings {
            temperature: config.temperature,
            vector_store_id: config
                .vector_store_id
                .clone()
                .filter(|id| !id.trim().is_empty()),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            run_timeout: Duration::from_secs(config.run_timeout_secs),
        },
    )
}

/// Resolves the API key from config, falling back to `OPENAI_API_KEY`.
pub fn resolve_api_key(config_key: &Option<String>) -> Result<String, TiergateError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            TiergateError::Internal(
                "OpenAI API key not found. Set openai.api_key in config or OPENAI_API_KEY environment variable.".into(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// Restores an environment variable on drop.
    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: Option<&str>) -> Self {
            let previous = std::env::var(key).ok();
            // SAFETY: env mutation is serialized by #[serial].
            unsafe {
                match value {
                    Some(v) => std::env::set_var(key, v),
                    None => std::env::remove_var(key),
                }
            }
            Self { key, previous }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            // SAFETY: env mutation is serialized by #[serial].
            unsafe {
                match &self.previous {
                    Some(v) => std::env::set_var(self.key, v),
                    None => std::env::remove_var(self.key),
                }
            }
        }
    }

    #[test]
    #[serial]
    fn config_key_wins_over_env() {
        let _guard = EnvGuard::set("OPENAI_API_KEY", Some("sk-env"));
        assert_eq!(resolve_api_key(&Some("sk-config".into())).unwrap(), "sk-config");
    }

    #[test]
    #[serial]
    fn empty_config_key_falls_back_to_env() {
        let _guard = EnvGuard::set("OPENAI_API_KEY", Some("sk-env"));
        assert_eq!(resolve_api_key(&Some(String::new())).unwrap(), "sk-env");
        assert_eq!(resolve_api_key(&None).unwrap(), "sk-env");
    }

    #[test]
    #[serial]
    fn missing_key_is_an_error() {
        let _guard = EnvGuard::set("OPENAI_API_KEY", None);
        let err = resolve_api_key(&None).unwrap_err().to_string();
        assert!(err.contains("API key not found"), "got: {err}");
    }

    #[test]
    #[serial]
    fn blank_vector_store_is_dropped() {
        let _guard = EnvGuard::set("OPENAI_API_KEY", Some("sk-env"));
        let config = OpenAiConfig {
            vector_store_id: Some("  ".into()),
            ..OpenAiConfig::default()
        };
        let client = client_from_config(&config).unwrap();
        let backend = backend_from_config(client, &config);
        assert_eq!(backend.settings().vector_store_id, None);
        assert_eq!(backend.settings().poll_interval, Duration::from_millis(500));
    }
}
