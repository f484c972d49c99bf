// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the tiergate router.

use thiserror::Error;

use crate::types::Tier;

/// The primary error type used across all tiergate adapter traits and core operations.
#[derive(Debug, Error)]
pub enum TiergateError {
    /// The resolved tier has no backend identity bound in configuration.
    #[error("no backend identity configured for tier `{tier}`")]
    Configuration {
        tier: Tier,
        /// Configuration keys that would satisfy the binding.
        expected_keys: Vec<String>,
    },

    /// Failure reaching the backend (network, auth, rate limit, bad response).
    #[error("transport error: {message}")]
    Transport {
        /// Upstream HTTP status, when the backend answered at all.
        status: Option<u16>,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A backend run did not reach a terminal state within the bounded wait.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// A backend run reached a terminal state other than `completed`.
    #[error("backend run ended with status `{status}`: {reason}")]
    RunFailed { status: String, reason: String },

    /// The delegated classifier failed or produced an unparseable label.
    #[error("classification error: {0}")]
    Classification(String),

    /// The inbound request could not be interpreted.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TiergateError {
    /// Stable machine-readable tag exposed in error bodies.
    pub fn tag(&self) -> &'static str {
        match self {
            TiergateError::Configuration { .. } => "configuration_error",
            TiergateError::Transport { .. } => "transport_error",
            TiergateError::Timeout { .. } => "timeout",
            TiergateError::RunFailed { .. } => "run_failed",
            TiergateError::Classification(_) => "classification_error",
            TiergateError::InvalidRequest(_) => "invalid_request",
            TiergateError::Internal(_) => "internal_error",
        }
    }

    /// HTTP status code the gateway reports for this error.
    ///
    /// Transport errors surface the upstream status when it is an error status,
    /// otherwise 500.
    pub fn http_status(&self) -> u16 {
        match self {
            TiergateError::Configuration { .. } | TiergateError::InvalidRequest(_) => 400,
            TiergateError::Transport { status, .. } => match status {
                Some(code) if (400..600).contains(code) => *code,
                _ => 500,
            },
            TiergateError::Timeout { .. } => 504,
            TiergateError::RunFailed { .. } => 502,
            TiergateError::Classification(_) | TiergateError::Internal(_) => 500,
        }
    }

    /// Convenience constructor for transport errors without an upstream status.
    pub fn transport(message: impl Into<String>) -> Self {
        TiergateError::Transport {
            status: None,
            message: message.into(),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_is_400() {
        let err = TiergateError::Configuration {
            tier: Tier::Mid,
            expected_keys: vec![],
        };
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.tag(), "configuration_error");
        assert!(err.to_string().contains("mid"));
    }

    #[test]
    fn transport_error_uses_upstream_status() {
        let err = TiergateError::Transport {
            status: Some(429),
            message: "rate limited".into(),
            source: None,
        };
        assert_eq!(err.http_status(), 429);
    }

    #[test]
    fn transport_error_without_status_is_500() {
        assert_eq!(TiergateError::transport("connection refused").http_status(), 500);

        // A success code from upstream is never echoed as an error status.
        let err = TiergateError::Transport {
            status: Some(200),
            message: "unparseable body".into(),
            source: None,
        };
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn timeout_and_run_failure_statuses() {
        let timeout = TiergateError::Timeout {
            duration: std::time::Duration::from_secs(1),
        };
        assert_eq!(timeout.http_status(), 504);
        assert_eq!(timeout.tag(), "timeout");

        let failed = TiergateError::RunFailed {
            status: "expired".into(),
            reason: "run expired".into(),
        };
        assert_eq!(failed.http_status(), 502);
        assert_eq!(failed.tag(), "run_failed");
    }
}
