// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic stand-ins for the completion model and the tier classifier.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tiergate_config::model::EscalationMode;
use tiergate_core::{
    CompletionModel, CompletionRequest, HealthStatus, PluginAdapter, Tier, TiergateError,
};
use tiergate_router::{Classification, TierClassifier, apply_floor};

/// A completion model that answers from a FIFO queue.
///
/// `Err` entries are returned as transport errors with that status code.
/// When the queue is empty, the answer is `"base"`.
#[derive(Clone, Default)]
pub struct ScriptedModel {
    answers: Arc<Mutex<VecDeque<Result<String, u16>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a model that gives the listed answers in order.
    pub fn answering<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Arc::new(Mutex::new(
                answers.into_iter().map(|a| Ok(a.into())).collect(),
            )),
            requests: Arc::default(),
        }
    }

    /// Queue an upstream failure with the given HTTP status.
    pub async fn push_failure(&self, status: u16) {
        self.answers.lock().await.push_back(Err(status));
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for ScriptedModel {
    fn name(&self) -> &str {
        "scripted-model"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, TiergateError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    async fn complete(&self, request: CompletionRequest) -> Result<String, TiergateError> {
        self.requests.lock().await.push(request);
        match self.answers.lock().await.pop_front() {
            Some(Ok(answer)) => Ok(answer),
            Some(Err(status)) => Err(TiergateError::Transport {
                status: Some(status),
                message: format!("scripted failure {status}"),
                source: None,
            }),
            None => Ok("base".to_string()),
        }
    }
}

/// A classifier that always reports the same tier and records what it saw.
#[derive(Clone)]
pub struct FixedClassifier {
    tier: Tier,
    seen: Arc<Mutex<Vec<String>>>,
}

impl FixedClassifier {
    pub fn new(tier: Tier) -> Self {
        Self {
            tier,
            seen: Arc::default(),
        }
    }

    /// Texts passed to `assess`, in order.
    pub async fn seen(&self) -> Vec<String> {
        self.seen.lock().await.clone()
    }
}

#[async_trait]
impl TierClassifier for FixedClassifier {
    fn strategy(&self) -> &'static str {
        "fixed"
    }

    async fn assess(&self, latest_user_text: &str) -> Classification {
        self.seen.lock().await.push(latest_user_text.to_string());
        Classification {
            tier: self.tier,
            score: 0,
            signals: Vec::new(),
            reason: "fixed tier".to_string(),
        }
    }

    async fn classify(&self, latest_user_text: &str, current: Tier, mode: EscalationMode) -> Tier {
        apply_floor(self.assess(latest_user_text).await.tier, current, mode)
    }
}
