// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delegated tier classification through a secondary text model.

use std::sync::Arc;

use async_trait::async_trait;
use tiergate_core::{CompletionModel, CompletionRequest, Tier, TiergateError};
use tracing::{debug, warn};

use crate::classifier::{Classification, TierClassifier};

/// Instructions sent with every classification call.
const CLASSIFIER_PROMPT: &str = "You route questions sent to a legislative office assistant. \
Pick the cheapest tier that can answer the question well.\n\
- base: short factual or procedural questions, greetings, simple lookups.\n\
- mid: questions that need some synthesis, a short comparison, or careful wording.\n\
- high: multi-part analysis, detailed comparisons across sources, or sensitive legal, \
ethical, or political matters.\n\
Answer with exactly one word: base, mid, or high.";

/// Room for one label plus stray punctuation.
const LABEL_MAX_TOKENS: u32 = 5;

/// Asks a secondary model which tier a message needs.
///
/// Any failure (transport error, unparseable answer) falls back to the base
/// tier. Classification never fails a request.
pub struct DelegatedClassifier {
    model: Arc<dyn CompletionModel>,
    model_name: String,
}

impl DelegatedClassifier {
    pub fn new(model: Arc<dyn CompletionModel>, model_name: impl Into<String>) -> Self {
        Self {
            model,
            model_name: model_name.into(),
        }
    }

    async fn ask(&self, text: &str) -> Result<Tier, TiergateError> {
        let request = CompletionRequest {
            model: self.model_name.clone(),
            system: CLASSIFIER_PROMPT.to_string(),
            user: text.to_string(),
            temperature: 0.0,
            max_tokens: LABEL_MAX_TOKENS,
        };
        let answer = self.model.complete(request).await?;
        parse_answer(&answer)
            .ok_or_else(|| TiergateError::Classification(format!("unrecognized label: {answer:?}")))
    }
}

#[async_trait]
impl TierClassifier for DelegatedClassifier {
    fn strategy(&self) -> &'static str {
        "delegated"
    }

    async fn assess(&self, latest_user_text: &str) -> Classification {
        if latest_user_text.trim().is_empty() {
            return Classification::fallback("empty message");
        }
        match self.ask(latest_user_text).await {
            Ok(tier) => {
                debug!(model = %self.model_name, tier = %tier, "delegated classification");
                Classification {
                    tier,
                    score: 0,
                    signals: Vec::new(),
                    reason: format!("labelled by {}", self.model_name),
                }
            }
            Err(e) => {
                warn!(model = %self.model_name, error = %e, "delegated classification failed, using base tier");
                Classification::fallback(format!("fallback: {e}"))
            }
        }
    }
}

/// Accept a bare label, optionally quoted or followed by punctuation.
fn parse_answer(answer: &str) -> Option<Tier> {
    let cleaned = answer
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.' || c == '!');
    Tier::parse_label(Some(cleaned))
}
