// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tier selection for tiergate.
//!
//! Two interchangeable classifier strategies feed one escalation policy:
//! - [`HeuristicClassifier`] scores weighted signals locally
//! - [`DelegatedClassifier`] asks a secondary text model for a label
//!
//! [`EscalationPolicy`] layers forced tiers, client hints, and the
//! sticky/per-turn monotonicity regime on top of whichever strategy is active.

pub mod classifier;
pub mod delegated;
pub mod policy;

use std::sync::Arc;

use tiergate_config::model::{ClassifierStrategy, RoutingConfig};
use tiergate_core::{CompletionModel, TiergateError};

pub use classifier::{Classification, HeuristicClassifier, Signal, TierClassifier, apply_floor};
pub use delegated::DelegatedClassifier;
pub use policy::{DecisionReason, EscalationPolicy, RoutingDecision};

/// Build the configured classifier strategy.
///
/// The delegated strategy needs a completion model; the heuristic one ignores it.
pub fn classifier_from_config(
    config: &RoutingConfig,
    model: Option<Arc<dyn CompletionModel>>,
) -> Result<Arc<dyn TierClassifier>, TiergateError> {
    match config.strategy {
        ClassifierStrategy::Heuristic => Ok(Arc::new(HeuristicClassifier::from_config(config)?)),
        ClassifierStrategy::Delegated => {
            let model = model.ok_or_else(|| {
                TiergateError::Internal("delegated strategy requires a completion model".into())
            })?;
            Ok(Arc::new(DelegatedClassifier::new(
                model,
                config.classifier_model.clone(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heuristic_needs_no_model() {
        let classifier = classifier_from_config(&RoutingConfig::default(), None).unwrap();
        assert_eq!(classifier.strategy(), "heuristic");
    }

    #[test]
    fn delegated_without_model_is_an_error() {
        let config = RoutingConfig {
            strategy: ClassifierStrategy::Delegated,
            ..RoutingConfig::default()
        };
        assert!(classifier_from_config(&config, None).is_err());
    }
}
