// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tiergate serve` command implementation.
//!
//! Wires the OpenAI client, classifier strategy, escalation policy, and
//! orchestrator into the HTTP gateway, then serves until a shutdown signal.

use std::sync::{Arc, RwLock};

use tiergate_config::TiergateConfig;
use tiergate_config::model::{ClassifierStrategy, TiersConfig};
use tiergate_core::{CompletionModel, Tier, TiergateError};
use tiergate_gateway::{GatewayState, start_server};
use tiergate_openai::{
    OpenAiCompletionModel, backend_from_config, client_from_config, resolve_api_key,
};
use tiergate_orchestrator::Orchestrator;
use tiergate_router::{EscalationPolicy, classifier_from_config};
use tiergate_security::RedactingWriter;
use tracing::{info, warn};

use crate::shutdown;

/// Runs the `tiergate serve` command.
pub async fn run_serve(config: TiergateConfig) -> Result<(), TiergateError> {
    let secrets = Arc::new(RwLock::new(Vec::new()));
    init_tracing(&config.server.log_level, secrets.clone());

    info!("starting tiergate serve");

    let state = build_state(&config, secrets)?;
    warn_unbound_tiers(&config.tiers);

    let cancel = shutdown::install_signal_handler();
    start_server(&config.server.host, config.server.port, state, async move {
        cancel.cancelled().await;
    })
    .await?;

    info!("tiergate serve shutdown complete");
    Ok(())
}

/// Build the gateway state from configuration.
///
/// The resolved API key is added to `secrets` so it is masked in logs and
/// error traces.
pub fn build_state(
    config: &TiergateConfig,
    secrets: Arc<RwLock<Vec<String>>>,
) -> Result<GatewayState, TiergateError> {
    let api_key = resolve_api_key(&config.openai.api_key)?;
    RedactingWriter::<std::io::Stderr>::add_secret(&secrets, api_key);

    let client = client_from_config(&config.openai)?;

    let model: Option<Arc<dyn CompletionModel>> = match config.routing.strategy {
        ClassifierStrategy::Delegated => Some(Arc::new(OpenAiCompletionModel::new(client.clone()))),
        ClassifierStrategy::Heuristic => None,
    };
    let classifier = classifier_from_config(&config.routing, model)?;
    let policy = EscalationPolicy::new(classifier, config.routing.escalation);
    info!(
        strategy = policy.strategy(),
        escalation = ?policy.mode(),
        "routing policy ready"
    );

    let backend = Arc::new(backend_from_config(client, &config.openai));
    let orchestrator = Orchestrator::new(backend, policy, config.tiers.clone());

    Ok(GatewayState::new(Arc::new(orchestrator), config.server.environment).with_secrets(secrets))
}

/// Unbound tiers are legal but every request routed to one fails with 400.
fn warn_unbound_tiers(tiers: &TiersConfig) {
    for tier in Tier::ALL {
        if tiers.identity_for(tier).is_none() {
            warn!(
                tier = %tier,
                expected_keys = ?TiersConfig::expected_keys(tier),
                "no assistant bound for tier"
            );
        }
    }
}

/// Initializes the tracing subscriber with the given log level.
///
/// Output goes to stderr through a [`RedactingWriter`].
fn init_tracing(log_level: &str, secrets: Arc<RwLock<Vec<String>>>) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tiergate={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(move || RedactingWriter::new(std::io::stderr(), secrets.clone()))
        .init();
}
