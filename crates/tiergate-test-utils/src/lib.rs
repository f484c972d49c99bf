// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for tiergate integration tests.
//!
//! Provides fake adapters for fast, deterministic, CI-runnable tests without
//! network access.
//!
//! # Components
//!
//! - [`MemoryBackend`] - In-memory assistant backend with scripted replies and failure injection
//! - [`ScriptedModel`] - Completion model answering from a queue
//! - [`FixedClassifier`] - Tier classifier that always returns one tier
//! - [`test_config`] - Configuration with every tier bound to a fake assistant id

pub mod memory_backend;
pub mod scripted;

pub use memory_backend::{BackendCall, FailPoint, MemoryBackend};
pub use scripted::{FixedClassifier, ScriptedModel};

use tiergate_config::TiergateConfig;

/// Configuration with all three tiers bound to `asst_base`, `asst_mid`, `asst_high`.
pub fn test_config() -> TiergateConfig {
    let mut config = TiergateConfig::default();
    config.tiers.base = Some("asst_base".into());
    config.tiers.mid = Some("asst_mid".into());
    config.tiers.high = Some("asst_high".into());
    config
}
