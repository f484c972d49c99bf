// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for backend integrations.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod backend;
pub mod completion;

pub use adapter::PluginAdapter;
pub use backend::AssistantBackend;
pub use completion::{CompletionModel, CompletionRequest};
