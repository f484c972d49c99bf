// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text hygiene for the tiergate router.
//!
//! - [`sanitize`]: strips provenance artifacts (reference markers, document
//!   filenames, whitespace runs) from assistant replies before they reach the client.
//! - [`redact`]: masks API keys and configured secret values in log output and
//!   diagnostic traces.

pub mod redact;
pub mod sanitize;

pub use redact::{redact, RedactingWriter};
pub use sanitize::sanitize;
