// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Secret redaction for log output and error diagnostics.
//!
//! Two complementary mechanisms:
//! 1. **Regex-based**: Catches known secret formats (OpenAI keys, Bearer tokens).
//! 2. **Exact-match**: Catches configured secret values loaded at startup.

use std::io::Write;
use std::sync::{Arc, LazyLock, RwLock};

use regex::Regex;

/// Known secret patterns to redact from output.
static REDACTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // OpenAI keys: sk-..., sk-proj-..., sk-svcacct-...
        Regex::new(r"sk-[a-zA-Z0-9_\-]{20,}").unwrap(),
        // Bearer tokens in headers
        Regex::new(r"Bearer\s+[a-zA-Z0-9._\-]{10,}").unwrap(),
    ]
});

/// The redaction placeholder.
const REDACTED: &str = "[REDACTED]";

/// Redact secrets from a string using regex patterns and exact-match values.
pub fn redact(input: &str, secret_values: &[String]) -> String {
    let mut result = input.to_string();

    for pattern in REDACTION_PATTERNS.iter() {
        result = pattern.replace_all(&result, REDACTED).into_owned();
    }

    // Longest first so a secret containing another secret is masked whole.
    let mut sorted: Vec<&String> = secret_values.iter().filter(|v| !v.is_empty()).collect();
    sorted.sort_by_key(|v| std::cmp::Reverse(v.len()));
    for value in sorted {
        result = result.replace(value.as_str(), REDACTED);
    }

    result
}

/// A writer wrapper that redacts secrets from everything written through it.
///
/// Installed as the tracing writer so log lines never carry API keys.
pub struct RedactingWriter<W> {
    inner: W,
    secret_values: Arc<RwLock<Vec<String>>>,
}

impl<W: Write> RedactingWriter<W> {
    pub fn new(inner: W, secret_values: Arc<RwLock<Vec<String>>>) -> Self {
        Self {
            inner,
            secret_values,
        }
    }

    /// Add a value to the shared redaction list.
    pub fn add_secret(secret_values: &Arc<RwLock<Vec<String>>>, value: String) {
        if let Ok(mut values) = secret_values.write()
            && !value.is_empty()
            && !values.contains(&value)
        {
            values.push(value);
        }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let input = String::from_utf8_lossy(buf);
        let secrets = self
            .secret_values
            .read()
            .map(|v| v.clone())
            .unwrap_or_default();
        self.inner.write_all(redact(&input, &secrets).as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
