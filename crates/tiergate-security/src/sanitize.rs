// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Removal of provenance artifacts from assistant replies.
//!
//! Rules run in a fixed order, each on the output of the previous one:
//! 1. reference markers such as `{12:16†Press_Releases.txt}` or `【4:0†source】`
//! 2. bare document filenames (`txt`, `pdf`, `doc(x)`, `ppt(x)`, `xls(x)`)
//! 3. runs of two or more spaces/tabs become one space
//! 4. runs of three or more newlines become one blank line
//! 5. leading and trailing whitespace is trimmed
//!
//! The pipeline is repeated until the text stops changing. Every rule only
//! removes or shortens, so this terminates, and it makes the function idempotent
//! even for nested markers like `{1:2†{3:4†a}b}`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// `{n:m†...}` with ASCII braces, or `【n:m†...】` with wide lenticular brackets.
static REFERENCE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\d+:\d+[†‡][^{}]*\}|【\d+:\d+[†‡][^【】]*】").unwrap()
});

static DOCUMENT_FILENAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b[\w.-]+\.(?:txt|pdf|docx?|pptx?|xlsx?)\b").unwrap()
});

static HORIZONTAL_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{2,}").unwrap());

static NEWLINE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Strip reference markers, document filenames, and excess whitespace.
///
/// Empty input is returned unchanged.
pub fn sanitize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut current = text.to_string();
    loop {
        let next = sanitize_once(&current);
        if next == current {
            break current;
        }
        current = next;
    }
}

fn sanitize_once(text: &str) -> String {
    let step = REFERENCE_MARKER.replace_all(text, "");
    let step = replace_cow(step, &DOCUMENT_FILENAME, "");
    let step = replace_cow(step, &HORIZONTAL_RUN, " ");
    let step = replace_cow(step, &NEWLINE_RUN, "\n\n");
    step.trim().to_string()
}

fn replace_cow<'a>(input: Cow<'a, str>, pattern: &Regex, with: &str) -> Cow<'a, str> {
    match pattern.replace_all(&input, with) {
        Cow::Borrowed(_) => input,
        Cow::Owned(s) => Cow::Owned(s),
    }
}
