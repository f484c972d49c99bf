// SPDX-FileCopyrightText: 2026 Tiergate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instruction set attached to every run, whatever the tier.

/// Layered on top of each assistant's own instructions. Not configurable.
pub const DISPATCH_INSTRUCTIONS: &str = "Follow these hard rules, in order of priority:\n\
1) Do NOT include filenames, internal IDs, or vector reference markers (e.g., {12:16\u{2020}Press_Releases.txt}).\n\
2) Do NOT invent labels or jargon; use plain, neutral language.\n\
3) Give a concise, policy-first answer.\n\
4) Sources line only: \"Sources: Internal office dataset\" or \"Sources: None from internal dataset\".\n\
5) If no internal files were used, do not imply that any were.\n\
Before sending, self-check that you obeyed 1\u{2013}5; if not, fix and then send.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_five_rules_in_order() {
        let positions: Vec<usize> = ["1) ", "2) ", "3) ", "4) ", "5) "]
            .iter()
            .map(|marker| DISPATCH_INSTRUCTIONS.find(marker).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn names_both_sources_lines() {
        assert!(DISPATCH_INSTRUCTIONS.contains("\"Sources: Internal office dataset\""));
        assert!(DISPATCH_INSTRUCTIONS.contains("\"Sources: None from internal dataset\""));
        assert!(DISPATCH_INSTRUCTIONS.ends_with("if not, fix and then send."));
    }
}
