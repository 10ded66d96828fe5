// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secret masking for anything derived from a prompt or response before
//! it reaches a log line. No full prompt or response is ever logged;
//! callers should only log what this module returns.

use regex::Regex;
use std::sync::OnceLock;

const PREVIEW_MAX_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

fn patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            // Bearer / token headers.
            #[allow(clippy::expect_used)]
            Regex::new(r"(?i)\b(bearer|token)\s+[a-z0-9._\-]{10,}\b").expect("valid regex"),
            // Common vendor API key shapes (sk-..., AKIA..., ghp_..., xox...).
            #[allow(clippy::expect_used)]
            Regex::new(r"\b(sk-[a-zA-Z0-9]{16,}|AKIA[0-9A-Z]{16}|ghp_[a-zA-Z0-9]{20,}|xox[baprs]-[a-zA-Z0-9-]{10,})\b")
                .expect("valid regex"),
            // Generic key=value secret assignments.
            #[allow(clippy::expect_used)]
            Regex::new(r#"(?i)\b(api[_-]?key|secret|password|passwd)\s*[:=]\s*['"]?[a-zA-Z0-9._\-]{6,}['"]?"#)
                .expect("valid regex"),
            // Email addresses.
            #[allow(clippy::expect_used)]
            Regex::new(r"\b[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}\b").expect("valid regex"),
        ]
    })
}

/// Replace anything that looks like a secret with a sentinel string.
pub fn mask(text: &str) -> String {
    let mut masked = text.to_string();
    for pattern in patterns() {
        masked = pattern.replace_all(&masked, REDACTED).into_owned();
    }
    masked
}

/// A masked preview suitable for an INFO-level log line: masked, then
/// truncated to `PREVIEW_MAX_CHARS` characters.
pub fn preview(text: &str) -> String {
    let masked = mask(text);
    if masked.chars().count() <= PREVIEW_MAX_CHARS {
        masked
    } else {
        let truncated: String = masked.chars().take(PREVIEW_MAX_CHARS).collect();
        format!("{truncated}…")
    }
}

#[cfg(test)]
#[path = "masking_tests.rs"]
mod tests;
