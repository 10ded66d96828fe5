// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Small deterministic fallbacks handlers reach for when no AI client
//! is configured, or when the sampled result still needs a sane
//! default to fall back on.

/// Candidate base images for a detected language, most-preferred
/// first. Used by `resolve_base_images` when no AI client is wired in.
pub fn base_image_candidates(language: &str) -> Vec<String> {
    let images: &[&str] = match language.to_ascii_lowercase().as_str() {
        "node" | "javascript" | "typescript" => {
            &["node:20-alpine", "node:20-slim", "node:20"]
        }
        "python" => &["python:3.12-slim", "python:3.12-alpine", "python:3.12"],
        "go" => &["golang:1.22-alpine", "gcr.io/distroless/static-debian12"],
        "rust" => &["rust:1.78-slim", "gcr.io/distroless/cc-debian12"],
        "java" => &["eclipse-temurin:21-jre-alpine", "eclipse-temurin:21-jre"],
        _ => &["debian:bookworm-slim"],
    };
    images.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
#[path = "support_tests.rs"]
mod tests;
