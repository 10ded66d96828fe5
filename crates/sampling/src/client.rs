// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resilience wrapper around the client-side MCP sampler: retry with
//! backoff for single-shot sampling, token-progress streaming, and
//! schema-validated JSON extraction with self-repair.

use crate::masking;
use async_trait::async_trait;
use ctz_core::{SamplingChunk, SamplingRequest, SamplingResponse};
use rand::Rng;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const DEFAULT_MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_secs(1);
const BACKOFF_FACTOR: u32 = 2;
const BACKOFF_CAP: Duration = Duration::from_secs(30);
const MAX_REPAIR_PASSES: u32 = 2;
const TOKEN_PROGRESS_INTERVAL: u32 = 10;

#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("sampling transport error: {0}")]
    Transport(String),
    #[error("rate limited by sampler")]
    RateLimited,
    #[error("sampler returned server error {status}")]
    Server { status: u16 },
    #[error("sampling cancelled")]
    Cancelled,
    #[error("sampled output did not match the expected schema: {0}")]
    SchemaInvalid(String),
    #[error("sampler error: {0}")]
    Other(String),
}

impl SamplingError {
    /// Only transport errors, 429s, and 5xx responses are retried;
    /// schema failures and cancellation are not.
    fn is_retryable(&self) -> bool {
        matches!(self, SamplingError::Transport(_) | SamplingError::RateLimited)
            || matches!(self, SamplingError::Server { status } if *status >= 500)
    }
}

/// The raw, single-attempt collaborator interface: one call to the
/// client-side MCP sampler with no retry or repair logic of its own.
/// A concrete transport adapter implements this; everything else in
/// this crate is transport-independent.
#[async_trait]
pub trait Sampler: Send + Sync {
    async fn sample_once(
        &self,
        request: &SamplingRequest,
        cancel: &CancellationToken,
    ) -> Result<SamplingResponse, SamplingError>;

    /// Stream a single sample. Implementations must send a terminal
    /// chunk with `is_final = true` exactly once, then drop `tx`.
    async fn stream_once(
        &self,
        request: &SamplingRequest,
        cancel: &CancellationToken,
        tx: mpsc::Sender<SamplingChunk>,
    );
}

#[async_trait]
impl Sampler for std::sync::Arc<dyn Sampler> {
    async fn sample_once(
        &self,
        request: &SamplingRequest,
        cancel: &CancellationToken,
    ) -> Result<SamplingResponse, SamplingError> {
        self.as_ref().sample_once(request, cancel).await
    }

    async fn stream_once(
        &self,
        request: &SamplingRequest,
        cancel: &CancellationToken,
        tx: mpsc::Sender<SamplingChunk>,
    ) {
        self.as_ref().stream_once(request, cancel, tx).await
    }
}

/// Wraps a [`Sampler`] with retry/backoff, streaming, and schema-guided
/// JSON extraction.
pub struct SamplingClient<S: Sampler> {
    sampler: S,
    max_attempts: u32,
}

impl<S: Sampler> SamplingClient<S> {
    pub fn new(sampler: S) -> Self {
        Self { sampler, max_attempts: DEFAULT_MAX_ATTEMPTS }
    }

    pub fn with_max_attempts(sampler: S, max_attempts: u32) -> Self {
        Self { sampler, max_attempts: max_attempts.max(1) }
    }

    /// Single-shot sample with exponential backoff on retryable errors.
    pub async fn sample(
        &self,
        request: &SamplingRequest,
        cancel: &CancellationToken,
    ) -> Result<SamplingResponse, SamplingError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            if cancel.is_cancelled() {
                return Err(SamplingError::Cancelled);
            }

            tracing::info!(
                attempt,
                max_tokens = request.max_tokens,
                temperature = request.temperature,
                prompt_preview = %masking::preview(&request.prompt),
                "llm.request"
            );

            let started = std::time::Instant::now();
            let outcome = self.sampler.sample_once(request, cancel).await;
            let elapsed = started.elapsed();

            match &outcome {
                Ok(response) => {
                    tracing::info!(
                        attempt,
                        latency_ms = elapsed.as_millis() as u64,
                        model = %response.model,
                        tokens_used = response.tokens_used,
                        prompt_preview = %masking::preview(&request.prompt),
                        "llm.response"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        latency_ms = elapsed.as_millis() as u64,
                        error = %e,
                        prompt_preview = %masking::preview(&request.prompt),
                        "llm.error"
                    );
                }
            }

            match outcome {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    let delay = backoff_delay(attempt);
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.cancelled() => return Err(SamplingError::Cancelled),
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Stream chunks from a single sample attempt (not retried; a
    /// transport failure mid-stream is surfaced on the final chunk).
    pub async fn sample_stream(
        &self,
        request: &SamplingRequest,
        cancel: &CancellationToken,
    ) -> mpsc::Receiver<SamplingChunk> {
        let (tx, rx) = mpsc::channel(16);
        self.sampler.stream_once(request, cancel, tx).await;
        rx
    }

    /// Sample, enforcing JSON-only output with up to [`MAX_REPAIR_PASSES`]
    /// self-repair attempts if the raw output doesn't parse or doesn't
    /// satisfy `schema`.
    pub async fn sample_json_with_schema(
        &self,
        request: &SamplingRequest,
        schema: Option<&serde_json::Value>,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, SamplingError> {
        let mut current = request.clone();
        current.system_prompt = Some(strengthen_for_json(current.system_prompt.as_deref()));

        let mut last_error = String::new();
        for pass in 0..=MAX_REPAIR_PASSES {
            let response = self.sample(&current, cancel).await?;
            match parse_candidate(&response.content) {
                Ok(value) => match validate_schema(&value, schema) {
                    Ok(()) => return Ok(value),
                    Err(e) => last_error = e,
                },
                Err(e) => last_error = e,
            }

            if pass == MAX_REPAIR_PASSES {
                break;
            }
            current = repair_request(&current, &response.content, &last_error);
        }

        Err(SamplingError::SchemaInvalid(last_error))
    }
}

fn backoff_delay(attempt: u32) -> Duration {
    let exp = BACKOFF_FACTOR.saturating_pow(attempt.saturating_sub(1));
    let raw = BACKOFF_BASE.saturating_mul(exp).min(BACKOFF_CAP);
    let jitter_ms = rand::thread_rng().gen_range(0..=(raw.as_millis() as u64 / 4).max(1));
    raw + Duration::from_millis(jitter_ms)
}

fn strengthen_for_json(existing: Option<&str>) -> String {
    let instruction = "Respond with ONLY valid JSON. Do not include prose, explanations, or markdown code fences.";
    match existing {
        Some(system) if !system.is_empty() => format!("{system}\n\n{instruction}"),
        _ => instruction.to_string(),
    }
}

fn parse_candidate(raw: &str) -> Result<serde_json::Value, String> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) {
        return Ok(value);
    }
    match extract_balanced_block(raw) {
        Some(block) => serde_json::from_str(&block).map_err(|e| e.to_string()),
        None => Err("no JSON value found in output".to_string()),
    }
}

/// Extract the first balanced `{...}` or `[...]` block, ignoring
/// braces/brackets inside string literals.
fn extract_balanced_block(raw: &str) -> Option<String> {
    let bytes: Vec<char> = raw.chars().collect();
    let start = bytes.iter().position(|c| *c == '{' || *c == '[')?;
    let (open, close) = match bytes[start] {
        '{' => ('{', '}'),
        _ => ('[', ']'),
    };

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if *c == '\\' {
                escaped = true;
            } else if *c == '"' {
                in_string = false;
            }
            continue;
        }
        match *c {
            '"' => in_string = true,
            c if c == open => depth += 1,
            c if c == close => {
                depth -= 1;
                if depth == 0 {
                    let end = start + offset + 1;
                    return Some(bytes[start..end].iter().collect());
                }
            }
            _ => {}
        }
    }
    None
}

fn validate_schema(value: &serde_json::Value, schema: Option<&serde_json::Value>) -> Result<(), String> {
    let Some(schema) = schema else {
        return Ok(());
    };
    let compiled = jsonschema::validator_for(schema).map_err(|e| format!("invalid schema: {e}"))?;
    let errors: Vec<String> = compiled.iter_errors(value).map(|e| e.to_string()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

fn repair_request(previous: &SamplingRequest, candidate: &str, error: &str) -> SamplingRequest {
    let mut repaired = previous.clone();
    repaired.temperature = 0.0;
    repaired.prompt = format!(
        "The previous output was not valid JSON:\n\n{candidate}\n\nError: {error}\n\nOutput ONLY valid JSON that fixes this.",
    );
    repaired
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
