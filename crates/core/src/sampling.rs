// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response types exchanged with the client-side MCP sampler.
//! Retry, streaming and JSON-repair behaviour live in the sampling client
//! crate; this module only carries the data.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A sampling request. Construct via [`SamplingRequest::builder`] rather
/// than the struct literal so new optional fields don't break callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
    pub stop_sequences: Vec<String>,
    pub seed: Option<u64>,
    pub logit_bias: HashMap<String, f32>,
    pub stream: bool,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl SamplingRequest {
    pub fn builder(prompt: impl Into<String>) -> SamplingRequestBuilder {
        SamplingRequestBuilder {
            prompt: prompt.into(),
            system_prompt: None,
            temperature: 0.7,
            max_tokens: 1024,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            stop_sequences: Vec::new(),
            seed: None,
            logit_bias: HashMap::new(),
            stream: false,
            metadata: HashMap::new(),
        }
    }
}

/// Builder for [`SamplingRequest`]; `temperature` defaults to 0.7 and
/// `max_tokens` to 1024, matching the prompt manager's baseline defaults.
#[derive(Debug, Clone)]
pub struct SamplingRequestBuilder {
    prompt: String,
    system_prompt: Option<String>,
    temperature: f32,
    max_tokens: u32,
    top_p: Option<f32>,
    frequency_penalty: Option<f32>,
    presence_penalty: Option<f32>,
    stop_sequences: Vec<String>,
    seed: Option<u64>,
    logit_bias: HashMap<String, f32>,
    stream: bool,
    metadata: HashMap<String, serde_json::Value>,
}

impl SamplingRequestBuilder {
    crate::setters! {
        into { system_prompt: String }
        set {
            temperature: f32,
            max_tokens: u32,
            top_p: Option<f32>,
            stream: bool,
            frequency_penalty: Option<f32>,
            presence_penalty: Option<f32>,
            seed: Option<u64>
        }
    }

    pub fn stop_sequence(mut self, s: impl Into<String>) -> Self {
        self.stop_sequences.push(s.into());
        self
    }

    pub fn logit_bias(mut self, token: impl Into<String>, bias: f32) -> Self {
        self.logit_bias.insert(token.into(), bias);
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn build(self) -> SamplingRequest {
        SamplingRequest {
            prompt: self.prompt,
            system_prompt: self.system_prompt,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
            frequency_penalty: self.frequency_penalty,
            presence_penalty: self.presence_penalty,
            stop_sequences: self.stop_sequences,
            seed: self.seed,
            logit_bias: self.logit_bias,
            stream: self.stream,
            metadata: self.metadata,
        }
    }
}

/// Why a sampling call stopped producing tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Complete,
    MaxTokens,
    StopSequence,
    ContentFilter,
    Cancelled,
    Error,
}

crate::simple_display! {
    StopReason {
        Complete => "complete",
        MaxTokens => "max_tokens",
        StopSequence => "stop_sequence",
        ContentFilter => "content_filter",
        Cancelled => "cancelled",
        Error => "error",
    }
}

/// A completed (non-streaming) sampling response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingResponse {
    pub content: String,
    pub model: String,
    pub stop_reason: StopReason,
    pub tokens_used: u32,
}

/// One chunk of a streamed sampling response (`SampleStream`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingChunk {
    pub text: String,
    pub is_final: bool,
    pub tokens_so_far: u32,
    pub model: String,
    pub error: Option<String>,
}

#[cfg(test)]
#[path = "sampling_tests.rs"]
mod tests;
