// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The response envelope every tool call returns, plus the redirect
//! and repair-prompt shapes the redirect planner attaches to a
//! recoverable failure.

use ctz_core::{CoreError, ErrorClass};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The outer shape every tool call returns, success or failure alike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResponse {
    pub success: bool,
    pub session_id: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_result: Option<StepResultPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_metadata: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<RedirectPayload>,
}

impl DispatchResponse {
    pub fn success(session_id: impl Into<String>, step_result: StepResultPayload) -> Self {
        Self {
            success: true,
            session_id: session_id.into(),
            timestamp: now_rfc3339(),
            step_result: Some(step_result),
            step_metadata: None,
            error: None,
            redirect: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.step_metadata = Some(metadata);
        self
    }

    /// A terminal failure: no redirect, the caller must surface this to
    /// its own user.
    pub fn failure(session_id: impl Into<String>, error: &CoreError) -> Self {
        Self {
            success: false,
            session_id: session_id.into(),
            timestamp: now_rfc3339(),
            step_result: None,
            step_metadata: None,
            error: Some(ErrorPayload::from(error)),
            redirect: None,
        }
    }

    /// A recoverable failure: the client is told which tool to call next
    /// and handed a corrective prompt to include in that call.
    pub fn redirected(session_id: impl Into<String>, error: &CoreError, redirect: RedirectPayload) -> Self {
        Self {
            success: false,
            session_id: session_id.into(),
            timestamp: now_rfc3339(),
            step_result: None,
            step_metadata: None,
            error: Some(ErrorPayload::from(error)),
            redirect: Some(redirect),
        }
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// The per-step outcome: whether the step itself reports success, plus
/// whatever typed data it produced, carried here as a loose JSON map so
/// the envelope stays uniform across very different step shapes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResultPayload {
    pub success: bool,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl StepResultPayload {
    pub fn ok(data: Map<String, Value>) -> Self {
        Self { success: true, data }
    }

    pub fn failed(data: Map<String, Value>) -> Self {
        Self { success: false, data }
    }
}

/// A classified error, safe to hand to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub class: String,
    pub message: String,
}

impl From<&CoreError> for ErrorPayload {
    fn from(error: &CoreError) -> Self {
        Self { class: error.class.as_str().to_string(), message: error.message.clone() }
    }
}

impl ErrorPayload {
    pub fn class(&self) -> Option<ErrorClass> {
        match self.class.as_str() {
            "validation" => Some(ErrorClass::Validation),
            "not_found" => Some(ErrorClass::NotFound),
            "already_exists" => Some(ErrorClass::AlreadyExists),
            "transient" => Some(ErrorClass::Transient),
            "handler_failure" => Some(ErrorClass::HandlerFailure),
            "cancelled" => Some(ErrorClass::Cancelled),
            "fatal" => Some(ErrorClass::Fatal),
            _ => None,
        }
    }
}

/// Tells the client which tool to call next to correct a recoverable
/// failure, and why.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectPayload {
    pub next_tool: String,
    pub reason: String,
    pub prompt: RepairPrompt,
}

/// The corrective prompt handed back alongside a redirect, framed so
/// the client's model can retry the failed step with a fix in hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairPrompt {
    pub system: String,
    pub user: String,
    pub expected_output: String,
    pub strategy: String,
}

impl RepairPrompt {
    pub fn new(
        system: impl Into<String>,
        user: impl Into<String>,
        expected_output: impl Into<String>,
        strategy: impl Into<String>,
    ) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            expected_output: expected_output.into(),
            strategy: strategy.into(),
        }
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
