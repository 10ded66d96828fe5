// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parameter validation shared by every tool call: `session_id`
//! presence, the per-tool required set, and empty-string rejection for
//! required string fields.

use ctz_core::CoreError;
use serde_json::{Map, Value};

pub const SESSION_ID: &str = "session_id";

/// Validates that `session_id` is present and non-empty, then that
/// every name in `required` is present and, if a string, non-empty.
pub fn validate_required(params: &Map<String, Value>, required: &[&str]) -> Result<(), CoreError> {
    require_non_empty_string(params, SESSION_ID)?;
    for field in required {
        require_present(params, field)?;
    }
    Ok(())
}

fn require_present(params: &Map<String, Value>, field: &str) -> Result<(), CoreError> {
    match params.get(field) {
        None | Some(Value::Null) => {
            Err(CoreError::validation(format!("missing required parameter: {field}")))
        }
        Some(Value::String(s)) if s.is_empty() => {
            Err(CoreError::validation(format!("required parameter must not be empty: {field}")))
        }
        Some(_) => Ok(()),
    }
}

fn require_non_empty_string(params: &Map<String, Value>, field: &str) -> Result<(), CoreError> {
    match params.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(()),
        Some(Value::String(_)) => {
            Err(CoreError::validation(format!("required parameter must not be empty: {field}")))
        }
        _ => Err(CoreError::validation(format!("missing required parameter: {field}"))),
    }
}

/// Convenience accessor for a required string field, assumed already
/// validated by [`validate_required`].
pub fn string_field<'a>(params: &'a Map<String, Value>, field: &str) -> Result<&'a str, CoreError> {
    params
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| CoreError::validation(format!("missing required parameter: {field}")))
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
