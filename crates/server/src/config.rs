// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the server binary.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid LOG_LEVEL {0:?}: expected one of debug, info, warn, error")]
    InvalidLogLevel(String),
    #[error("invalid WORKFLOW_MODE {0:?}: expected one of interactive, automated")]
    InvalidWorkflowMode(String),
    #[error("invalid MAX_SESSIONS {0:?}: expected a positive integer")]
    InvalidMaxSessions(String),
    #[error("invalid SESSION_TTL {0:?}: expected a duration like \"3600\", \"30m\", \"24h\", or \"7d\"")]
    InvalidSessionTtl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowMode {
    Interactive,
    Automated,
}

/// Workspace root every session's isolated directory is created under.
/// `WORKSPACE_DIR` > `./ctz-workspaces`.
pub fn workspace_dir() -> PathBuf {
    std::env::var("WORKSPACE_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("./ctz-workspaces"))
}

/// Path to the embedded session store database file.
/// `STORE_PATH` > `./ctz-store`.
pub fn store_path() -> PathBuf {
    std::env::var("STORE_PATH").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("./ctz-store"))
}

/// How long an idle session survives before `Cleanup` reaps it.
/// `SESSION_TTL` > 24h. Accepts a bare integer (seconds) or a value
/// suffixed with `s`/`m`/`h`/`d`.
pub fn session_ttl() -> Result<Duration, ConfigError> {
    match std::env::var("SESSION_TTL") {
        Ok(raw) => parse_duration(&raw).ok_or(ConfigError::InvalidSessionTtl(raw)),
        Err(_) => Ok(Duration::from_secs(24 * 60 * 60)),
    }
}

fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let (digits, multiplier) = match raw.strip_suffix('s') {
        Some(d) => (d, 1u64),
        None => match raw.strip_suffix('m') {
            Some(d) => (d, 60),
            None => match raw.strip_suffix('h') {
                Some(d) => (d, 60 * 60),
                None => match raw.strip_suffix('d') {
                    Some(d) => (d, 24 * 60 * 60),
                    None => (raw, 1),
                },
            },
        },
    };
    let value: u64 = digits.parse().ok()?;
    Some(Duration::from_secs(value.checked_mul(multiplier)?))
}

/// Upper bound on concurrently tracked sessions. `MAX_SESSIONS` is
/// advisory — reported via `server_status` — rather than enforced by
/// the dispatcher itself, which has no session-count gate (see
/// DESIGN.md). `None` if unset.
pub fn max_sessions() -> Result<Option<usize>, ConfigError> {
    match std::env::var("MAX_SESSIONS") {
        Ok(raw) => {
            let value: usize = raw.parse().map_err(|_| ConfigError::InvalidMaxSessions(raw.clone()))?;
            if value == 0 {
                return Err(ConfigError::InvalidMaxSessions(raw));
            }
            Ok(Some(value))
        }
        Err(_) => Ok(None),
    }
}

/// `LOG_LEVEL` > `info`, validated against the four accepted levels.
pub fn log_level() -> Result<String, ConfigError> {
    let raw = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    match raw.as_str() {
        "debug" | "info" | "warn" | "error" => Ok(raw),
        _ => Err(ConfigError::InvalidLogLevel(raw)),
    }
}

pub fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "ctz-mcp-server".to_string())
}

pub fn service_version() -> String {
    std::env::var("SERVICE_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string())
}

pub fn registry_url() -> Option<String> {
    std::env::var("REGISTRY_URL").ok().filter(|s| !s.is_empty())
}

pub fn registry_username() -> Option<String> {
    std::env::var("REGISTRY_USERNAME").ok().filter(|s| !s.is_empty())
}

pub fn registry_password() -> Option<String> {
    std::env::var("REGISTRY_PASSWORD").ok().filter(|s| !s.is_empty())
}

/// `WORKFLOW_MODE` > `interactive`.
pub fn workflow_mode() -> Result<WorkflowMode, ConfigError> {
    let raw = std::env::var("WORKFLOW_MODE").unwrap_or_else(|_| "interactive".to_string());
    match raw.as_str() {
        "interactive" => Ok(WorkflowMode::Interactive),
        "automated" => Ok(WorkflowMode::Automated),
        _ => Err(ConfigError::InvalidWorkflowMode(raw)),
    }
}

/// Directory of custom policy rule documents. `None` falls back to the
/// built-in bundle.
pub fn policy_path() -> Option<PathBuf> {
    std::env::var("POLICY_PATH").ok().filter(|s| !s.is_empty()).map(PathBuf::from)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
