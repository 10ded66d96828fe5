// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identity and the durable record tracked by the session store.
//!
//! A [`Session`] is the unit of durability for the whole pipeline: every
//! artifact, every step transition, and every redirect is scoped to exactly
//! one session id. See `ctz-storage` for the store that persists these and
//! `ctz-workflow` for the typed artifact container keyed by session id.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

/// Unique identifier for a workflow session.
///
/// Opaque from the core's point of view — callers mint these however they
/// like (the dispatcher accepts any non-empty string supplied by the client).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for SessionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SessionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Suspended,
    Expired,
    Terminated,
}

crate::simple_display! {
    SessionStatus {
        Active => "active",
        Suspended => "suspended",
        Expired => "expired",
        Terminated => "terminated",
    }
}

/// Durable session record persisted by the session store.
///
/// Invariants: `updated_at_ms >= created_at_ms`; a session whose
/// `expires_at_ms` has passed is invisible to normal reads; ids are unique
/// across all live sessions (enforced by the store, not this type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub owner_id: String,
    pub created_at_ms: u64,
    pub updated_at_ms: u64,
    pub expires_at_ms: u64,
    pub status: SessionStatus,
    /// Name of the current workflow stage (mirrors `WorkflowState::current_step`).
    pub current_stage: String,
    pub labels: HashMap<String, String>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Session {
    /// Construct a freshly created session with the given TTL, active from `now_ms`.
    pub fn new(id: SessionId, owner_id: impl Into<String>, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            id,
            owner_id: owner_id.into(),
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
            expires_at_ms: now_ms.saturating_add(ttl_ms),
            status: SessionStatus::Active,
            current_stage: String::new(),
            labels: HashMap::new(),
            metadata: HashMap::new(),
        }
    }

    /// True when `expires_at_ms` has passed relative to `now_ms`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at_ms < now_ms
    }

    /// Refresh `updated_at_ms` and push `expires_at_ms` out by `ttl_ms` (Session Manager `Touch`).
    pub fn touch(&mut self, now_ms: u64, ttl_ms: u64) {
        self.updated_at_ms = now_ms;
        self.expires_at_ms = now_ms.saturating_add(ttl_ms);
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
