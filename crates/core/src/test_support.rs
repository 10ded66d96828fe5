// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures for downstream crates. Gated behind the
//! `test-support` feature so release builds never link it.

use crate::session::{Session, SessionId, SessionStatus};
use crate::step::StepName;
use std::collections::HashMap;

/// A `Session` with deterministic ids and timestamps, for tests that don't
/// care about clock or id generation specifics.
pub fn sample_session() -> Session {
    Session {
        id: SessionId::from("sess-test0000000000000".to_string()),
        owner_id: "owner-test".to_string(),
        created_at_ms: 1_000,
        updated_at_ms: 1_000,
        expires_at_ms: 1_000 + 3_600_000,
        status: SessionStatus::Active,
        current_stage: StepName::AnalyzeRepository.to_string(),
        labels: HashMap::new(),
        metadata: HashMap::new(),
    }
}
