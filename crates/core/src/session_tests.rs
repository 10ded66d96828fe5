// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn new_session_is_active_and_not_yet_expired() {
    let s = Session::new(SessionId::new("sess-1"), "agent-zero", 1_000, 60_000);
    assert_eq!(s.status, SessionStatus::Active);
    assert_eq!(s.created_at_ms, s.updated_at_ms);
    assert!(!s.is_expired(1_000));
    assert!(!s.is_expired(60_999));
}

#[test]
fn session_expires_strictly_after_ttl_elapses() {
    let s = Session::new(SessionId::new("sess-1"), "agent-zero", 1_000, 60_000);
    assert!(s.is_expired(61_001));
}

#[test]
fn touch_extends_expiry_and_bumps_updated_at() {
    let mut s = Session::new(SessionId::new("sess-1"), "agent-zero", 1_000, 60_000);
    s.touch(5_000, 60_000);
    assert_eq!(s.updated_at_ms, 5_000);
    assert_eq!(s.expires_at_ms, 65_000);
    assert!(s.updated_at_ms >= s.created_at_ms);
}

#[test]
fn session_id_equality_with_str() {
    let id = SessionId::new("sess-1");
    assert_eq!(id, "sess-1");
    assert_eq!(id, *"sess-1".to_string());
}

#[test]
fn session_id_borrow_allows_hashmap_lookup_by_str() {
    use std::collections::HashMap;
    let mut map: HashMap<SessionId, u32> = HashMap::new();
    map.insert(SessionId::new("sess-1"), 7);
    assert_eq!(map.get("sess-1"), Some(&7));
}

#[test]
fn session_status_display() {
    assert_eq!(SessionStatus::Active.to_string(), "active");
    assert_eq!(SessionStatus::Expired.to_string(), "expired");
}
