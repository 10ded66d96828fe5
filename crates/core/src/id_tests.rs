// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

crate::define_id! {
    /// Test ID type for macro verification.
    pub struct TestId("tst-");
}

#[test]
fn define_id_round_trips_through_from_string() {
    let id = TestId::from_string("tst-abc123");
    assert_eq!(id.as_str(), "tst-abc123");
}

#[test]
fn define_id_hash_map_lookup_by_borrowed_str() {
    let id = TestId::from_string("tst-lookup");
    let mut map = HashMap::new();
    map.insert(id.clone(), 42);
    assert_eq!(map.get("tst-lookup"), Some(&42));
}

#[test]
fn define_id_suffix_strips_prefix() {
    let id = TestId::from_string("tst-abc123");
    assert_eq!(id.suffix(), "abc123");
}

#[test]
fn define_id_short_truncates_suffix() {
    let id = TestId::from_string("tst-abcdefghijklmnop");
    assert_eq!(id.short(4), "abcd");
}

#[test]
fn define_id_new_has_prefix_and_fixed_length() {
    let id = TestId::new();
    assert!(id.as_str().starts_with("tst-"));
    assert_eq!(id.as_str().len(), ID_MAX_LEN);
}

#[test]
fn define_id_new_generates_unique_ids() {
    assert_ne!(TestId::new(), TestId::new());
}

#[test]
fn define_id_is_empty() {
    let id = TestId(IdBuf::empty());
    assert!(id.is_empty());
    assert!(!TestId::new().is_empty());
}

#[test]
fn short_fn_truncates_on_char_boundary() {
    let s = "abcdefghijklmnop";
    assert_eq!(short(s, 8), "abcdefgh");
    assert_eq!(short(s, 100), s);
    assert_eq!(short("abc", 8), "abc");
}

#[test]
fn id_buf_rejects_oversized_input_on_deserialize() {
    let too_long = "x".repeat(ID_MAX_LEN + 1);
    let json = serde_json::to_string(&too_long).expect("serialize");
    let result: Result<IdBuf, _> = serde_json::from_str(&json);
    assert!(result.is_err());
}
