// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn handler_failure_and_transient_are_recoverable() {
    assert!(CoreError::handler_failure("build failed").is_recoverable());
    assert!(CoreError::transient("timeout").is_recoverable());
}

#[test]
fn validation_and_fatal_are_not_recoverable() {
    assert!(!CoreError::validation("missing session_id").is_recoverable());
    assert!(!CoreError::fatal("panic").is_recoverable());
    assert!(!CoreError::cancelled().is_recoverable());
    assert!(!CoreError::not_found("no such session").is_recoverable());
    assert!(!CoreError::already_exists("session exists").is_recoverable());
}

#[test]
fn display_includes_class_and_message() {
    let err = CoreError::validation("session_id is required");
    assert_eq!(err.to_string(), "validation: session_id is required");
}
