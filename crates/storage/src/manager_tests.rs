use super::*;
use ctz_core::FakeClock;
use std::path::PathBuf;

fn manager() -> (SessionManager<FakeClock>, tempfile::TempDir) {
    let store = SessionStore::temporary().expect("open store");
    let clock = FakeClock::new();
    let workspace = tempfile::tempdir().expect("tempdir");
    let mgr = SessionManager::new(store, clock, workspace.path().to_path_buf());
    (mgr, workspace)
}

#[test]
fn get_or_create_creates_when_absent() {
    let (mgr, _ws) = manager();
    let id = SessionId::from("sess-1".to_string());
    let session = mgr.get_or_create(&id, "owner-1").expect("should create");
    assert_eq!(session.owner_id, "owner-1");
    assert_eq!(session.id, id);
}

#[test]
fn get_or_create_returns_existing_on_second_call() {
    let (mgr, _ws) = manager();
    let id = SessionId::from("sess-1".to_string());
    let first = mgr.get_or_create(&id, "owner-1").expect("first call creates");
    let second = mgr.get_or_create(&id, "owner-2").expect("second call returns existing");
    assert_eq!(second.owner_id, first.owner_id);
    assert_eq!(second.owner_id, "owner-1", "second call must not overwrite with a different owner");
}

#[test]
fn get_workspace_dir_is_stable_across_calls() {
    let (mgr, _ws) = manager();
    let id = SessionId::from("sess-1".to_string());
    let first = mgr.get_workspace_dir(&id).expect("first allocation");
    let second = mgr.get_workspace_dir(&id).expect("second allocation");
    assert_eq!(first, second);
    assert!(first.is_dir());
}

#[test]
fn get_workspace_dir_differs_across_sessions() {
    let (mgr, _ws) = manager();
    let a = mgr.get_workspace_dir(&SessionId::from("sess-a".to_string())).expect("a");
    let b = mgr.get_workspace_dir(&SessionId::from("sess-b".to_string())).expect("b");
    assert_ne!(a, b);
}

#[test]
fn touch_refreshes_updated_at_and_extends_ttl() {
    let (mgr, _ws) = manager();
    let id = SessionId::from("sess-1".to_string());
    let created = mgr.get_or_create(&id, "owner-1").expect("create");

    let touched = mgr.touch(&id).expect("touch should succeed");
    assert!(touched.updated_at_ms >= created.updated_at_ms);
    assert!(touched.expires_at_ms >= created.expires_at_ms);
}

#[test]
fn touch_missing_session_fails() {
    let (mgr, _ws) = manager();
    let id = SessionId::from("does-not-exist".to_string());
    let err = mgr.touch(&id).expect_err("touch of missing session should fail");
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn resolve_workspace_path_allows_nested_relative_paths() {
    let (mgr, _ws) = manager();
    let id = SessionId::from("sess-1".to_string());
    let root = mgr.get_workspace_dir(&id).expect("root");
    let resolved = mgr
        .resolve_workspace_path(&id, Path::new("src/main.rs"))
        .expect("nested relative path should resolve");
    assert_eq!(resolved, root.join("src").join("main.rs"));
}

#[test]
fn resolve_workspace_path_rejects_absolute_paths() {
    let (mgr, _ws) = manager();
    let id = SessionId::from("sess-1".to_string());
    let err = mgr
        .resolve_workspace_path(&id, Path::new("/etc/passwd"))
        .expect_err("absolute paths must be rejected");
    assert!(matches!(err, StoreError::InvalidPath(_)));
}

#[test]
fn resolve_workspace_path_rejects_traversal_above_root() {
    let (mgr, _ws) = manager();
    let id = SessionId::from("sess-1".to_string());
    let err = mgr
        .resolve_workspace_path(&id, Path::new("../../etc/passwd"))
        .expect_err("traversal above the workspace root must be rejected");
    assert!(matches!(err, StoreError::InvalidPath(_)));
}

#[test]
fn resolve_workspace_path_allows_harmless_dotdot_within_bounds() {
    let (mgr, _ws) = manager();
    let id = SessionId::from("sess-1".to_string());
    let root = mgr.get_workspace_dir(&id).expect("root");
    let resolved = mgr
        .resolve_workspace_path(&id, Path::new("a/../b"))
        .expect("dotdot that stays within the workspace should resolve");
    assert_eq!(resolved, root.join("b"));
}

#[test]
fn sanitize_component_strips_path_separators() {
    let out = sanitize_component("../../sneaky");
    assert!(!out.contains('/'));
    assert!(!out.contains(".."));
}

#[test]
fn with_ttl_ms_overrides_default_ttl() {
    let store = SessionStore::temporary().expect("open store");
    let clock = FakeClock::new();
    let workspace: PathBuf = tempfile::tempdir().expect("tempdir").into_path();
    let mgr = SessionManager::new(store, clock, workspace).with_ttl_ms(5_000);
    let session = mgr.get_or_create(&SessionId::from("sess-1".to_string()), "owner-1").expect("create");
    assert_eq!(session.expires_at_ms - session.created_at_ms, 5_000);
}
