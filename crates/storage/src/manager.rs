// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle and workspace semantics layered on top of [`SessionStore`]:
//! atomic get-or-create, per-session workspace directories, and TTL
//! refresh via `touch`.

use crate::error::StoreError;
use crate::store::SessionStore;
use ctz_core::{Clock, Session, SessionId};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

const DEFAULT_TTL_MS: u64 = 24 * 60 * 60 * 1000;

pub struct SessionManager<C: Clock> {
    store: SessionStore,
    clock: C,
    workspace_root: PathBuf,
    ttl_ms: u64,
    /// Session ids for which a workspace directory has already been
    /// allocated, so a caller can assert a workspace was provisioned
    /// without re-touching the filesystem every time.
    provisioned: Mutex<HashSet<SessionId>>,
}

impl<C: Clock> SessionManager<C> {
    pub fn new(store: SessionStore, clock: C, workspace_root: PathBuf) -> Self {
        Self { store, clock, workspace_root, ttl_ms: DEFAULT_TTL_MS, provisioned: Mutex::new(HashSet::new()) }
    }

    pub fn with_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Reads a session back without touching its TTL, using this
    /// manager's own clock so an expired row reads as absent.
    pub fn get(&self, id: &SessionId) -> Result<Option<Session>, StoreError> {
        self.store.get(id, self.clock.epoch_ms())
    }

    /// Atomically returns the existing session for `id`, or creates one
    /// owned by `owner_id` if none exists yet.
    pub fn get_or_create(&self, id: &SessionId, owner_id: &str) -> Result<Session, StoreError> {
        let now_ms = self.clock.epoch_ms();
        let fresh = Session::new(id.clone(), owner_id, now_ms, self.ttl_ms);
        match self.store.create(&fresh) {
            Ok(()) => Ok(fresh),
            Err(StoreError::AlreadyExists(_)) => {
                self.store.get(id, now_ms)?.ok_or_else(|| StoreError::NotFound(id.clone()))
            }
            Err(e) => Err(e),
        }
    }

    /// Allocates (idempotently) the per-session working directory and
    /// returns its path. The same session id always maps to the same
    /// directory, so repeated calls are cheap no-ops after the first.
    pub fn get_workspace_dir(&self, id: &SessionId) -> Result<PathBuf, StoreError> {
        let dir = self.workspace_root.join(sanitize_component(id.as_str()));
        if !self.provisioned.lock().contains(id) {
            std::fs::create_dir_all(&dir)
                .map_err(|e| StoreError::InvalidPath(format!("failed to create workspace dir {}: {e}", dir.display())))?;
            self.provisioned.lock().insert(id.clone());
        }
        Ok(dir)
    }

    /// Resolve `relative` against a session's workspace root, rejecting
    /// any path that would escape it (absolute paths, `..` components
    /// that climb above the root, symlink traversal is the caller's
    /// concern once the path is handed to a file-access helper).
    pub fn resolve_workspace_path(&self, id: &SessionId, relative: &Path) -> Result<PathBuf, StoreError> {
        let root = self.get_workspace_dir(id)?;
        resolve_within(&root, relative)
    }

    /// Refreshes `updated_at_ms` and extends the session's TTL.
    pub fn touch(&self, id: &SessionId) -> Result<Session, StoreError> {
        let now_ms = self.clock.epoch_ms();
        let mut session = self.store.get(id, now_ms)?.ok_or_else(|| StoreError::NotFound(id.clone()))?;
        session.touch(now_ms, self.ttl_ms);
        self.store.update(&session)?;
        Ok(session)
    }

    /// Reaps sessions whose TTL has lapsed, using this manager's own
    /// clock. Safe to call concurrently with any other method here.
    pub fn cleanup(&self) -> Result<usize, StoreError> {
        self.store.cleanup(self.clock.epoch_ms())
    }
}

/// Replace anything that isn't a path-safe character so a session id
/// can never be used to smuggle a `..` or an absolute path as a
/// directory name.
fn sanitize_component(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn resolve_within(root: &Path, relative: &Path) -> Result<PathBuf, StoreError> {
    use std::path::Component;

    if relative.is_absolute() {
        return Err(StoreError::InvalidPath(format!("{} is absolute, expected a path relative to the workspace", relative.display())));
    }

    let mut resolved = root.to_path_buf();
    let mut depth = 0i32;
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return Err(StoreError::InvalidPath(format!(
                        "{} escapes the workspace root",
                        relative.display()
                    )));
                }
                resolved.pop();
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(StoreError::InvalidPath(format!("{} is absolute, expected a path relative to the workspace", relative.display())));
            }
        }
    }
    Ok(resolved)
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
