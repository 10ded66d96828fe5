// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session serialization: the dispatcher is callable concurrently
//! from many threads, but two step handlers for the same session must
//! never run at once. A global mutex would serialize unrelated
//! sessions too, so locks are keyed and handed out per session id.

use ctz_core::SessionId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Default)]
pub struct SessionLocks {
    locks: parking_lot::Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `id`, creating it on first use. The
    /// returned guard must be held for the duration of the step's
    /// execution.
    pub async fn acquire(&self, id: &SessionId) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut locks = self.locks.lock();
            locks.entry(id.clone()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
        };
        mutex.lock_owned().await
    }

    /// Number of distinct sessions a lock has ever been allocated for.
    /// Locks are never removed — sessions are long-lived and few enough
    /// that this isn't a practical leak.
    pub fn tracked_sessions(&self) -> usize {
        self.locks.lock().len()
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod tests;
