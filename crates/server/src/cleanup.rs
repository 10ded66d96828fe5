// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background session-store reaper: runs `SessionManager::cleanup`
//! once at startup and then on a fixed interval for as long as the
//! process is alive.

use ctz_core::Clock;
use ctz_storage::SessionManager;
use std::sync::Arc;
use std::time::Duration;

const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Spawns the reaper task and returns immediately; the task runs for
/// the lifetime of the process.
pub fn spawn<C: Clock + 'static>(sessions: Arc<SessionManager<C>>) {
    tokio::spawn(async move {
        sweep(&sessions);

        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        ticker.tick().await; // first tick fires immediately; already swept above
        loop {
            ticker.tick().await;
            sweep(&sessions);
        }
    });
}

fn sweep<C: Clock>(sessions: &SessionManager<C>) {
    match sessions.cleanup() {
        Ok(removed) if removed > 0 => {
            tracing::info!(event = "session.cleanup", removed, "reaped expired sessions");
        }
        Ok(_) => {}
        Err(error) => {
            tracing::warn!(event = "session.cleanup.failed", %error, "session store cleanup failed");
        }
    }
}
