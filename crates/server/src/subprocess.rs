// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared subprocess-invocation helper for the concrete collaborator
//! adapters: runs a command with a timeout and turns a non-zero exit
//! or a timed-out process into a [`CollaboratorError`].

use ctz_engine::CollaboratorError;
use std::time::Duration;
use tokio::process::Command;

/// Runs `cmd`, killing it if it hasn't finished within `timeout`.
/// `description` is only used to make the resulting error readable.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<std::process::Output, CollaboratorError> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(CollaboratorError::Failed(format!("{description} failed to start: {e}"))),
        Err(_) => Err(CollaboratorError::Transient(format!(
            "{description} timed out after {}s",
            timeout.as_secs()
        ))),
    }
}

/// Renders a failed command's stderr for inclusion in an error message,
/// falling back to stdout if stderr is empty.
pub fn failure_message(description: &str, output: &std::process::Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let text = if stderr.trim().is_empty() { String::from_utf8_lossy(&output.stdout) } else { stderr };
    format!("{description} exited with {}: {}", output.status, text.trim())
}
