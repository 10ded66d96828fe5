// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `docker`-backed [`ImageRegistry`]: retags and pushes via the Docker
//! CLI, optionally authenticating first when credentials are
//! configured.

use crate::subprocess::{failure_message, run_with_timeout};
use async_trait::async_trait;
use ctz_engine::collaborators::ImageRegistry;
use ctz_engine::CollaboratorError;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{Command, Stdio};

const TAG_TIMEOUT: Duration = Duration::from_secs(30);
const LOGIN_TIMEOUT: Duration = Duration::from_secs(30);
const PUSH_TIMEOUT: Duration = Duration::from_secs(300);

pub struct DockerRegistryAdapter {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl DockerRegistryAdapter {
    pub fn new(username: Option<String>, password: Option<String>) -> Self {
        Self { username, password }
    }

    async fn login(&self, registry: &str) -> Result<(), CollaboratorError> {
        let (Some(username), Some(password)) = (&self.username, &self.password) else {
            return Ok(());
        };

        let mut cmd = Command::new("docker");
        cmd.args(["login", registry, "-u", username, "--password-stdin"]).stdin(Stdio::piped());
        let mut child = cmd
            .spawn()
            .map_err(|e| CollaboratorError::Failed(format!("failed to start docker login: {e}")))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(password.as_bytes())
                .await
                .map_err(|e| CollaboratorError::Failed(format!("failed to write docker login password: {e}")))?;
        }
        let output = tokio::time::timeout(LOGIN_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| CollaboratorError::Transient("docker login timed out".to_string()))?
            .map_err(|e| CollaboratorError::Failed(format!("docker login failed to complete: {e}")))?;
        if !output.status.success() {
            return Err(CollaboratorError::Failed(failure_message("docker login", &output)));
        }
        Ok(())
    }
}

/// Splits `repo:tag` into its two parts, defaulting the tag to
/// `latest` when `image_ref` carries none (an untagged ref, or one
/// whose only colon is a registry host's port).
fn split_repo_tag(image_ref: &str) -> (&str, &str) {
    match image_ref.rsplit_once(':') {
        Some((repo, tag)) if !tag.contains('/') => (repo, tag),
        _ => (image_ref, "latest"),
    }
}

#[async_trait]
impl ImageRegistry for DockerRegistryAdapter {
    async fn tag(&self, image_ref: &str, tag: &str) -> Result<String, CollaboratorError> {
        let (repo, _) = split_repo_tag(image_ref);
        let new_ref = format!("{repo}:{tag}");

        let mut cmd = Command::new("docker");
        cmd.args(["tag", image_ref, &new_ref]);
        let output = run_with_timeout(cmd, TAG_TIMEOUT, "docker tag").await?;
        if !output.status.success() {
            return Err(CollaboratorError::Failed(failure_message("docker tag", &output)));
        }
        Ok(new_ref)
    }

    async fn push(&self, image_ref: &str, registry: &str) -> Result<(), CollaboratorError> {
        self.login(registry).await?;

        let (repo, tag) = split_repo_tag(image_ref);
        let remote_ref = format!("{registry}/{repo}:{tag}");

        let mut retag = Command::new("docker");
        retag.args(["tag", image_ref, &remote_ref]);
        let output = run_with_timeout(retag, TAG_TIMEOUT, "docker tag (for push)").await?;
        if !output.status.success() {
            return Err(CollaboratorError::Failed(failure_message("docker tag (for push)", &output)));
        }

        let mut push = Command::new("docker");
        push.args(["push", &remote_ref]);
        let output = run_with_timeout(push, PUSH_TIMEOUT, "docker push").await?;
        if !output.status.success() {
            let message = failure_message("docker push", &output);
            if message.to_lowercase().contains("timeout") || message.to_lowercase().contains("connection") {
                return Err(CollaboratorError::Transient(message));
            }
            return Err(CollaboratorError::Failed(message));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
