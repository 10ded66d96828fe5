// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kubectl`-backed [`ClusterAdapter`]: namespace provisioning,
//! manifest application, and a health check driven by pod phase.

use crate::subprocess::{failure_message, run_with_timeout};
use async_trait::async_trait;
use ctz_engine::collaborators::ClusterAdapter;
use ctz_engine::CollaboratorError;
use ctz_core::ManifestDescriptor;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{Command, Stdio};

const APPLY_TIMEOUT: Duration = Duration::from_secs(120);
const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

pub struct KubectlClusterAdapter;

#[async_trait]
impl ClusterAdapter for KubectlClusterAdapter {
    async fn prepare(&self, namespace: &str) -> Result<(), CollaboratorError> {
        let mut cmd = Command::new("kubectl");
        cmd.args(["create", "namespace", namespace]);
        let output = run_with_timeout(cmd, APPLY_TIMEOUT, "kubectl create namespace").await?;
        if output.status.success() {
            return Ok(());
        }
        let message = failure_message("kubectl create namespace", &output);
        if message.contains("AlreadyExists") {
            return Ok(());
        }
        Err(CollaboratorError::Failed(message))
    }

    async fn deploy(
        &self,
        manifests: &[ManifestDescriptor],
        namespace: &str,
    ) -> Result<Option<String>, CollaboratorError> {
        let combined = manifests.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join("\n---\n");

        let mut cmd = Command::new("kubectl");
        cmd.args(["apply", "-n", namespace, "-f", "-"]).stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());
        let mut child =
            cmd.spawn().map_err(|e| CollaboratorError::Failed(format!("failed to start kubectl apply: {e}")))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(combined.as_bytes())
                .await
                .map_err(|e| CollaboratorError::Failed(format!("failed to write manifests to kubectl: {e}")))?;
        }
        let output = tokio::time::timeout(APPLY_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| CollaboratorError::Transient("kubectl apply timed out".to_string()))?
            .map_err(|e| CollaboratorError::Failed(format!("kubectl apply failed to complete: {e}")))?;
        if !output.status.success() {
            return Err(CollaboratorError::Failed(failure_message("kubectl apply", &output)));
        }

        let Some(ingress) = manifests.iter().find(|m| m.kind == "Ingress") else {
            return Ok(None);
        };
        Ok(ingress_endpoint(&ingress.name, namespace).await)
    }

    async fn verify(&self, namespace: &str) -> Result<bool, CollaboratorError> {
        let mut cmd = Command::new("kubectl");
        cmd.args(["get", "pods", "-n", namespace, "-o", "jsonpath={.items[*].status.phase}"]);
        let output = run_with_timeout(cmd, QUERY_TIMEOUT, "kubectl get pods").await?;
        if !output.status.success() {
            return Err(CollaboratorError::Failed(failure_message("kubectl get pods", &output)));
        }
        Ok(all_running(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// True if every whitespace-separated phase in `phases` is `Running`
/// and there is at least one pod — an empty namespace is not healthy.
fn all_running(phases: &str) -> bool {
    let phases: Vec<&str> = phases.split_whitespace().collect();
    !phases.is_empty() && phases.iter().all(|phase| *phase == "Running")
}

async fn ingress_endpoint(name: &str, namespace: &str) -> Option<String> {
    let mut cmd = Command::new("kubectl");
    cmd.args([
        "get",
        "ingress",
        name,
        "-n",
        namespace,
        "-o",
        "jsonpath={.status.loadBalancer.ingress[0].hostname}{.status.loadBalancer.ingress[0].ip}",
    ]);
    let output = run_with_timeout(cmd, QUERY_TIMEOUT, "kubectl get ingress").await.ok()?;
    if !output.status.success() {
        return None;
    }
    let host = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if host.is_empty() {
        return None;
    }
    Some(format!("https://{host}"))
}

#[cfg(test)]
#[path = "cluster_tests.rs"]
mod tests;
