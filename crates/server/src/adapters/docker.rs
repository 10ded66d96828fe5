// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `docker build`-backed [`ImageBuilder`] and `trivy`-backed
//! [`ImageScanner`]. Both shell out and classify a non-zero exit or a
//! timed-out process as a [`CollaboratorError`].

use crate::subprocess::{failure_message, run_with_timeout};
use async_trait::async_trait;
use ctz_core::RiskLevel;
use ctz_engine::collaborators::{BuildOutcome, ImageBuilder, ImageScanner, ScanOutcome};
use ctz_engine::CollaboratorError;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::process::Command;

const BUILD_TIMEOUT: Duration = Duration::from_secs(600);
const SCAN_TIMEOUT: Duration = Duration::from_secs(300);
const INSPECT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct DockerImageBuilder;

#[async_trait]
impl ImageBuilder for DockerImageBuilder {
    async fn build(&self, dockerfile_content: &[u8], workspace: &Path) -> Result<BuildOutcome, CollaboratorError> {
        let dockerfile_path = workspace.join(".ctz-dockerfile");
        tokio::fs::write(&dockerfile_path, dockerfile_content)
            .await
            .map_err(|e| CollaboratorError::Failed(format!("failed to write Dockerfile: {e}")))?;

        let image_ref = format!("ctz-build:{}", nanoid::nanoid!(12));
        let started = Instant::now();

        let mut cmd = Command::new("docker");
        cmd.args(["build", "-q", "-f"])
            .arg(&dockerfile_path)
            .arg("-t")
            .arg(&image_ref)
            .arg(workspace);
        let output = run_with_timeout(cmd, BUILD_TIMEOUT, "docker build").await?;
        if !output.status.success() {
            return Err(CollaboratorError::Failed(failure_message("docker build", &output)));
        }
        let image_id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let build_duration_ms = started.elapsed().as_millis() as u64;

        let image_size_bytes = inspect_size(&image_ref).await.unwrap_or(0);

        Ok(BuildOutcome { image_ref, image_id, image_size_bytes, build_duration_ms })
    }
}

async fn inspect_size(image_ref: &str) -> Option<u64> {
    let mut cmd = Command::new("docker");
    cmd.args(["image", "inspect", "--format={{.Size}}", image_ref]);
    let output = run_with_timeout(cmd, INSPECT_TIMEOUT, "docker image inspect").await.ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout).trim().parse().ok()
}

pub struct TrivyImageScanner;

#[async_trait]
impl ImageScanner for TrivyImageScanner {
    async fn scan(&self, image_ref: &str) -> Result<ScanOutcome, CollaboratorError> {
        let mut cmd = Command::new("trivy");
        cmd.args(["image", "--format", "json", "--quiet", image_ref]);
        let output = run_with_timeout(cmd, SCAN_TIMEOUT, "trivy image scan").await?;
        if !output.status.success() {
            return Err(CollaboratorError::Failed(failure_message("trivy image scan", &output)));
        }

        let report: serde_json::Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| CollaboratorError::Failed(format!("failed to parse trivy report: {e}")))?;
        Ok(summarize_report(&report))
    }
}

fn summarize_report(report: &serde_json::Value) -> ScanOutcome {
    let mut risk_level = RiskLevel::None;
    let mut remediations = Vec::new();

    let results = report.get("Results").and_then(serde_json::Value::as_array).cloned().unwrap_or_default();
    for result in &results {
        let vulnerabilities =
            result.get("Vulnerabilities").and_then(serde_json::Value::as_array).cloned().unwrap_or_default();
        for vuln in &vulnerabilities {
            let severity = vuln.get("Severity").and_then(serde_json::Value::as_str).unwrap_or("UNKNOWN");
            risk_level = risk_level.max(severity_to_risk(severity));

            if let (Some(pkg), Some(fixed)) = (
                vuln.get("PkgName").and_then(serde_json::Value::as_str),
                vuln.get("FixedVersion").and_then(serde_json::Value::as_str),
            ) {
                remediations.push(format!("upgrade {pkg} to {fixed}"));
            }
        }
    }
    remediations.sort();
    remediations.dedup();

    ScanOutcome { risk_level, remediations, alternative_base_images: Vec::new() }
}

fn severity_to_risk(severity: &str) -> RiskLevel {
    match severity.to_uppercase().as_str() {
        "CRITICAL" => RiskLevel::Critical,
        "HIGH" => RiskLevel::High,
        "MEDIUM" => RiskLevel::Medium,
        "LOW" => RiskLevel::Low,
        _ => RiskLevel::None,
    }
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;
