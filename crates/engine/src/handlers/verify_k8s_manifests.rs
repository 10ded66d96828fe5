// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `verify_k8s_manifests`: evaluate each submitted manifest against
//! policy and, if all pass, record them as the session's deployment
//! target.

use async_trait::async_trait;
use ctz_core::{CoreError, K8sArtifact, ManifestDescriptor};
use ctz_policy::PolicyEngine;
use ctz_workflow::{StepHandler, StepParams, StepResult, WorkflowState};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct VerifyK8sManifestsHandler {
    pub policy: Arc<PolicyEngine>,
}

#[async_trait]
impl StepHandler for VerifyK8sManifestsHandler {
    fn required_params(&self) -> &'static [&'static str] {
        &["manifests"]
    }

    async fn execute(
        &self,
        _state: &WorkflowState,
        params: &StepParams,
        _cancel: &CancellationToken,
    ) -> Result<StepResult, CoreError> {
        let raw = params
            .get("manifests")
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| CoreError::validation("manifests must be an array of manifest strings"))?;

        let mut descriptors = Vec::with_capacity(raw.len());
        for entry in raw {
            let content = entry
                .as_str()
                .ok_or_else(|| CoreError::validation("each manifest must be a string"))?;

            let verdict = self.policy.evaluate(content, None, &HashMap::new());
            if !verdict.allow {
                let message = verdict
                    .violations
                    .first()
                    .map(|v| format!("{}: {}", v.rule, v.message))
                    .unwrap_or_else(|| "manifest failed policy evaluation".to_string());
                let data = serde_json::to_value(&verdict)
                    .map_err(|e| CoreError::fatal(format!("failed to serialize verdict: {e}")))?;
                return Ok(StepResult::failure(data).with_metadata("message", message));
            }

            descriptors.push(ManifestDescriptor {
                name: extract_field(content, "name").unwrap_or_else(|| "unnamed".to_string()),
                kind: extract_field(content, "kind").unwrap_or_else(|| "Unknown".to_string()),
                content: content.to_string(),
            });
        }

        let namespace = descriptors
            .iter()
            .find_map(|m| if m.kind == "Namespace" { Some(m.name.clone()) } else { None })
            .unwrap_or_else(|| "default".to_string());

        let artifact =
            K8sArtifact { manifests: descriptors, namespace, endpoint: None, metadata: HashMap::new() };
        let data = serde_json::to_value(&artifact)
            .map_err(|e| CoreError::fatal(format!("failed to serialize k8s artifact: {e}")))?;
        Ok(StepResult::ok(data))
    }
}

/// Pull a `field: value` line out of a manifest without bringing in a
/// YAML parser just for two scalar fields; `kind:`/`metadata.name:`
/// are always top-level scalars in well-formed manifests.
fn extract_field(content: &str, field: &str) -> Option<String> {
    if field == "name" {
        return content
            .lines()
            .map(str::trim)
            .find(|line| line.starts_with("name:"))
            .map(|line| line.trim_start_matches("name:").trim().trim_matches('"').to_string());
    }
    let prefix = format!("{field}:");
    content
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(&prefix))
        .map(|line| line.trim_start_matches(&prefix).trim().trim_matches('"').to_string())
}

#[cfg(test)]
#[path = "verify_k8s_manifests_tests.rs"]
mod tests;
