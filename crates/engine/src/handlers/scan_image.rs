// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `scan_image`: scan the built image for vulnerabilities.

use crate::collaborators::ImageScanner;
use async_trait::async_trait;
use ctz_core::{CoreError, ScanArtifact};
use ctz_policy::PolicyEngine;
use ctz_workflow::{StepHandler, StepParams, StepResult, WorkflowState};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct ScanImageHandler {
    pub scanner: Arc<dyn ImageScanner>,
    pub policy: Arc<PolicyEngine>,
}

#[async_trait]
impl StepHandler for ScanImageHandler {
    async fn execute(
        &self,
        state: &WorkflowState,
        _params: &StepParams,
        _cancel: &CancellationToken,
    ) -> Result<StepResult, CoreError> {
        let build = state
            .artifacts
            .build
            .as_ref()
            .ok_or_else(|| CoreError::validation("build_image has not completed for this session"))?;

        let outcome = self.scanner.scan(&build.image_ref).await?;
        let artifact = ScanArtifact {
            risk_level: outcome.risk_level,
            remediations: outcome.remediations,
            alternative_base_images: outcome.alternative_base_images,
        };

        let mut facts = HashMap::new();
        facts.insert("risk_level".to_string(), serde_json::Value::String(artifact.risk_level.to_string()));
        let verdict = self.policy.evaluate("", None, &facts);
        if !verdict.allow {
            let message = verdict
                .violations
                .first()
                .map(|v| format!("{}: {}", v.rule, v.message))
                .unwrap_or_else(|| "image scan failed policy evaluation".to_string());
            let data = serde_json::to_value(&artifact)
                .map_err(|e| CoreError::fatal(format!("failed to serialize scan artifact: {e}")))?;
            return Ok(StepResult::failure(data).with_metadata("message", message));
        }

        let data = serde_json::to_value(&artifact)
            .map_err(|e| CoreError::fatal(format!("failed to serialize scan artifact: {e}")))?;
        Ok(StepResult::ok(data))
    }
}

#[cfg(test)]
#[path = "scan_image_tests.rs"]
mod tests;
