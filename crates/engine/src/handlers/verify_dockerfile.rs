// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `verify_dockerfile`: evaluate submitted Dockerfile content against
//! policy before `build_image` is allowed to run.

use async_trait::async_trait;
use ctz_core::{CoreError, DockerfileArtifact};
use ctz_policy::PolicyEngine;
use ctz_workflow::{StepHandler, StepParams, StepResult, WorkflowState};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct VerifyDockerfileHandler {
    pub policy: Arc<PolicyEngine>,
}

#[async_trait]
impl StepHandler for VerifyDockerfileHandler {
    fn required_params(&self) -> &'static [&'static str] {
        &["dockerfile_content"]
    }

    async fn execute(
        &self,
        _state: &WorkflowState,
        params: &StepParams,
        _cancel: &CancellationToken,
    ) -> Result<StepResult, CoreError> {
        let content = crate::validation::string_field(params, "dockerfile_content")?;

        let verdict = self.policy.evaluate(content, None, &HashMap::new());
        if !verdict.allow {
            let message = verdict
                .violations
                .first()
                .map(|v| format!("{}: {}", v.rule, v.message))
                .unwrap_or_else(|| "dockerfile failed policy evaluation".to_string());
            let data = serde_json::to_value(&verdict)
                .map_err(|e| CoreError::fatal(format!("failed to serialize verdict: {e}")))?;
            return Ok(StepResult::failure(data).with_metadata("message", message));
        }

        let artifact = DockerfileArtifact {
            content: content.as_bytes().to_vec(),
            path: PathBuf::from("Dockerfile"),
            metadata: HashMap::new(),
        };
        let data = serde_json::to_value(&artifact)
            .map_err(|e| CoreError::fatal(format!("failed to serialize dockerfile artifact: {e}")))?;
        Ok(StepResult::ok(data))
    }
}

#[cfg(test)]
#[path = "verify_dockerfile_tests.rs"]
mod tests;
