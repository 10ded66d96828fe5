// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `build_image`: build the verified Dockerfile into an image.

use crate::collaborators::ImageBuilder;
use async_trait::async_trait;
use ctz_core::{BuildArtifact, CoreError};
use ctz_workflow::{StepHandler, StepParams, StepResult, WorkflowState};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct BuildImageHandler {
    pub builder: Arc<dyn ImageBuilder>,
}

#[async_trait]
impl StepHandler for BuildImageHandler {
    async fn execute(
        &self,
        state: &WorkflowState,
        _params: &StepParams,
        _cancel: &CancellationToken,
    ) -> Result<StepResult, CoreError> {
        let dockerfile = state
            .artifacts
            .dockerfile
            .as_ref()
            .ok_or_else(|| CoreError::validation("verify_dockerfile has not completed for this session"))?;

        let outcome = self.builder.build(&dockerfile.content, &state.repository_path).await?;
        let artifact = BuildArtifact {
            image_ref: outcome.image_ref,
            image_id: outcome.image_id,
            image_size_bytes: outcome.image_size_bytes,
            build_duration_ms: outcome.build_duration_ms,
            metadata: HashMap::new(),
        };
        let data = serde_json::to_value(&artifact)
            .map_err(|e| CoreError::fatal(format!("failed to serialize build artifact: {e}")))?;
        Ok(StepResult::ok(data))
    }
}

#[cfg(test)]
#[path = "build_image_tests.rs"]
mod tests;
