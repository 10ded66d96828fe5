// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `tag_image`: apply a client-supplied tag to the built image,
//! overwriting its reference.

use crate::collaborators::ImageRegistry;
use crate::validation::string_field;
use async_trait::async_trait;
use ctz_core::CoreError;
use ctz_workflow::{StepHandler, StepParams, StepResult, WorkflowState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct TagImageHandler {
    pub registry: Arc<dyn ImageRegistry>,
}

#[async_trait]
impl StepHandler for TagImageHandler {
    fn required_params(&self) -> &'static [&'static str] {
        &["tag"]
    }

    async fn execute(
        &self,
        state: &WorkflowState,
        params: &StepParams,
        _cancel: &CancellationToken,
    ) -> Result<StepResult, CoreError> {
        let tag = string_field(params, "tag")?;
        let mut build = state
            .artifacts
            .build
            .clone()
            .ok_or_else(|| CoreError::validation("build_image has not completed for this session"))?;

        build.image_ref = self.registry.tag(&build.image_ref, tag).await?;
        let data = serde_json::to_value(&build)
            .map_err(|e| CoreError::fatal(format!("failed to serialize build artifact: {e}")))?;
        Ok(StepResult::ok(data))
    }
}

#[cfg(test)]
#[path = "tag_image_tests.rs"]
mod tests;
