// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `push_image`: push the tagged image to the requested registry.
//! Produces no artifact of its own — `build.image_ref` already carries
//! the pushed reference after `tag_image`. Retry bounding for this
//! step's self-redirect is handled by the dispatcher, not here.

use crate::collaborators::ImageRegistry;
use crate::validation::string_field;
use async_trait::async_trait;
use ctz_core::CoreError;
use ctz_workflow::{StepHandler, StepParams, StepResult, WorkflowState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct PushImageHandler {
    pub registry: Arc<dyn ImageRegistry>,
}

#[async_trait]
impl StepHandler for PushImageHandler {
    fn required_params(&self) -> &'static [&'static str] {
        &["registry"]
    }

    async fn execute(
        &self,
        state: &WorkflowState,
        params: &StepParams,
        _cancel: &CancellationToken,
    ) -> Result<StepResult, CoreError> {
        let registry = string_field(params, "registry")?;
        let build = state
            .artifacts
            .build
            .as_ref()
            .ok_or_else(|| CoreError::validation("build_image has not completed for this session"))?;

        self.registry.push(&build.image_ref, registry).await?;
        Ok(StepResult::ok(serde_json::json!({ "image_ref": build.image_ref, "registry": registry })))
    }
}

#[cfg(test)]
#[path = "push_image_tests.rs"]
mod tests;
