// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `analyze_repository`: walk the session's repository and record
//! language, framework, and entry-point facts for later steps.

use crate::collaborators::RepositoryAnalyzer;
use async_trait::async_trait;
use ctz_core::CoreError;
use ctz_workflow::{StepHandler, StepParams, StepResult, WorkflowState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct AnalyzeRepositoryHandler {
    pub analyzer: Arc<dyn RepositoryAnalyzer>,
}

#[async_trait]
impl StepHandler for AnalyzeRepositoryHandler {
    fn required_params(&self) -> &'static [&'static str] {
        &["repo_path"]
    }

    async fn execute(
        &self,
        state: &WorkflowState,
        _params: &StepParams,
        _cancel: &CancellationToken,
    ) -> Result<StepResult, CoreError> {
        let artifact = self.analyzer.analyze(&state.repository_path).await?;
        let data = serde_json::to_value(&artifact)
            .map_err(|e| CoreError::fatal(format!("failed to serialize analyze artifact: {e}")))?;
        Ok(StepResult::ok(data))
    }
}

#[cfg(test)]
#[path = "analyze_repository_tests.rs"]
mod tests;
