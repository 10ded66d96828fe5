// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `deploy_application`: apply the verified manifests and record the
//! resulting endpoint, if any.

use crate::collaborators::ClusterAdapter;
use async_trait::async_trait;
use ctz_core::CoreError;
use ctz_workflow::{StepHandler, StepParams, StepResult, WorkflowState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct DeployApplicationHandler {
    pub cluster: Arc<dyn ClusterAdapter>,
}

#[async_trait]
impl StepHandler for DeployApplicationHandler {
    async fn execute(
        &self,
        state: &WorkflowState,
        _params: &StepParams,
        _cancel: &CancellationToken,
    ) -> Result<StepResult, CoreError> {
        let mut k8s = state
            .artifacts
            .k8s
            .clone()
            .ok_or_else(|| CoreError::validation("verify_k8s_manifests has not completed for this session"))?;

        k8s.endpoint = self.cluster.deploy(&k8s.manifests, &k8s.namespace).await?;
        let data = serde_json::to_value(&k8s)
            .map_err(|e| CoreError::fatal(format!("failed to serialize k8s artifact: {e}")))?;
        Ok(StepResult::ok(data))
    }
}

#[cfg(test)]
#[path = "deploy_application_tests.rs"]
mod tests;
