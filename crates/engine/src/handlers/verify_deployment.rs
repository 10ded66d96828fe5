// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `verify_deployment`: the terminal step. Confirms the deployed
//! application is healthy; produces no artifact of its own.

use crate::collaborators::ClusterAdapter;
use async_trait::async_trait;
use ctz_core::CoreError;
use ctz_workflow::{StepHandler, StepParams, StepResult, WorkflowState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct VerifyDeploymentHandler {
    pub cluster: Arc<dyn ClusterAdapter>,
}

#[async_trait]
impl StepHandler for VerifyDeploymentHandler {
    async fn execute(
        &self,
        state: &WorkflowState,
        _params: &StepParams,
        _cancel: &CancellationToken,
    ) -> Result<StepResult, CoreError> {
        let k8s = state
            .artifacts
            .k8s
            .as_ref()
            .ok_or_else(|| CoreError::validation("verify_k8s_manifests has not completed for this session"))?;

        let healthy = self.cluster.verify(&k8s.namespace).await?;
        if !healthy {
            return Ok(StepResult::failure(serde_json::json!({ "namespace": k8s.namespace }))
                .with_metadata("message", format!("deployment in namespace {} is not healthy", k8s.namespace)));
        }
        Ok(StepResult::ok(serde_json::json!({ "namespace": k8s.namespace, "endpoint": k8s.endpoint })))
    }
}

#[cfg(test)]
#[path = "verify_deployment_tests.rs"]
mod tests;
