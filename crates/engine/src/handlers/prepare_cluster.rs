// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `prepare_cluster`: ensure the target namespace exists and is ready
//! to receive a deployment.

use crate::collaborators::ClusterAdapter;
use async_trait::async_trait;
use ctz_core::CoreError;
use ctz_workflow::{StepHandler, StepParams, StepResult, WorkflowState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct PrepareClusterHandler {
    pub cluster: Arc<dyn ClusterAdapter>,
}

#[async_trait]
impl StepHandler for PrepareClusterHandler {
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

        self.cluster.prepare(&k8s.namespace).await?;
        Ok(StepResult::ok(serde_json::json!({ "namespace": k8s.namespace })))
    }
}

#[cfg(test)]
#[path = "prepare_cluster_tests.rs"]
mod tests;
