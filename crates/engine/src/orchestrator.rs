// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs the full eleven-step pipeline end to end for a freshly minted
//! session, without requiring the client to drive each tool call by
//! hand. A self-redirecting step gets one in-run retry; any other
//! failure aborts the run immediately.

use crate::dispatcher::Dispatcher;
use ctz_core::{step, Clock, SessionId, StepName};
use ctz_wire::DispatchResponse;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The composite result of a full, successful orchestration run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct OrchestratorResult {
    pub session_id: String,
    pub image_ref: Option<String>,
    pub namespace: Option<String>,
    pub endpoint: Option<String>,
    pub artifacts: ctz_core::Artifacts,
}

/// Why a run stopped short of completing every step.
#[derive(Debug, Clone)]
pub struct OrchestratorFailure {
    pub session_id: String,
    pub failed_step: StepName,
    pub response: DispatchResponse,
}

pub struct Orchestrator<C: Clock> {
    dispatcher: Arc<Dispatcher<C>>,
}

impl<C: Clock> Orchestrator<C> {
    pub fn new(dispatcher: Arc<Dispatcher<C>>) -> Self {
        Self { dispatcher }
    }

    /// Runs every step in graph order against a new session rooted at
    /// `repo_path`, retrying a self-redirecting step once before giving
    /// up on the whole run. `cancel` is checked between steps and
    /// forwarded into each dispatched call.
    pub async fn run(
        &self,
        repo_path: &str,
        cancel: &CancellationToken,
    ) -> Result<OrchestratorResult, OrchestratorFailure> {
        let session_id = format!("sess-{}", nanoid::nanoid!(16));
        let mut sequence: u64 = 0;

        for descriptor in step::STEP_GRAPH {
            let step = descriptor.name;
            let tool_name = step.to_string();
            sequence += 1;
            tracing::info!(
                event = "workflow.step.start",
                session_id = %session_id,
                step = %tool_name,
                sequence,
                "workflow.step.start"
            );

            let params = self.params_for(step, &session_id, repo_path);
            let mut response = self.dispatcher.dispatch(&tool_name, params.clone(), cancel).await;

            if !response.success && descriptor.is_self_redirect() {
                tracing::warn!(
                    event = "workflow.step.retry",
                    session_id = %session_id,
                    step = %tool_name,
                    "self-redirecting step failed once, retrying within this run"
                );
                response = self.dispatcher.dispatch(&tool_name, params, cancel).await;
            }

            tracing::info!(
                event = "workflow.step.end",
                session_id = %session_id,
                step = %tool_name,
                sequence,
                success = response.success,
                "workflow.step.end"
            );

            if !response.success {
                return Err(OrchestratorFailure { session_id, failed_step: step, response });
            }
        }

        self.build_result(session_id)
    }

    fn params_for(&self, step: StepName, session_id: &str, repo_path: &str) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("session_id".to_string(), Value::String(session_id.to_string()));
        match step {
            StepName::AnalyzeRepository => {
                params.insert("repo_path".to_string(), Value::String(repo_path.to_string()));
            }
            StepName::VerifyDockerfile => {
                params.insert(
                    "dockerfile_content".to_string(),
                    Value::String(default_dockerfile_placeholder()),
                );
            }
            StepName::TagImage => {
                params.insert("tag".to_string(), Value::String("latest".to_string()));
            }
            StepName::PushImage => {
                params.insert("registry".to_string(), Value::String("localhost:5000".to_string()));
            }
            StepName::VerifyK8sManifests => {
                params.insert("manifests".to_string(), Value::Array(vec![]));
            }
            _ => {}
        }
        params
    }

    /// Reads the session's final workflow state back from the
    /// dispatcher to assemble the composite result; every artifact the
    /// pipeline produced is already persisted by the time the last step
    /// succeeds.
    fn build_result(&self, session_id: String) -> Result<OrchestratorResult, OrchestratorFailure> {
        let state = self.dispatcher.load_state(&SessionId::new(session_id.clone())).map_err(|error| {
            OrchestratorFailure {
                session_id: session_id.clone(),
                failed_step: StepName::VerifyDeployment,
                response: DispatchResponse::failure(session_id.as_str(), &error),
            }
        })?;

        Ok(OrchestratorResult {
            session_id,
            image_ref: state.artifacts.build.as_ref().map(|b| b.image_ref.clone()),
            namespace: state.artifacts.k8s.as_ref().map(|k| k.namespace.clone()),
            endpoint: state.artifacts.k8s.as_ref().and_then(|k| k.endpoint.clone()),
            artifacts: state.artifacts,
        })
    }
}

fn default_dockerfile_placeholder() -> String {
    "FROM debian:bookworm-slim\nUSER nobody\nCMD [\"true\"]\n".to_string()
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
