// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The tool dispatcher: the single entry point every non-utility tool
//! call goes through. Resolves a tool name to a step, validates
//! parameters, loads or creates the session's workflow state, runs the
//! handler under a per-session lock and panic isolation, then persists
//! the result and builds the outer [`ctz_wire::DispatchResponse`].

use crate::locks::SessionLocks;
use crate::redirect::{self, Plan, MAX_SELF_REDIRECTS};
use crate::validation;
use ctz_core::{Clock, CoreError, ErrorClass, SessionId, StepName};
use ctz_storage::SessionManager;
use ctz_wire::{DispatchResponse, StepResultPayload};
use ctz_workflow::{StepRegistry, StepResult, WorkflowState};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Owner id stamped on every session this server creates. The wire
/// protocol carries no caller identity of its own — every MCP client
/// talking to one server instance shares this value.
const SESSION_OWNER: &str = "mcp-client";

const WORKFLOW_STATE_KEY: &str = "workflow_state";

/// Clamps a client-requested `push_image` retry budget. `push_image` is
/// the one step whose self-redirect limit is caller-configurable, but
/// the server never trusts it past [`server_cap`] regardless of what
/// the client asks for.
pub struct PushRedirectPolicy {
    pub server_cap: u32,
}

impl Default for PushRedirectPolicy {
    fn default() -> Self {
        Self { server_cap: 5 }
    }
}

impl PushRedirectPolicy {
    pub fn clamp(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(MAX_SELF_REDIRECTS).min(self.server_cap)
    }
}

/// Maps a wire tool name onto its internal step, or `None` for tools
/// the dispatcher doesn't handle directly (`start_workflow` goes
/// through the orchestrator; utility tools are answered by the binary).
fn step_for_tool(tool_name: &str) -> Option<StepName> {
    StepName::from_str(tool_name).ok()
}

pub struct Dispatcher<C: Clock> {
    sessions: Arc<SessionManager<C>>,
    registry: Arc<StepRegistry>,
    locks: SessionLocks,
    push_policy: PushRedirectPolicy,
    /// `(session, step) -> consecutive failure count`, reset to zero the
    /// moment that step next succeeds.
    consecutive_failures: Mutex<HashMap<(SessionId, StepName), u32>>,
}

impl<C: Clock> Dispatcher<C> {
    pub fn new(sessions: Arc<SessionManager<C>>, registry: Arc<StepRegistry>) -> Self {
        Self {
            sessions,
            registry,
            locks: SessionLocks::new(),
            push_policy: PushRedirectPolicy::default(),
            consecutive_failures: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Reads back a session's current workflow state, for callers (the
    /// orchestrator) that need the aggregated artifacts after a run
    /// rather than any single step's result.
    pub fn load_state(&self, session_id: &SessionId) -> Result<WorkflowState, CoreError> {
        let session = self
            .sessions
            .get(session_id)
            .map_err(CoreError::from)?
            .ok_or_else(|| CoreError::not_found(format!("session not found: {session_id}")))?;
        load_or_init_state(&session, session_id, std::path::PathBuf::new())
    }

    /// Dispatch one tool call end to end, returning the response
    /// envelope the client gets back verbatim. `cancel` is propagated
    /// down into the step handler; if it fires before the handler
    /// finishes, the call surfaces as a cancelled failure rather than
    /// waiting out the handler.
    pub async fn dispatch(
        &self,
        tool_name: &str,
        params: ctz_workflow::StepParams,
        cancel: &CancellationToken,
    ) -> DispatchResponse {
        let Some(step) = step_for_tool(tool_name) else {
            let error = CoreError::validation(format!("unknown tool: {tool_name}"));
            return DispatchResponse::failure("", &error);
        };

        match self.dispatch_step(step, &params, cancel).await {
            Ok(response) => response,
            Err(error) => {
                let session_id = params.get(validation::SESSION_ID).and_then(|v| v.as_str()).unwrap_or("");
                DispatchResponse::failure(session_id, &error)
            }
        }
    }

    async fn dispatch_step(
        &self,
        step: StepName,
        params: &ctz_workflow::StepParams,
        cancel: &CancellationToken,
    ) -> Result<DispatchResponse, CoreError> {
        let required = self.registry.required_params(step);
        validation::validate_required(params, required)?;
        let session_id_str = validation::string_field(params, validation::SESSION_ID)?;
        let session_id = SessionId::new(session_id_str);

        let _guard = self.locks.acquire(&session_id).await;

        let session = self.sessions.get_or_create(&session_id, SESSION_OWNER)?;
        let fallback_repository_path = match params.get("repo_path").and_then(|v| v.as_str()) {
            Some(path) => std::path::PathBuf::from(path),
            None => self.sessions.get_workspace_dir(&session_id)?,
        };
        let mut state = load_or_init_state(&session, &session_id, fallback_repository_path)?;

        let handler = self
            .registry
            .get(step)
            .ok_or_else(|| CoreError::fatal(format!("no handler registered for step {step}")))?
            .clone();
        let step_params = params.clone();
        let state_for_task = state.clone();
        let cancel_for_task = cancel.clone();
        let join =
            tokio::spawn(async move { handler.execute(&state_for_task, &step_params, &cancel_for_task).await });

        let outcome = tokio::select! {
            result = join => result.map_err(|e| CoreError::fatal(format!("step handler panicked: {e}")))?,
            _ = cancel.cancelled() => {
                return self.on_error(step, &state, &session_id, CoreError::cancelled(), params);
            }
        };

        match outcome {
            Ok(result) if result.success => self.on_success(step, &mut state, &session_id, result),
            Ok(result) => self.on_handler_failure(step, &state, &session_id, result, params),
            Err(error) => self.on_error(step, &state, &session_id, error, params),
        }
    }

    fn on_success(
        &self,
        step: StepName,
        state: &mut WorkflowState,
        session_id: &SessionId,
        result: StepResult,
    ) -> Result<DispatchResponse, CoreError> {
        apply_artifact(step, state, &result.data)?;
        state.mark_step_completed(step)?;
        self.consecutive_failures.lock().remove(&(session_id.clone(), step));
        self.persist(session_id, state)?;

        let data = to_object(&result.data);
        let payload = StepResultPayload::ok(data);
        let mut response = DispatchResponse::success(session_id.as_str(), payload);
        if !result.metadata.is_empty() {
            response = response.with_metadata(serde_json::to_value(&result.metadata).unwrap_or_default());
        }
        Ok(response)
    }

    fn on_handler_failure(
        &self,
        step: StepName,
        state: &WorkflowState,
        session_id: &SessionId,
        result: StepResult,
        params: &ctz_workflow::StepParams,
    ) -> Result<DispatchResponse, CoreError> {
        let message = result
            .metadata
            .get("message")
            .cloned()
            .unwrap_or_else(|| format!("{step} reported failure"));
        self.finish_as_failure(step, state, session_id, CoreError::handler_failure(message), params)
    }

    fn on_error(
        &self,
        step: StepName,
        state: &WorkflowState,
        session_id: &SessionId,
        error: CoreError,
        params: &ctz_workflow::StepParams,
    ) -> Result<DispatchResponse, CoreError> {
        if matches!(error.class, ErrorClass::Validation | ErrorClass::NotFound | ErrorClass::AlreadyExists) {
            return Err(error);
        }
        self.finish_as_failure(step, state, session_id, error, params)
    }

    fn finish_as_failure(
        &self,
        step: StepName,
        state: &WorkflowState,
        session_id: &SessionId,
        error: CoreError,
        params: &ctz_workflow::StepParams,
    ) -> Result<DispatchResponse, CoreError> {
        let mut state = state.clone();
        state.mark_step_failed(step);

        let consecutive = {
            let mut map = self.consecutive_failures.lock();
            let entry = map.entry((session_id.clone(), step)).or_insert(0);
            *entry += 1;
            *entry
        };
        self.persist(session_id, &state)?;

        if !error.is_recoverable() {
            return Ok(DispatchResponse::failure(session_id.as_str(), &error));
        }

        let limit = if step == StepName::PushImage {
            let requested = params.get("max_retries").and_then(|v| v.as_u64()).map(|v| v as u32);
            self.push_policy.clamp(requested)
        } else {
            MAX_SELF_REDIRECTS
        };

        let redirect_context: ctz_wire::RedirectContext =
            serde_json::from_value(serde_json::Value::Object(params.clone())).unwrap_or_default();

        match redirect::plan(step, &error, &state, consecutive, limit, &redirect_context) {
            Plan::Redirect(payload) => Ok(DispatchResponse::redirected(session_id.as_str(), &error, payload)),
            Plan::Terminal => Ok(DispatchResponse::failure(session_id.as_str(), &error)),
        }
    }

    fn persist(&self, session_id: &SessionId, state: &WorkflowState) -> Result<(), CoreError> {
        let mut session = self.sessions.touch(session_id)?;
        let encoded = serde_json::to_value(state)
            .map_err(|e| CoreError::fatal(format!("failed to serialize workflow state: {e}")))?;
        session.current_stage = state.current_step.map(|s| s.to_string()).unwrap_or_default();
        session.metadata.insert(WORKFLOW_STATE_KEY.to_string(), encoded);
        self.sessions.store().update(&session).map_err(CoreError::from)
    }
}

fn load_or_init_state(
    session: &ctz_core::Session,
    session_id: &SessionId,
    repository_path: std::path::PathBuf,
) -> Result<WorkflowState, CoreError> {
    match session.metadata.get(WORKFLOW_STATE_KEY) {
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| CoreError::fatal(format!("corrupt workflow state for session {session_id}: {e}"))),
        None => Ok(WorkflowState::new(session_id.clone(), repository_path)),
    }
}

fn to_object(value: &serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => map.clone(),
        other => {
            let mut map = serde_json::Map::new();
            map.insert("value".to_string(), other.clone());
            map
        }
    }
}

/// Writes a step's output into the state's typed artifact container.
/// `tag_image` and `deploy_application` overwrite fields of an
/// existing artifact rather than creating a new one; `push_image`,
/// `prepare_cluster`, and `verify_deployment` produce no artifact.
fn apply_artifact(
    step: StepName,
    state: &mut WorkflowState,
    data: &serde_json::Value,
) -> Result<(), CoreError> {
    let deserialize = |data: &serde_json::Value| -> Result<_, CoreError> {
        serde_json::from_value(data.clone())
            .map_err(|e| CoreError::fatal(format!("{step} returned data that doesn't match its artifact shape: {e}")))
    };

    match step {
        StepName::AnalyzeRepository => state.set_analyze_artifact(deserialize(data)?),
        StepName::ResolveBaseImages => state.set_base_images_artifact(deserialize(data)?),
        StepName::VerifyDockerfile => state.set_dockerfile_artifact(deserialize(data)?),
        StepName::BuildImage => state.set_build_artifact(deserialize(data)?),
        StepName::ScanImage => state.set_scan_artifact(deserialize(data)?),
        StepName::TagImage => state.set_build_artifact(deserialize(data)?),
        StepName::VerifyK8sManifests => state.set_k8s_artifact(deserialize(data)?),
        StepName::DeployApplication => state.set_k8s_artifact(deserialize(data)?),
        StepName::PushImage | StepName::PrepareCluster | StepName::VerifyDeployment => {}
    }
    Ok(())
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
