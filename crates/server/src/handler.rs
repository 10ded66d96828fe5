// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The hand-implemented [`ServerHandler`]: maps the fixed tool surface
//! onto [`Dispatcher::dispatch`] and [`Orchestrator::run`], plus the
//! handful of utility tools the binary answers directly.

use crate::config;
use ctz_core::{Clock, SessionId};
use ctz_engine::{Dispatcher, Orchestrator};
use ctz_wire::{tools, DispatchResponse, StartWorkflowParams, WorkflowStatusParams};
use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, JsonObject, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::ErrorData as McpError;
use serde_json::{json, Value};
use std::borrow::Cow;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct CtzToolServer<C: Clock> {
    dispatcher: Arc<Dispatcher<C>>,
    orchestrator: Arc<Orchestrator<C>>,
    clock: C,
    started_at_ms: u64,
    max_sessions: Option<usize>,
}

impl<C: Clock> CtzToolServer<C> {
    pub fn new(
        dispatcher: Arc<Dispatcher<C>>,
        orchestrator: Arc<Orchestrator<C>>,
        clock: C,
        max_sessions: Option<usize>,
    ) -> Self {
        let started_at_ms = clock.epoch_ms();
        Self { dispatcher, orchestrator, clock, started_at_ms, max_sessions }
    }

    fn tool_definition(name: &str, description: &str, schema: Value) -> Tool {
        let schema: JsonObject = schema.as_object().cloned().unwrap_or_default();
        Tool::new(Cow::Owned(name.to_string()), Cow::Owned(description.to_string()), Arc::new(schema))
    }

    fn empty_schema() -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn call_workflow_status(&self, arguments: JsonObject) -> Result<CallToolResult, McpError> {
        let params: WorkflowStatusParams = parse_args(arguments)?;
        let session_id = SessionId::new(params.session_id.clone());
        let state = match self.dispatcher.load_state(&session_id) {
            Ok(state) => state,
            Err(error) => return Ok(result_from_response(DispatchResponse::failure(params.session_id, &error))),
        };
        let payload = json!({
            "success": true,
            "session_id": params.session_id,
            "status": state.status.to_string(),
            "progress_percentage": state.progress_percentage(),
            "current_step": state.current_step.map(|s| s.to_string()),
            "completed_steps": state.completed.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            "failed_steps": state.failed.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        });
        Ok(structured_result(payload))
    }

    async fn call_start_workflow(&self, arguments: JsonObject) -> Result<CallToolResult, McpError> {
        let params: StartWorkflowParams = parse_args(arguments)?;
        // rmcp's RequestContext carries no cancellation signal of its own, so
        // a fresh token is minted here; it still makes cancellation
        // reachable end to end once a transport that exposes one is wired in.
        let cancel = CancellationToken::new();
        match self.orchestrator.run(&params.repo_path, &cancel).await {
            Ok(result) => Ok(structured_result(
                serde_json::to_value(&result).unwrap_or_else(|_| json!({ "session_id": result.session_id })),
            )),
            Err(failure) => Ok(result_from_response(failure.response)),
        }
    }

    fn call_ping(&self) -> CallToolResult {
        structured_result(json!({ "status": "ok", "service": config::service_name() }))
    }

    fn call_list_tools(&self) -> CallToolResult {
        structured_result(json!({ "tools": tools::all_tool_names() }))
    }

    fn call_server_status(&self) -> CallToolResult {
        let uptime_ms = self.clock.epoch_ms().saturating_sub(self.started_at_ms);
        structured_result(json!({
            "service": config::service_name(),
            "version": config::service_version(),
            "uptime_ms": uptime_ms,
            "max_sessions": self.max_sessions,
            "workflow_mode": format!("{:?}", config::workflow_mode().unwrap_or(config::WorkflowMode::Interactive)),
        }))
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(arguments: JsonObject) -> Result<T, McpError> {
    serde_json::from_value(Value::Object(arguments.into_iter().collect()))
        .map_err(|err| McpError::invalid_params(err.to_string(), None))
}

fn structured_result(payload: Value) -> CallToolResult {
    let text = serde_json::to_string(&payload).unwrap_or_else(|_| payload.to_string());
    CallToolResult {
        content: vec![Content::text(text)],
        structured_content: Some(payload),
        is_error: Some(false),
        meta: None,
    }
}

fn result_from_response(response: DispatchResponse) -> CallToolResult {
    let is_error = !response.success && response.redirect.is_none();
    let payload = serde_json::to_value(&response).unwrap_or(Value::Null);
    let text = serde_json::to_string(&payload).unwrap_or_else(|_| payload.to_string());
    CallToolResult {
        content: vec![Content::text(text)],
        structured_content: Some(payload),
        is_error: Some(is_error),
        meta: None,
    }
}

#[allow(clippy::manual_async_fn)]
impl<C: Clock + 'static> ServerHandler for CtzToolServer<C> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().enable_tool_list_changed().build(),
            ..ServerInfo::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        async move {
            let mut defs: Vec<Tool> = tools::TOOL_CATALOG
                .iter()
                .map(|t| Self::tool_definition(t.name, t.description, t.input_schema()))
                .collect();
            let status = tools::workflow_status_descriptor();
            defs.push(Self::tool_definition(status.name, status.description, status.input_schema()));
            defs.push(Self::tool_definition("list_tools", "List every tool this server exposes.", Self::empty_schema()));
            defs.push(Self::tool_definition("ping", "Liveness check.", Self::empty_schema()));
            defs.push(Self::tool_definition("server_status", "Report service identity and uptime.", Self::empty_schema()));
            Ok(ListToolsResult { tools: defs, next_cursor: None })
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        info!(event = "mcp.call_tool", tool = %request.name);
        let arguments = request.arguments.unwrap_or_default();

        match request.name.as_ref() {
            "start_workflow" => self.call_start_workflow(arguments).await,
            "workflow_status" => self.call_workflow_status(arguments).await,
            "ping" => Ok(self.call_ping()),
            "list_tools" => Ok(self.call_list_tools()),
            "server_status" => Ok(self.call_server_status()),
            name if tools::TOOL_CATALOG.iter().any(|t| t.name == name) => {
                let params: serde_json::Map<String, Value> = arguments.into_iter().collect();
                let cancel = CancellationToken::new();
                let response = self.dispatcher.dispatch(name, params, &cancel).await;
                Ok(result_from_response(response))
            }
            other => Err(McpError::invalid_params(format!("unknown tool: {other}"), None)),
        }
    }
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
