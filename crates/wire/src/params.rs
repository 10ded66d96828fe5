// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed parameter structs for every tool in the surface. Each derives
//! [`schemars::JsonSchema`] so the server can hand a real input schema
//! to the MCP client instead of an untyped map.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Fields every non-utility tool accepts in addition to its own, used
/// by the redirect planner when the client re-enters a corrective step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RedirectContext {
    #[serde(default)]
    pub fixing_mode: bool,
    #[serde(default)]
    pub previous_error: Option<String>,
    #[serde(default)]
    pub failed_tool: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeRepositoryParams {
    pub session_id: String,
    pub repo_path: String,
    #[serde(flatten)]
    pub redirect: RedirectContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResolveBaseImagesParams {
    pub session_id: String,
    #[serde(flatten)]
    pub redirect: RedirectContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerifyDockerfileParams {
    pub session_id: String,
    pub dockerfile_content: String,
    #[serde(flatten)]
    pub redirect: RedirectContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BuildImageParams {
    pub session_id: String,
    #[serde(flatten)]
    pub redirect: RedirectContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScanImageParams {
    pub session_id: String,
    #[serde(flatten)]
    pub redirect: RedirectContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TagImageParams {
    pub session_id: String,
    pub tag: String,
    #[serde(flatten)]
    pub redirect: RedirectContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PushImageParams {
    pub session_id: String,
    pub registry: String,
    #[serde(default)]
    pub redirect_attempt: Option<u32>,
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(flatten)]
    pub redirect: RedirectContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerifyK8sManifestsParams {
    pub session_id: String,
    pub manifests: Vec<String>,
    #[serde(flatten)]
    pub redirect: RedirectContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PrepareClusterParams {
    pub session_id: String,
    #[serde(flatten)]
    pub redirect: RedirectContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DeployApplicationParams {
    pub session_id: String,
    #[serde(flatten)]
    pub redirect: RedirectContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerifyDeploymentParams {
    pub session_id: String,
    #[serde(flatten)]
    pub redirect: RedirectContext,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StartWorkflowParams {
    pub repo_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkflowStatusParams {
    pub session_id: String,
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;
