// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The tool surface catalogue: fixed names, descriptions, and
//! schemars-generated input schemas. Tool names are snake_case and
//! stable — they are part of the external contract.

use crate::params::*;
use schemars::schema_for;
use serde_json::Value;

/// One externally visible tool: a fixed name, a human description, and
/// a JSON schema describing its accepted parameters.
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    schema_fn: fn() -> Value,
}

impl ToolDescriptor {
    pub fn input_schema(&self) -> Value {
        (self.schema_fn)()
    }
}

fn schema_of<T: schemars::JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or(Value::Null)
}

macro_rules! tool {
    ($name:expr, $description:expr, $params:ty) => {
        ToolDescriptor { name: $name, description: $description, schema_fn: schema_of::<$params> }
    };
}

/// The fixed, bit-exact tool surface.
pub const TOOL_CATALOG: &[ToolDescriptor] = &[
    tool!(
        "analyze_repository",
        "Analyze a source repository to detect language, framework, and entry points.",
        AnalyzeRepositoryParams
    ),
    tool!(
        "resolve_base_images",
        "Resolve candidate base images for the analyzed repository.",
        ResolveBaseImagesParams
    ),
    tool!(
        "verify_dockerfile",
        "Validate Dockerfile content against policy before building.",
        VerifyDockerfileParams
    ),
    tool!("build_image", "Build a container image from the verified Dockerfile.", BuildImageParams),
    tool!("scan_image", "Scan the built image for vulnerabilities.", ScanImageParams),
    tool!("tag_image", "Tag the built image.", TagImageParams),
    tool!("push_image", "Push the tagged image to a registry.", PushImageParams),
    tool!(
        "verify_k8s_manifests",
        "Validate Kubernetes manifests against policy before applying them.",
        VerifyK8sManifestsParams
    ),
    tool!("prepare_cluster", "Prepare the target cluster/namespace for deployment.", PrepareClusterParams),
    tool!("deploy_application", "Apply the verified manifests to the cluster.", DeployApplicationParams),
    tool!("verify_deployment", "Verify the deployed application is healthy.", VerifyDeploymentParams),
    tool!("start_workflow", "Run the full pipeline end to end via the orchestrator.", StartWorkflowParams),
];

/// Names that don't carry parameters worth schema-fying (`schema_for!`
/// on a unit struct still works, but there's nothing to validate).
pub const UTILITY_TOOL_NAMES: &[&str] = &["list_tools", "ping", "server_status"];

/// `workflow_status` has its own tiny params struct but isn't part of
/// the step pipeline, so it's listed separately from [`TOOL_CATALOG`].
pub fn workflow_status_descriptor() -> ToolDescriptor {
    tool!("workflow_status", "Report progress and status for a session.", WorkflowStatusParams)
}

/// All tool names in a fixed order, including utilities — used by the
/// `list_tools` handler.
pub fn all_tool_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = TOOL_CATALOG.iter().map(|t| t.name).collect();
    names.push("workflow_status");
    names.extend_from_slice(UTILITY_TOOL_NAMES);
    names
}

#[cfg(test)]
#[path = "tools_tests.rs"]
mod tests;
