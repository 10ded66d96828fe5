// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The static step graph.
//!
//! `STEP_GRAPH` is populated once, at compile time, and is the single
//! source of truth other components derive from: the step registry builds
//! its handler map over it, the redirect planner walks its `redirect`
//! column, and `workflow_status` derives `total_steps` from its length
//! rather than hard-coding the literal.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the eleven named pipeline steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepName {
    AnalyzeRepository,
    ResolveBaseImages,
    VerifyDockerfile,
    BuildImage,
    ScanImage,
    TagImage,
    PushImage,
    VerifyK8sManifests,
    PrepareCluster,
    DeployApplication,
    VerifyDeployment,
}

crate::simple_display! {
    StepName {
        AnalyzeRepository => "analyze_repository",
        ResolveBaseImages => "resolve_base_images",
        VerifyDockerfile => "verify_dockerfile",
        BuildImage => "build_image",
        ScanImage => "scan_image",
        TagImage => "tag_image",
        PushImage => "push_image",
        VerifyK8sManifests => "verify_k8s_manifests",
        PrepareCluster => "prepare_cluster",
        DeployApplication => "deploy_application",
        VerifyDeployment => "verify_deployment",
    }
}

/// Error returned when a step name doesn't match any entry in [`StepName`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown step name: {0}")]
pub struct UnknownStepName(pub String);

impl FromStr for StepName {
    type Err = UnknownStepName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "analyze_repository" => StepName::AnalyzeRepository,
            "resolve_base_images" => StepName::ResolveBaseImages,
            "verify_dockerfile" => StepName::VerifyDockerfile,
            "build_image" => StepName::BuildImage,
            "scan_image" => StepName::ScanImage,
            "tag_image" => StepName::TagImage,
            "push_image" => StepName::PushImage,
            "verify_k8s_manifests" => StepName::VerifyK8sManifests,
            "prepare_cluster" => StepName::PrepareCluster,
            "deploy_application" => StepName::DeployApplication,
            "verify_deployment" => StepName::VerifyDeployment,
            other => return Err(UnknownStepName(other.to_string())),
        })
    }
}

/// Status of a single step within a session's workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatusKind {
    NotStarted,
    Running,
    Completed,
    Failed,
}

crate::simple_display! {
    StepStatusKind {
        NotStarted => "not-started",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
    }
}

/// A node in the static step graph: what comes next on success, and where
/// a failure gets redirected. `redirect == name` encodes
/// a self-loop.
#[derive(Debug, Clone, Copy)]
pub struct StepDescriptor {
    pub name: StepName,
    /// `None` only for the terminal step (`verify_deployment`).
    pub next: Option<StepName>,
    pub redirect: StepName,
}

impl StepDescriptor {
    pub fn is_self_redirect(&self) -> bool {
        self.redirect == self.name
    }
}

/// The static pipeline graph, in declaration order.
pub static STEP_GRAPH: &[StepDescriptor] = &[
    StepDescriptor {
        name: StepName::AnalyzeRepository,
        next: Some(StepName::ResolveBaseImages),
        redirect: StepName::AnalyzeRepository,
    },
    StepDescriptor {
        name: StepName::ResolveBaseImages,
        next: Some(StepName::VerifyDockerfile),
        redirect: StepName::ResolveBaseImages,
    },
    StepDescriptor {
        name: StepName::VerifyDockerfile,
        next: Some(StepName::BuildImage),
        redirect: StepName::VerifyDockerfile,
    },
    StepDescriptor {
        name: StepName::BuildImage,
        next: Some(StepName::ScanImage),
        redirect: StepName::VerifyDockerfile,
    },
    StepDescriptor {
        name: StepName::ScanImage,
        next: Some(StepName::TagImage),
        redirect: StepName::VerifyDockerfile,
    },
    StepDescriptor {
        name: StepName::TagImage,
        next: Some(StepName::PushImage),
        redirect: StepName::TagImage,
    },
    StepDescriptor {
        name: StepName::PushImage,
        next: Some(StepName::VerifyK8sManifests),
        redirect: StepName::PushImage,
    },
    StepDescriptor {
        name: StepName::VerifyK8sManifests,
        next: Some(StepName::PrepareCluster),
        redirect: StepName::VerifyK8sManifests,
    },
    StepDescriptor {
        name: StepName::PrepareCluster,
        next: Some(StepName::DeployApplication),
        redirect: StepName::PrepareCluster,
    },
    StepDescriptor {
        name: StepName::DeployApplication,
        next: Some(StepName::VerifyDeployment),
        redirect: StepName::VerifyK8sManifests,
    },
    StepDescriptor {
        name: StepName::VerifyDeployment,
        next: None,
        redirect: StepName::DeployApplication,
    },
];

/// Total number of distinct steps in the graph, derived rather than hard-coded.
pub fn total_steps() -> usize {
    STEP_GRAPH.len()
}

/// Look up a step's descriptor by name.
pub fn descriptor(name: StepName) -> &'static StepDescriptor {
    STEP_GRAPH
        .iter()
        .find(|d| d.name == name)
        .unwrap_or_else(|| unreachable!("STEP_GRAPH is exhaustive over StepName: {name}"))
}

/// Every prerequisite `P` such that `P`'s `next` is `name` (invariant b:
/// a completed step implies all of its declared prerequisites are completed too).
pub fn prerequisite(name: StepName) -> Option<StepName> {
    STEP_GRAPH.iter().find(|d| d.next == Some(name)).map(|d| d.name)
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
