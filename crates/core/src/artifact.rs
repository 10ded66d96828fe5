// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed per-step artifact records and the `Artifacts` container
//! a session's workflow state carries them in.
//!
//! Later steps take a typed record by value rather than an untyped
//! `map<string, any>`, decoupling analysis from build. Internal APIs
//! accept loosely-typed maps only for the free-form `metadata` bag.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Output of `analyze_repository`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeArtifact {
    pub language: String,
    pub framework: Option<String>,
    pub default_port: u16,
    pub build_command: Option<String>,
    pub start_command: Option<String>,
    pub dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,
    pub repository_path: PathBuf,
}

/// Output of `resolve_base_images`.
///
/// Not separately enumerated in the distilled artifact list but referenced
/// by the `Artifacts` container — modeled the way `ScanArtifact`
/// models alternatives: a ranked candidate list plus the one actually chosen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseImagesArtifact {
    pub candidates: Vec<String>,
    pub selected: String,
    pub rationale: String,
}

/// Output of `verify_dockerfile`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerfileArtifact {
    pub content: Vec<u8>,
    pub path: PathBuf,
    pub metadata: HashMap<String, String>,
}

impl DockerfileArtifact {
    pub fn content_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Output of `build_image`. Also mutated (image reference) by `tag_image`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildArtifact {
    pub image_ref: String,
    pub image_id: String,
    pub image_size_bytes: u64,
    pub build_duration_ms: u64,
    pub metadata: HashMap<String, String>,
}

/// Risk level reported by `scan_image`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

crate::simple_display! {
    RiskLevel {
        None => "none",
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

/// Output of `scan_image`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanArtifact {
    pub risk_level: RiskLevel,
    pub remediations: Vec<String>,
    pub alternative_base_images: Vec<String>,
}

/// One rendered Kubernetes manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestDescriptor {
    pub name: String,
    pub kind: String,
    pub content: String,
}

/// Output of `verify_k8s_manifests` / `prepare_cluster`; `endpoint` is filled
/// in by `deploy_application` — the deployment artifact is this struct's
/// `endpoint` field, not a separate record (see DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct K8sArtifact {
    pub manifests: Vec<ManifestDescriptor>,
    pub namespace: String,
    pub endpoint: Option<String>,
    pub metadata: HashMap<String, String>,
}

/// The session's artifact container.
///
/// Invariant (c): a field is populated if and only if the step that
/// produces it is in the session's `completed` list. `WorkflowState`
/// enforces this by only calling the setters below from
/// `mark_step_completed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Artifacts {
    pub analyze: Option<AnalyzeArtifact>,
    pub base_images: Option<BaseImagesArtifact>,
    pub dockerfile: Option<DockerfileArtifact>,
    pub build: Option<BuildArtifact>,
    pub scan: Option<ScanArtifact>,
    pub k8s: Option<K8sArtifact>,
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
