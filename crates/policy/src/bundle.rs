// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Loading and merging of policy bundles: one rule document per
//! category plus named environment overlays (§6.4 of the workflow
//! engine's external interfaces).

use ctz_core::{Category, PolicyRule};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Which input kind a rule's condition is meant to run against.
/// `None` on a rule means it is universal and runs against every input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Dockerfile,
    K8sManifest,
}

/// A single category's rule document, as read from disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDocument {
    pub category: Category,
    pub rules: Vec<PolicyRule>,
    #[serde(default)]
    pub applies_to: HashMap<String, InputKind>,
}

/// One override entry inside an environment overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleOverride {
    pub rule_id: String,
    pub priority: Option<u8>,
    pub enabled: Option<bool>,
    #[serde(default)]
    pub actions: Option<ctz_core::RuleAction>,
}

/// A named environment's overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentOverlay {
    pub overrides: Vec<RuleOverride>,
}

#[derive(Debug, Error)]
pub enum PolicyLoadError {
    #[error("failed to read policy document {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },
    #[error("failed to parse policy document {path}: {source}")]
    Parse { path: String, #[source] source: serde_json::Error },
}

/// A loaded set of rules plus environment overlays, ready for
/// evaluation. Rules are keyed by id for overlay application.
#[derive(Debug, Clone, Default)]
pub struct PolicyBundle {
    pub rules: Vec<PolicyRule>,
    pub applies_to: HashMap<String, InputKind>,
    pub environments: HashMap<String, EnvironmentOverlay>,
}

impl PolicyBundle {
    /// Load every `*.json` file in `dir` as a [`RuleDocument`], and
    /// `dir/environments.json` (if present) as the overlay map.
    pub fn load_dir(dir: &Path) -> Result<Self, PolicyLoadError> {
        let mut bundle = PolicyBundle::default();
        let entries = std::fs::read_dir(dir).map_err(|e| PolicyLoadError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if path.file_name().and_then(|n| n.to_str()) == Some("environments.json") {
                let text = std::fs::read_to_string(&path).map_err(|e| PolicyLoadError::Io {
                    path: path.display().to_string(),
                    source: e,
                })?;
                bundle.environments =
                    serde_json::from_str(&text).map_err(|e| PolicyLoadError::Parse {
                        path: path.display().to_string(),
                        source: e,
                    })?;
                continue;
            }
            let text = std::fs::read_to_string(&path).map_err(|e| PolicyLoadError::Io {
                path: path.display().to_string(),
                source: e,
            })?;
            let doc: RuleDocument =
                serde_json::from_str(&text).map_err(|e| PolicyLoadError::Parse {
                    path: path.display().to_string(),
                    source: e,
                })?;
            bundle.rules.extend(doc.rules);
            bundle.applies_to.extend(doc.applies_to);
        }
        Ok(bundle)
    }

    /// A minimal bundle the server ships with so it's usable without
    /// `POLICY_PATH` configured (§10.7 of the expanded spec).
    pub fn built_in() -> Self {
        use ctz_core::{Condition, Severity};

        let mut applies_to = HashMap::new();
        applies_to.insert("block-root-user".to_string(), InputKind::Dockerfile);
        applies_to.insert("no-latest-tag".to_string(), InputKind::Dockerfile);
        applies_to.insert("privileged-container".to_string(), InputKind::K8sManifest);

        Self {
            rules: vec![
                PolicyRule {
                    id: "block-root-user".to_string(),
                    category: Category::Security,
                    priority: 90,
                    severity: Severity::Block,
                    message: "container must not run as root".to_string(),
                    description: "USER root (or an unset USER, which defaults to root) is disallowed".to_string(),
                    condition: Condition::Regex { pattern: r"(?m)^\s*USER\s+root\s*$".to_string() },
                    action: HashMap::new(),
                    enabled: true,
                },
                PolicyRule {
                    id: "no-latest-tag".to_string(),
                    category: Category::Quality,
                    priority: 40,
                    severity: Severity::Warn,
                    message: "avoid the `latest` tag on base images".to_string(),
                    description: "pin a specific version so builds are reproducible".to_string(),
                    condition: Condition::Regex { pattern: r"(?m)^\s*FROM\s+\S+:latest\b".to_string() },
                    action: HashMap::new(),
                    enabled: true,
                },
                PolicyRule {
                    id: "privileged-container".to_string(),
                    category: Category::Security,
                    priority: 95,
                    severity: Severity::Block,
                    message: "containers must not request privileged mode".to_string(),
                    description: "privileged: true grants the container host-equivalent access".to_string(),
                    condition: Condition::Regex { pattern: r"privileged:\s*true".to_string() },
                    action: HashMap::new(),
                    enabled: true,
                },
                PolicyRule {
                    id: "no-high-risk-vulnerabilities".to_string(),
                    category: Category::Security,
                    priority: 90,
                    severity: Severity::Block,
                    message: "image scan reported a risk level at or above the allowed threshold".to_string(),
                    description: "gates scan_image on the vulnerability risk level the scanner reported"
                        .to_string(),
                    condition: Condition::Predicate {
                        name: "hasVulnerabilities".to_string(),
                        args: vec!["high".to_string(), "critical".to_string()],
                    },
                    action: HashMap::new(),
                    enabled: true,
                },
            ],
            applies_to,
            environments: HashMap::new(),
        }
    }
}

#[cfg(test)]
#[path = "bundle_tests.rs"]
mod tests;
