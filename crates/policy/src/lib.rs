// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Declarative policy evaluation: rule bundles loaded from disk (or a
//! built-in fallback), named predicates, and the evaluator that turns
//! a Dockerfile or manifest into a [`ctz_core::Verdict`].

pub mod bundle;
pub mod evaluator;
pub mod predicates;

pub use bundle::{EnvironmentOverlay, InputKind, PolicyBundle, PolicyLoadError, RuleDocument, RuleOverride};
pub use evaluator::{detect_input_kind, evaluate};

use std::collections::HashMap;
use std::path::Path;

/// A loaded bundle plus the facts needed to evaluate it; the thing a
/// caller actually holds onto across requests.
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    bundle: PolicyBundle,
}

impl PolicyEngine {
    /// Load rule documents from `dir` (see [`PolicyBundle::load_dir`]).
    pub fn load(dir: &Path) -> Result<Self, PolicyLoadError> {
        Ok(Self { bundle: PolicyBundle::load_dir(dir)? })
    }

    /// The bundle the server ships with when no policy directory is
    /// configured.
    pub fn built_in() -> Self {
        Self { bundle: PolicyBundle::built_in() }
    }

    /// Evaluate `content` against the loaded bundle, scoped to
    /// `environment` if given, folding in any out-of-band `facts`.
    pub fn evaluate(
        &self,
        content: &str,
        environment: Option<&str>,
        facts: &HashMap<String, serde_json::Value>,
    ) -> ctz_core::Verdict {
        let verdict = evaluator::evaluate(&self.bundle, content, environment, facts);
        tracing::info!(
            event = "policy.eval",
            environment,
            allow = verdict.allow,
            violations = verdict.summary.total_violations,
            warnings = verdict.summary.total_warnings,
            "policy.eval"
        );
        verdict
    }

    pub fn bundle(&self) -> &PolicyBundle {
        &self.bundle
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
