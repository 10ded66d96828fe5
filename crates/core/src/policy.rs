// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative policy rule and verdict types.
//!
//! These are pure data: the interpreter that evaluates them lives in
//! `ctz-policy`. Policy decisions stay data-driven — do not embed them
//! into handler code here or anywhere else.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rule category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Security,
    Quality,
    Performance,
    Compliance,
}

crate::simple_display! {
    Category {
        Security => "security",
        Quality => "quality",
        Performance => "performance",
        Compliance => "compliance",
    }
}

/// Rule severity. Defines the rule's effect class: `Block`
/// contributes to violations, `Warn` to warnings, `Suggest` to suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Block,
    Warn,
    Suggest,
}

crate::simple_display! {
    Severity {
        Block => "block",
        Warn => "warn",
        Suggest => "suggest",
    }
}

/// How a rule matches its input. `Regex` is evaluated against the raw input
/// text; `Predicate` names a built-in evaluator function (e.g.
/// `"hasVulnerabilities(levels)"`) resolved by the policy engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    Regex { pattern: String },
    Predicate { name: String, args: Vec<String> },
}

/// Free-form remediation/action payload attached to a rule.
pub type RuleAction = HashMap<String, serde_json::Value>;

/// A single declarative policy rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyRule {
    pub id: String,
    pub category: Category,
    /// 0–100; higher runs first within its severity bucket.
    pub priority: u8,
    pub severity: Severity,
    pub message: String,
    pub description: String,
    pub condition: Condition,
    #[serde(default)]
    pub action: RuleAction,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// One rule's contribution to a [`Verdict`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViolationEntry {
    pub rule: String,
    pub category: Category,
    pub priority: u8,
    pub severity: Severity,
    pub message: String,
    pub description: String,
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Category {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

impl Eq for Category {}

/// Aggregate counts for a [`Verdict`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerdictSummary {
    pub total_violations: usize,
    pub total_warnings: usize,
    pub total_suggestions: usize,
}

/// Result of evaluating a rule set against an input.
///
/// `allow` is derived, never set directly, so it can't drift from
/// `violations.is_empty()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    pub allow: bool,
    pub violations: Vec<ViolationEntry>,
    pub warnings: Vec<ViolationEntry>,
    pub suggestions: Vec<ViolationEntry>,
    pub summary: VerdictSummary,
}

impl Verdict {
    /// Build a verdict from the three severity buckets, sorting each by
    /// descending priority then ascending rule id, and deriving
    /// `allow` / `summary` so they can't drift from the buckets.
    pub fn from_buckets(
        mut violations: Vec<ViolationEntry>,
        mut warnings: Vec<ViolationEntry>,
        mut suggestions: Vec<ViolationEntry>,
    ) -> Self {
        let by_priority_then_id = |a: &ViolationEntry, b: &ViolationEntry| {
            b.priority.cmp(&a.priority).then_with(|| a.rule.cmp(&b.rule))
        };
        violations.sort_by(by_priority_then_id);
        warnings.sort_by(by_priority_then_id);
        suggestions.sort_by(by_priority_then_id);

        let summary = VerdictSummary {
            total_violations: violations.len(),
            total_warnings: warnings.len(),
            total_suggestions: suggestions.len(),
        };
        Self { allow: violations.is_empty(), violations, warnings, suggestions, summary }
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
