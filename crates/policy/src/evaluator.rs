// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The rule evaluator: detects input kind, applies environment
//! overlays, evaluates each enabled rule's condition, and aggregates a
//! [`Verdict`].

use crate::bundle::{InputKind, PolicyBundle};
use crate::predicates;
use ctz_core::{Condition, PolicyRule, Severity, Verdict, ViolationEntry};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

/// Detect whether `content` looks like a Dockerfile, a Kubernetes
/// manifest, or neither.
pub fn detect_input_kind(content: &str) -> Option<InputKind> {
    if content.lines().any(|l| l.trim_start().starts_with("FROM ")) {
        Some(InputKind::Dockerfile)
    } else if content.lines().any(|l| l.trim_start().starts_with("apiVersion:")) {
        Some(InputKind::K8sManifest)
    } else {
        None
    }
}

/// Apply a named environment's overrides onto the bundle's base rules,
/// producing the effective rule list for this evaluation. Overlay
/// priority supersedes the base; an override with `enabled: Some(false)`
/// disables a rule outright.
fn effective_rules(bundle: &PolicyBundle, environment: Option<&str>) -> Vec<PolicyRule> {
    let mut rules = bundle.rules.clone();
    let Some(env) = environment.and_then(|name| bundle.environments.get(name)) else {
        return rules;
    };
    for over in &env.overrides {
        if let Some(rule) = rules.iter_mut().find(|r| r.id == over.rule_id) {
            if let Some(priority) = over.priority {
                rule.priority = priority;
            }
            if let Some(enabled) = over.enabled {
                rule.enabled = enabled;
            }
            if let Some(actions) = &over.actions {
                rule.action = actions.clone();
            }
        }
    }
    rules
}

fn condition_matches(rule: &PolicyRule, content: &str, facts: &HashMap<String, Value>) -> bool {
    match &rule.condition {
        Condition::Regex { pattern } => {
            match Regex::new(pattern) {
                Ok(re) => re.is_match(content),
                Err(e) => {
                    tracing::warn!(rule = %rule.id, error = %e, "invalid policy regex, treating as non-match");
                    false
                }
            }
        }
        Condition::Predicate { name, args } => predicates::evaluate(name, args, facts),
    }
}

/// Evaluate `content` (optionally scoped to `environment`) against
/// `bundle`, folding in any out-of-band `facts` that predicate
/// conditions need (e.g. `{"risk_level": "high"}`).
///
/// Determinism: for identical `(bundle, content, environment, facts)`
/// this always returns byte-identical violations/warnings/suggestions
/// lists — there is no hidden randomness or wall-clock dependency in
/// rule evaluation or sort order.
pub fn evaluate(
    bundle: &PolicyBundle,
    content: &str,
    environment: Option<&str>,
    facts: &HashMap<String, Value>,
) -> Verdict {
    let kind = detect_input_kind(content);
    let rules = effective_rules(bundle, environment);

    let mut violations = Vec::new();
    let mut warnings = Vec::new();
    let mut suggestions = Vec::new();

    for rule in &rules {
        if !rule.enabled {
            continue;
        }
        if let Some(required_kind) = bundle.applies_to.get(&rule.id) {
            if Some(*required_kind) != kind {
                continue;
            }
        }
        if !condition_matches(rule, content, facts) {
            continue;
        }
        let entry = ViolationEntry {
            rule: rule.id.clone(),
            category: rule.category,
            priority: rule.priority,
            severity: rule.severity,
            message: rule.message.clone(),
            description: rule.description.clone(),
        };
        match rule.severity {
            Severity::Block => violations.push(entry),
            Severity::Warn => warnings.push(entry),
            Severity::Suggest => suggestions.push(entry),
        }
    }

    Verdict::from_buckets(violations, warnings, suggestions)
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
