// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named predicate functions referenced from a rule's `Condition::Predicate`.
//! Each predicate consults the evaluator's `facts` map rather than the raw
//! content string directly, so rules can gate on structured information
//! (e.g. a scan's risk level) that isn't recoverable by regex.

use ctz_core::RiskLevel;
use serde_json::Value;
use std::collections::HashMap;

fn parse_risk_level(s: &str) -> Option<RiskLevel> {
    Some(match s.to_ascii_lowercase().as_str() {
        "none" => RiskLevel::None,
        "low" => RiskLevel::Low,
        "medium" => RiskLevel::Medium,
        "high" => RiskLevel::High,
        "critical" => RiskLevel::Critical,
        _ => return None,
    })
}

/// Evaluate a named predicate. Unknown predicate names are treated as
/// non-matching rather than erroring — an unrecognized predicate should
/// not block a whole evaluation run.
pub fn evaluate(name: &str, args: &[String], facts: &HashMap<String, Value>) -> bool {
    match name {
        "hasVulnerabilities" => has_vulnerabilities(args, facts),
        _ => {
            tracing::warn!(predicate = name, "unknown policy predicate, treating as non-match");
            false
        }
    }
}

/// `hasVulnerabilities(levels)`: true if the `risk_level` fact meets or
/// exceeds the minimum of the named levels in `args`.
fn has_vulnerabilities(args: &[String], facts: &HashMap<String, Value>) -> bool {
    let Some(threshold) = args.iter().filter_map(|a| parse_risk_level(a)).min() else {
        return false;
    };
    let Some(actual) = facts.get("risk_level").and_then(|v| v.as_str()) else {
        return false;
    };
    let Some(actual) = parse_risk_level(actual) else {
        return false;
    };
    actual >= threshold
}

#[cfg(test)]
#[path = "predicates_tests.rs"]
mod tests;
