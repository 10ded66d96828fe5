// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Decides which step to re-invoke on a recoverable failure and builds
//! the category-specific repair prompt that goes with it. Bounds
//! self-redirects so a step that keeps failing the same way in a row
//! doesn't loop forever.

use ctz_core::{step, CoreError, StepName};
use ctz_wire::{RedirectContext, RedirectPayload, RepairPrompt};
use ctz_workflow::WorkflowState;

/// Default maximum number of times a step may redirect to itself for
/// the same session before the dispatcher gives up and reports a
/// terminal failure instead. `push_image` uses its own,
/// client-requested-but-server-capped limit instead of this constant
/// (see [`crate::dispatcher`]).
pub const MAX_SELF_REDIRECTS: u32 = 2;

pub enum Plan {
    Redirect(RedirectPayload),
    Terminal,
}

/// `consecutive_failures` is the number of times `failed_step` has just
/// failed in a row for this session (including the current failure),
/// tracked by the dispatcher across calls. `self_redirect_limit` bounds
/// self-redirects; callers pass [`MAX_SELF_REDIRECTS`] except for
/// `push_image`, which has its own configurable cap. `redirect_context`
/// carries the caller-supplied `fixing_mode`/`previous_error`/`failed_tool`
/// fields; a `failed_tool` that disagrees with `failed_step` means the
/// client re-entered a different corrective step than the one that
/// actually failed, which is worth a diagnostic, not a hard stop.
pub fn plan(
    failed_step: StepName,
    error: &CoreError,
    state: &WorkflowState,
    consecutive_failures: u32,
    self_redirect_limit: u32,
    redirect_context: &RedirectContext,
) -> Plan {
    let descriptor = step::descriptor(failed_step);
    let next_tool = descriptor.redirect;

    if descriptor.is_self_redirect() && consecutive_failures >= self_redirect_limit {
        return Plan::Terminal;
    }

    if let Some(failed_tool) = &redirect_context.failed_tool {
        if failed_tool != &failed_step.to_string() {
            tracing::warn!(
                event = "redirect.failed_tool_mismatch",
                claimed = %failed_tool,
                actual = %failed_step,
                "client's failed_tool disagrees with the step that actually failed"
            );
        }
    }

    let prompt = repair_prompt(failed_step, error, state, redirect_context);
    Plan::Redirect(RedirectPayload {
        next_tool: next_tool.to_string(),
        reason: format!("{failed_step} failed: {}", error.message),
        prompt,
    })
}

fn repair_prompt(
    failed_step: StepName,
    error: &CoreError,
    state: &WorkflowState,
    redirect_context: &RedirectContext,
) -> RepairPrompt {
    let mut prompt = match failed_step {
        StepName::VerifyDockerfile | StepName::BuildImage => docker_repair_prompt(error, state),
        StepName::ScanImage => docker_hardening_prompt(error, state),
        StepName::VerifyK8sManifests | StepName::PrepareCluster | StepName::DeployApplication => {
            kubernetes_repair_prompt(error, state)
        }
        _ => generic_repair_prompt(failed_step, error),
    };
    if let Some(previous_error) = &redirect_context.previous_error {
        prompt.user.push_str(&format!(
            "\n\nThe client reports this step previously failed with:\n\n{previous_error}"
        ));
    }
    prompt
}

fn docker_repair_prompt(error: &CoreError, state: &WorkflowState) -> RepairPrompt {
    let current_dockerfile = state
        .artifacts
        .dockerfile
        .as_ref()
        .map(|d| d.content_str().into_owned())
        .unwrap_or_default();
    RepairPrompt::new(
        "You are fixing a Dockerfile so it builds and passes policy checks. \
         Respond with the corrected Dockerfile body only.",
        format!(
            "The current Dockerfile is:\n\n{current_dockerfile}\n\nThe failure was:\n\n{}",
            error.message
        ),
        "A corrected Dockerfile body, no markdown fences, no commentary.",
        "docker_repair",
    )
}

/// Security-scan failures don't want a fresh Dockerfile rewrite — they
/// want the existing one hardened against the specific findings the
/// scanner raised.
fn docker_hardening_prompt(error: &CoreError, state: &WorkflowState) -> RepairPrompt {
    let current_dockerfile = state
        .artifacts
        .dockerfile
        .as_ref()
        .map(|d| d.content_str().into_owned())
        .unwrap_or_default();
    let remediations = state
        .artifacts
        .scan
        .as_ref()
        .map(|scan| scan.remediations.join("\n- "))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "none reported".to_string());
    let alternatives = state
        .artifacts
        .scan
        .as_ref()
        .map(|scan| scan.alternative_base_images.join(", "))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "none suggested".to_string());
    RepairPrompt::new(
        "You are hardening a Dockerfile against security-scan findings. \
         Respond with the corrected Dockerfile body only.",
        format!(
            "The current Dockerfile is:\n\n{current_dockerfile}\n\nThe scan failure was:\n\n{}\n\n\
             Recommended remediations:\n- {remediations}\n\nAlternative base images: {alternatives}",
            error.message
        ),
        "A hardened Dockerfile body, no markdown fences, no commentary.",
        "docker_hardening",
    )
}

fn kubernetes_repair_prompt(error: &CoreError, state: &WorkflowState) -> RepairPrompt {
    let manifests = state
        .artifacts
        .k8s
        .as_ref()
        .map(|k8s| {
            k8s.manifests
                .iter()
                .map(|m| format!("--- {} ({}) ---\n{}", m.name, m.kind, m.content))
                .collect::<Vec<_>>()
                .join("\n\n")
        })
        .unwrap_or_default();
    RepairPrompt::new(
        "You are fixing Kubernetes manifests so they pass policy and deploy \
         successfully. Respond with the corrected manifest set only.",
        format!("The current manifests are:\n\n{manifests}\n\nThe failure was:\n\n{}", error.message),
        "The corrected set of Kubernetes manifests.",
        "kubernetes_repair",
    )
}

fn generic_repair_prompt(failed_step: StepName, error: &CoreError) -> RepairPrompt {
    RepairPrompt::new(
        format!("You are correcting the outcome of the {failed_step} step."),
        format!("The failure was:\n\n{}", error.message),
        "Whatever corrected input the failed step needs.",
        "generic_repair",
    )
}

#[cfg(test)]
#[path = "redirect_tests.rs"]
mod tests;
