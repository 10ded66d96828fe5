// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-session workflow state: status, step bookkeeping, and the
//! typed artifact container.

use ctz_core::{
    descriptor, prerequisite, AnalyzeArtifact, Artifacts, BaseImagesArtifact, BuildArtifact,
    CoreError, DockerfileArtifact, K8sArtifact, ScanArtifact, SessionId, StepName, StepStatusKind,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Overall status of a session's workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Initialized,
    Running,
    Completed,
    Error,
}

ctz_core::simple_display! {
    WorkflowStatus {
        Initialized => "initialized",
        Running => "running",
        Completed => "completed",
        Error => "error",
    }
}

/// The session's artifact container plus step bookkeeping.
///
/// Invariant (b): if `completed` contains step S, every prerequisite of
/// S is also in `completed`. Invariant (a): a step name appears in at
/// most one of `completed`/`failed`. Both are enforced by
/// [`WorkflowState::mark_step_completed`] / [`mark_step_failed`] rather
/// than left to callers to maintain by hand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub session_id: SessionId,
    pub repository_path: PathBuf,
    pub status: WorkflowStatus,
    pub current_step: Option<StepName>,
    pub completed: Vec<StepName>,
    pub failed: Vec<StepName>,
    pub artifacts: Artifacts,
}

impl WorkflowState {
    pub fn new(session_id: SessionId, repository_path: PathBuf) -> Self {
        Self {
            session_id,
            repository_path,
            status: WorkflowStatus::Initialized,
            current_step: None,
            completed: Vec::new(),
            failed: Vec::new(),
            artifacts: Artifacts::default(),
        }
    }

    /// True if `step` is currently in the `failed` list.
    pub fn is_step_failed(&self, step: StepName) -> bool {
        self.failed.contains(&step)
    }

    /// True if `step` is currently in the `completed` list.
    pub fn is_step_completed(&self, step: StepName) -> bool {
        self.completed.contains(&step)
    }

    /// Derive the four-state status for a step from `completed`/`failed`
    /// and whether it is the active `current_step`.
    pub fn get_step_status(&self, step: StepName) -> StepStatusKind {
        if self.completed.contains(&step) {
            StepStatusKind::Completed
        } else if self.failed.contains(&step) {
            StepStatusKind::Failed
        } else if self.current_step == Some(step) {
            StepStatusKind::Running
        } else {
            StepStatusKind::NotStarted
        }
    }

    /// Mark `step` completed: clears any prior failed marker, verifies
    /// prerequisites are already completed, appends to `completed`,
    /// advances `current_step` to the graph's declared `next`.
    pub fn mark_step_completed(&mut self, step: StepName) -> Result<(), CoreError> {
        if let Some(prereq) = prerequisite(step) {
            if !self.completed.contains(&prereq) {
                return Err(CoreError::validation(format!(
                    "cannot complete {step}: prerequisite {prereq} is not completed"
                )));
            }
        }
        self.failed.retain(|s| *s != step);
        if !self.completed.contains(&step) {
            self.completed.push(step);
        }
        let d = descriptor(step);
        self.current_step = d.next.or(Some(step));
        self.status = if d.next.is_none() {
            WorkflowStatus::Completed
        } else {
            WorkflowStatus::Running
        };
        Ok(())
    }

    /// Mark `step` failed: removes any completed marker (a step must not
    /// be both), appends to `failed`, sets overall status to error.
    pub fn mark_step_failed(&mut self, step: StepName) {
        self.completed.retain(|s| *s != step);
        if !self.failed.contains(&step) {
            self.failed.push(step);
        }
        self.current_step = Some(step);
        self.status = WorkflowStatus::Error;
    }

    /// Progress through the static graph as a percentage of total steps.
    pub fn progress_percentage(&self) -> u8 {
        let total = ctz_core::step::total_steps();
        if total == 0 {
            return 0;
        }
        ((self.completed.len() * 100) / total) as u8
    }

    pub fn set_analyze_artifact(&mut self, artifact: AnalyzeArtifact) {
        self.artifacts.analyze = Some(artifact);
    }

    pub fn set_base_images_artifact(&mut self, artifact: BaseImagesArtifact) {
        self.artifacts.base_images = Some(artifact);
    }

    pub fn set_dockerfile_artifact(&mut self, artifact: DockerfileArtifact) {
        self.artifacts.dockerfile = Some(artifact);
    }

    pub fn set_build_artifact(&mut self, artifact: BuildArtifact) {
        self.artifacts.build = Some(artifact);
    }

    pub fn set_scan_artifact(&mut self, artifact: ScanArtifact) {
        self.artifacts.scan = Some(artifact);
    }

    pub fn set_k8s_artifact(&mut self, artifact: K8sArtifact) {
        self.artifacts.k8s = Some(artifact);
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
