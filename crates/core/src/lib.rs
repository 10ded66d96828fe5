// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ctz-core: shared domain types for the containerization workflow engine.
//!
//! Every other crate in the workspace depends on this one for the session,
//! artifact, step-graph, policy, and sampling types that flow across the
//! dispatcher boundary. Nothing in here talks to disk, the network, or a
//! subprocess.

pub mod macros;

pub mod artifact;
pub mod clock;
pub mod error;
pub mod id;
pub mod policy;
pub mod sampling;
pub mod session;
pub mod step;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use artifact::{
    AnalyzeArtifact, Artifacts, BaseImagesArtifact, BuildArtifact, DockerfileArtifact, K8sArtifact,
    ManifestDescriptor, RiskLevel, ScanArtifact,
};
pub use clock::{Clock, FakeClock, SystemClock};
pub use error::{CoreError, ErrorClass};
pub use id::{short, IdBuf, ID_MAX_LEN};
pub use policy::{
    Category, Condition, PolicyRule, RuleAction, Severity, Verdict, VerdictSummary, ViolationEntry,
};
pub use sampling::{SamplingChunk, SamplingRequest, SamplingRequestBuilder, SamplingResponse, StopReason};
pub use session::{Session, SessionId, SessionStatus};
pub use step::{
    descriptor, prerequisite, total_steps, StepDescriptor, StepName, StepStatusKind, STEP_GRAPH,
};
