// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concrete collaborator implementations: subprocess-backed adapters
//! for Docker, Trivy, and kubectl, plus a filesystem-backed repository
//! analyzer. These are the only place in the workspace that shells out
//! or touches a container/cluster tool directly.

pub mod cluster;
pub mod docker;
pub mod registry;
pub mod repository;

pub use cluster::KubectlClusterAdapter;
pub use docker::{DockerImageBuilder, TrivyImageScanner};
pub use registry::DockerRegistryAdapter;
pub use repository::FilesystemRepositoryAnalyzer;
