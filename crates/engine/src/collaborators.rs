// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trait boundaries for the external systems step handlers delegate to:
//! the repository walker, the image builder/scanner/registry, and the
//! cluster adapter. Concrete implementations (subprocess docker/kubectl
//! wrappers, the NPM-facing file walker) are wired in by the binary;
//! this crate only depends on the interface.

use async_trait::async_trait;
use ctz_core::{AnalyzeArtifact, CoreError, ManifestDescriptor};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("{0}")]
    Failed(String),
    #[error("{0}")]
    Transient(String),
}

impl CollaboratorError {
    pub fn is_transient(&self) -> bool {
        matches!(self, CollaboratorError::Transient(_))
    }
}

impl From<CollaboratorError> for CoreError {
    fn from(error: CollaboratorError) -> Self {
        match error {
            CollaboratorError::Transient(message) => CoreError::transient(message),
            CollaboratorError::Failed(message) => CoreError::handler_failure(message),
        }
    }
}

/// Walks a source repository to detect language, framework, entry
/// points, and dependency manifests.
#[async_trait]
pub trait RepositoryAnalyzer: Send + Sync {
    async fn analyze(&self, repo_path: &Path) -> Result<AnalyzeArtifact, CollaboratorError>;
}

/// Builds a container image from Dockerfile content in a workspace.
#[async_trait]
pub trait ImageBuilder: Send + Sync {
    async fn build(
        &self,
        dockerfile_content: &[u8],
        workspace: &Path,
    ) -> Result<BuildOutcome, CollaboratorError>;
}

pub struct BuildOutcome {
    pub image_ref: String,
    pub image_id: String,
    pub image_size_bytes: u64,
    pub build_duration_ms: u64,
}

/// Scans a built image for vulnerabilities.
#[async_trait]
pub trait ImageScanner: Send + Sync {
    async fn scan(&self, image_ref: &str) -> Result<ScanOutcome, CollaboratorError>;
}

pub struct ScanOutcome {
    pub risk_level: ctz_core::RiskLevel,
    pub remediations: Vec<String>,
    pub alternative_base_images: Vec<String>,
}

/// Tags and pushes images to a registry.
#[async_trait]
pub trait ImageRegistry: Send + Sync {
    async fn tag(&self, image_ref: &str, tag: &str) -> Result<String, CollaboratorError>;
    async fn push(&self, image_ref: &str, registry: &str) -> Result<(), CollaboratorError>;
}

/// Prepares a target cluster/namespace, applies manifests, and checks
/// deployed application health.
#[async_trait]
pub trait ClusterAdapter: Send + Sync {
    async fn prepare(&self, namespace: &str) -> Result<(), CollaboratorError>;
    async fn deploy(
        &self,
        manifests: &[ManifestDescriptor],
        namespace: &str,
    ) -> Result<Option<String>, CollaboratorError>;
    async fn verify(&self, namespace: &str) -> Result<bool, CollaboratorError>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod fakes {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    pub struct FakeRepositoryAnalyzer {
        pub result: AnalyzeArtifact,
    }

    #[async_trait]
    impl RepositoryAnalyzer for FakeRepositoryAnalyzer {
        async fn analyze(&self, _repo_path: &Path) -> Result<AnalyzeArtifact, CollaboratorError> {
            Ok(self.result.clone())
        }
    }

    pub struct FakeImageBuilder {
        pub should_fail: bool,
    }

    #[async_trait]
    impl ImageBuilder for FakeImageBuilder {
        async fn build(
            &self,
            dockerfile_content: &[u8],
            _workspace: &Path,
        ) -> Result<BuildOutcome, CollaboratorError> {
            if self.should_fail {
                return Err(CollaboratorError::Failed(format!(
                    "build failed for: {}",
                    String::from_utf8_lossy(dockerfile_content)
                )));
            }
            Ok(BuildOutcome {
                image_ref: "app:latest".to_string(),
                image_id: "sha256:deadbeef".to_string(),
                image_size_bytes: 42_000_000,
                build_duration_ms: 1500,
            })
        }
    }

    pub struct FakeImageScanner {
        pub risk_level: ctz_core::RiskLevel,
    }

    #[async_trait]
    impl ImageScanner for FakeImageScanner {
        async fn scan(&self, _image_ref: &str) -> Result<ScanOutcome, CollaboratorError> {
            Ok(ScanOutcome {
                risk_level: self.risk_level,
                remediations: Vec::new(),
                alternative_base_images: Vec::new(),
            })
        }
    }

    pub struct FakeImageRegistry {
        pub push_fails_until_attempt: u32,
        pub attempts: std::sync::Mutex<u32>,
    }

    impl Default for FakeImageRegistry {
        fn default() -> Self {
            Self { push_fails_until_attempt: 0, attempts: std::sync::Mutex::new(0) }
        }
    }

    #[async_trait]
    impl ImageRegistry for FakeImageRegistry {
        async fn tag(&self, image_ref: &str, tag: &str) -> Result<String, CollaboratorError> {
            Ok(format!("{image_ref}:{tag}"))
        }

        async fn push(&self, _image_ref: &str, _registry: &str) -> Result<(), CollaboratorError> {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            if *attempts <= self.push_fails_until_attempt {
                return Err(CollaboratorError::Transient("registry unavailable".to_string()));
            }
            Ok(())
        }
    }

    pub struct FakeClusterAdapter {
        pub endpoint: Option<String>,
        pub healthy: AtomicBool,
    }

    impl Default for FakeClusterAdapter {
        fn default() -> Self {
            Self { endpoint: Some("https://app.example.internal".to_string()), healthy: AtomicBool::new(true) }
        }
    }

    #[async_trait]
    impl ClusterAdapter for FakeClusterAdapter {
        async fn prepare(&self, _namespace: &str) -> Result<(), CollaboratorError> {
            Ok(())
        }

        async fn deploy(
            &self,
            _manifests: &[ManifestDescriptor],
            _namespace: &str,
        ) -> Result<Option<String>, CollaboratorError> {
            Ok(self.endpoint.clone())
        }

        async fn verify(&self, _namespace: &str) -> Result<bool, CollaboratorError> {
            Ok(self.healthy.load(Ordering::SeqCst))
        }
    }
}
