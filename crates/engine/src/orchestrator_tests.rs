use super::*;
use crate::collaborators::fakes::{
    FakeClusterAdapter, FakeImageBuilder, FakeImageRegistry, FakeImageScanner, FakeRepositoryAnalyzer,
};
use crate::handlers::{
    AnalyzeRepositoryHandler, BuildImageHandler, DeployApplicationHandler, PrepareClusterHandler,
    PushImageHandler, ResolveBaseImagesHandler, ScanImageHandler, TagImageHandler, VerifyDeploymentHandler,
    VerifyDockerfileHandler, VerifyK8sManifestsHandler,
};
use ctz_core::{AnalyzeArtifact, FakeClock, RiskLevel};
use ctz_policy::PolicyEngine;
use ctz_storage::{SessionManager, SessionStore};
use ctz_workflow::StepRegistry;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

fn build_registry(should_fail_build: bool) -> Arc<StepRegistry> {
    let policy = Arc::new(PolicyEngine::built_in());
    Arc::new(
        StepRegistry::builder()
            .register(
                StepName::AnalyzeRepository,
                Arc::new(AnalyzeRepositoryHandler {
                    analyzer: Arc::new(FakeRepositoryAnalyzer {
                        result: AnalyzeArtifact {
                            language: "node".to_string(),
                            framework: None,
                            default_port: 3000,
                            build_command: None,
                            start_command: None,
                            dependencies: vec![],
                            dev_dependencies: vec![],
                            repository_path: PathBuf::from("/repo"),
                        },
                    }),
                }),
            )
            .register(StepName::ResolveBaseImages, Arc::new(ResolveBaseImagesHandler { ai: None }))
            .register(StepName::VerifyDockerfile, Arc::new(VerifyDockerfileHandler { policy: policy.clone() }))
            .register(
                StepName::BuildImage,
                Arc::new(BuildImageHandler { builder: Arc::new(FakeImageBuilder { should_fail: should_fail_build }) }),
            )
            .register(
                StepName::ScanImage,
                Arc::new(ScanImageHandler { scanner: Arc::new(FakeImageScanner { risk_level: RiskLevel::Low }), policy: policy.clone() }),
            )
            .register(StepName::TagImage, Arc::new(TagImageHandler { registry: Arc::new(FakeImageRegistry::default()) }))
            .register(StepName::PushImage, Arc::new(PushImageHandler { registry: Arc::new(FakeImageRegistry::default()) }))
            .register(StepName::VerifyK8sManifests, Arc::new(VerifyK8sManifestsHandler { policy }))
            .register(StepName::PrepareCluster, Arc::new(PrepareClusterHandler { cluster: Arc::new(FakeClusterAdapter::default()) }))
            .register(StepName::DeployApplication, Arc::new(DeployApplicationHandler { cluster: Arc::new(FakeClusterAdapter::default()) }))
            .register(StepName::VerifyDeployment, Arc::new(VerifyDeploymentHandler { cluster: Arc::new(FakeClusterAdapter::default()) }))
            .build(),
    )
}

fn orchestrator(should_fail_build: bool) -> Orchestrator<FakeClock> {
    let store = SessionStore::temporary().unwrap();
    let manager = Arc::new(SessionManager::new(store, FakeClock::new(), PathBuf::from("/tmp/ctz-test-workspaces")));
    let dispatcher = Arc::new(Dispatcher::new(manager, build_registry(should_fail_build)));
    Orchestrator::new(dispatcher)
}

#[tokio::test]
async fn runs_the_whole_pipeline_and_reports_the_endpoint() {
    let o = orchestrator(false);
    let result = o.run("/repo", &CancellationToken::new()).await.unwrap();
    assert_eq!(result.image_ref.as_deref(), Some("app:latest:latest"));
    assert_eq!(result.endpoint.as_deref(), Some("https://app.example.internal"));
    assert_eq!(result.namespace.as_deref(), Some("default"));
}

#[tokio::test]
async fn aborts_the_run_after_a_self_redirect_fails_twice() {
    let o = orchestrator(true);
    let failure = o.run("/repo", &CancellationToken::new()).await.unwrap_err();
    assert_eq!(failure.failed_step, StepName::BuildImage);
    assert!(!failure.response.success);
}
