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

fn registry(should_fail_build: bool) -> Arc<StepRegistry> {
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

fn dispatcher(should_fail_build: bool) -> Dispatcher<FakeClock> {
    let store = SessionStore::temporary().unwrap();
    let manager = Arc::new(SessionManager::new(store, FakeClock::new(), PathBuf::from("/tmp/ctz-test-workspaces")));
    Dispatcher::new(manager, registry(should_fail_build))
}

fn params(session_id: &str, extra: &[(&str, serde_json::Value)]) -> ctz_workflow::StepParams {
    let mut p = ctz_workflow::StepParams::new();
    p.insert("session_id".to_string(), serde_json::Value::String(session_id.to_string()));
    for (k, v) in extra {
        p.insert(k.to_string(), v.clone());
    }
    p
}

#[tokio::test]
async fn happy_path_runs_every_step_to_completion() {
    let d = dispatcher(false);

    let r = d.dispatch("analyze_repository", params("s1", &[("repo_path".into(), "/repo".into())]), &CancellationToken::new()).await;
    assert!(r.success);

    let r = d.dispatch("resolve_base_images", params("s1", &[]), &CancellationToken::new()).await;
    assert!(r.success);

    let r = d
        .dispatch(
            "verify_dockerfile",
            params("s1", &[("dockerfile_content".into(), "FROM node:20-alpine\nUSER node\n".into())]),
            &CancellationToken::new(),
        )
        .await;
    assert!(r.success);

    let r = d.dispatch("build_image", params("s1", &[]), &CancellationToken::new()).await;
    assert!(r.success);

    let r = d.dispatch("scan_image", params("s1", &[]), &CancellationToken::new()).await;
    assert!(r.success);

    let r = d.dispatch("tag_image", params("s1", &[("tag".into(), "v1".into())]), &CancellationToken::new()).await;
    assert!(r.success);

    let r = d.dispatch("push_image", params("s1", &[("registry".into(), "localhost:5001".into())]), &CancellationToken::new()).await;
    assert!(r.success);

    let manifest = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: app\n";
    let r = d
        .dispatch(
            "verify_k8s_manifests",
            params("s1", &[("manifests".into(), serde_json::json!([manifest]))]),
            &CancellationToken::new(),
        )
        .await;
    assert!(r.success);

    let r = d.dispatch("prepare_cluster", params("s1", &[]), &CancellationToken::new()).await;
    assert!(r.success);

    let r = d.dispatch("deploy_application", params("s1", &[]), &CancellationToken::new()).await;
    assert!(r.success);

    let r = d.dispatch("verify_deployment", params("s1", &[]), &CancellationToken::new()).await;
    assert!(r.success);
}

#[tokio::test]
async fn build_failure_redirects_to_verify_dockerfile() {
    let d = dispatcher(true);

    let r = d.dispatch("analyze_repository", params("s2", &[("repo_path".into(), "/repo".into())]), &CancellationToken::new()).await;
    assert!(r.success);
    let r = d.dispatch("resolve_base_images", params("s2", &[]), &CancellationToken::new()).await;
    assert!(r.success);
    let r = d
        .dispatch(
            "verify_dockerfile",
            params("s2", &[("dockerfile_content".into(), "FROM not:a:real:image\n".into())]),
            &CancellationToken::new(),
        )
        .await;
    assert!(r.success);

    let r = d.dispatch("build_image", params("s2", &[]), &CancellationToken::new()).await;
    assert!(!r.success);
    let redirect = r.redirect.expect("recoverable build failure should carry a redirect");
    assert_eq!(redirect.next_tool, "verify_dockerfile");
    assert!(redirect.prompt.user.contains("FROM not:a:real:image"));
}

#[tokio::test]
async fn policy_violation_redirects_to_self_with_named_rule() {
    let d = dispatcher(false);

    let r = d.dispatch("analyze_repository", params("s3", &[("repo_path".into(), "/repo".into())]), &CancellationToken::new()).await;
    assert!(r.success);
    let r = d.dispatch("resolve_base_images", params("s3", &[]), &CancellationToken::new()).await;
    assert!(r.success);

    let r = d
        .dispatch(
            "verify_dockerfile",
            params("s3", &[("dockerfile_content".into(), "FROM node:20-alpine\nUSER root\n".into())]),
            &CancellationToken::new(),
        )
        .await;
    assert!(!r.success);
    let redirect = r.redirect.expect("a policy block is recoverable and should redirect");
    assert_eq!(redirect.next_tool, "verify_dockerfile");
    assert!(redirect.reason.contains("block-root-user") || r.error.as_ref().unwrap().message.contains("block-root-user"));
}

#[tokio::test]
async fn missing_session_id_is_rejected_without_touching_storage() {
    let d = dispatcher(false);
    let mut p = ctz_workflow::StepParams::new();
    p.insert("repo_path".to_string(), "/repo".into());
    let r = d.dispatch("analyze_repository", p, &CancellationToken::new()).await;
    assert!(!r.success);
    assert_eq!(r.error.unwrap().class(), Some(ctz_core::ErrorClass::Validation));
}
