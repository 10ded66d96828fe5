use super::*;
use crate::collaborators::fakes::FakeClusterAdapter;
use ctz_core::{K8sArtifact, SessionId};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

fn state_with_k8s() -> WorkflowState {
    let mut s = WorkflowState::new(SessionId::new("sess-1"), PathBuf::from("/repo"));
    s.artifacts.k8s = Some(K8sArtifact {
        manifests: vec![],
        namespace: "app-ns".to_string(),
        endpoint: None,
        metadata: HashMap::new(),
    });
    s
}

#[tokio::test]
async fn prepares_the_recorded_namespace() {
    let handler = PrepareClusterHandler { cluster: Arc::new(FakeClusterAdapter::default()) };
    let result = handler.execute(&state_with_k8s(), &StepParams::new(), &CancellationToken::new()).await.unwrap();
    assert!(result.success);
    assert_eq!(result.data["namespace"], "app-ns");
}

#[tokio::test]
async fn fails_without_a_k8s_artifact() {
    let handler = PrepareClusterHandler { cluster: Arc::new(FakeClusterAdapter::default()) };
    let s = WorkflowState::new(SessionId::new("sess-1"), PathBuf::from("/repo"));
    let error = handler.execute(&s, &StepParams::new(), &CancellationToken::new()).await.unwrap_err();
    assert_eq!(error.class, ctz_core::ErrorClass::Validation);
}
