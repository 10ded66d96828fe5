use super::*;
use crate::collaborators::fakes::FakeRepositoryAnalyzer;
use ctz_core::{AnalyzeArtifact, SessionId};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

fn state() -> WorkflowState {
    WorkflowState::new(SessionId::new("sess-1"), PathBuf::from("/repo"))
}

#[tokio::test]
async fn returns_ok_result_with_serialized_artifact() {
    let analyzer = Arc::new(FakeRepositoryAnalyzer {
        result: AnalyzeArtifact {
            language: "node".to_string(),
            framework: Some("express".to_string()),
            default_port: 3000,
            build_command: Some("npm run build".to_string()),
            start_command: Some("npm start".to_string()),
            dependencies: vec!["express".to_string()],
            dev_dependencies: vec![],
            repository_path: PathBuf::from("/repo"),
        },
    });
    let handler = AnalyzeRepositoryHandler { analyzer };
    let result = handler.execute(&state(), &StepParams::new(), &CancellationToken::new()).await.unwrap();
    assert!(result.success);
    assert_eq!(result.data["language"], "node");
}

#[test]
fn requires_repo_path() {
    let analyzer = Arc::new(FakeRepositoryAnalyzer {
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
    });
    let handler = AnalyzeRepositoryHandler { analyzer };
    assert_eq!(handler.required_params(), &["repo_path"]);
}
