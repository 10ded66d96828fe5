use super::*;
use ctz_core::{AnalyzeArtifact, SessionId};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

fn state_with_language(language: &str) -> WorkflowState {
    let mut s = WorkflowState::new(SessionId::new("sess-1"), PathBuf::from("/repo"));
    s.artifacts.analyze = Some(AnalyzeArtifact {
        language: language.to_string(),
        framework: None,
        default_port: 8080,
        build_command: None,
        start_command: None,
        dependencies: vec![],
        dev_dependencies: vec![],
        repository_path: PathBuf::from("/repo"),
    });
    s
}

#[tokio::test]
async fn falls_back_to_static_catalogue_without_an_ai_client() {
    let handler = ResolveBaseImagesHandler { ai: None };
    let result = handler.execute(&state_with_language("node"), &StepParams::new(), &CancellationToken::new()).await.unwrap();
    assert!(result.success);
    assert_eq!(result.data["selected"], "node:20-alpine");
}

#[tokio::test]
async fn fails_without_an_analyze_artifact() {
    let handler = ResolveBaseImagesHandler { ai: None };
    let s = WorkflowState::new(SessionId::new("sess-1"), PathBuf::from("/repo"));
    let error = handler.execute(&s, &StepParams::new(), &CancellationToken::new()).await.unwrap_err();
    assert_eq!(error.class, ctz_core::ErrorClass::Validation);
}
