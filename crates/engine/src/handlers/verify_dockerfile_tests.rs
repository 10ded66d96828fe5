use super::*;
use ctz_core::SessionId;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn state() -> WorkflowState {
    WorkflowState::new(SessionId::new("sess-1"), PathBuf::from("/repo"))
}

fn params(dockerfile_content: &str) -> StepParams {
    let mut p = StepParams::new();
    p.insert("dockerfile_content".to_string(), serde_json::Value::String(dockerfile_content.to_string()));
    p
}

#[tokio::test]
async fn passes_a_clean_dockerfile() {
    let handler = VerifyDockerfileHandler { policy: Arc::new(PolicyEngine::built_in()) };
    let result = handler
        .execute(&state(), &params("FROM node:20-alpine\nUSER node\nCMD [\"node\", \"index.js\"]\n"), &CancellationToken::new())
        .await
        .unwrap();
    assert!(result.success);
}

#[tokio::test]
async fn blocks_a_root_user_dockerfile() {
    let handler = VerifyDockerfileHandler { policy: Arc::new(PolicyEngine::built_in()) };
    let result = handler
        .execute(&state(), &params("FROM node:20-alpine\nUSER root\nCMD [\"node\", \"index.js\"]\n"), &CancellationToken::new())
        .await
        .unwrap();
    assert!(!result.success);
    assert!(result.metadata.get("message").is_some());
}
