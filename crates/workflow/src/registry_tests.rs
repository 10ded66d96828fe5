// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::state::WorkflowState;
use ctz_core::SessionId;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

struct EchoHandler;

#[async_trait]
impl StepHandler for EchoHandler {
    fn required_params(&self) -> &'static [&'static str] {
        &["repo_path"]
    }

    async fn execute(
        &self,
        _state: &WorkflowState,
        params: &StepParams,
        _cancel: &CancellationToken,
    ) -> Result<StepResult, CoreError> {
        Ok(StepResult::ok(serde_json::Value::Object(params.clone())))
    }
}

fn state() -> WorkflowState {
    WorkflowState::new(SessionId::from("sess-1"), PathBuf::from("/repo"))
}

#[tokio::test]
async fn registered_handler_is_retrievable_and_invocable() {
    let registry = StepRegistry::builder()
        .register(StepName::AnalyzeRepository, Arc::new(EchoHandler))
        .build();

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.required_params(StepName::AnalyzeRepository), &["repo_path"]);

    let handler = registry.get(StepName::AnalyzeRepository).expect("registered");
    let mut params = StepParams::new();
    params.insert("repo_path".into(), serde_json::json!("/r"));
    let result = handler.execute(&state(), &params, &CancellationToken::new()).await.unwrap();
    assert!(result.success);
}

#[test]
fn unregistered_step_has_no_handler_and_empty_required_params() {
    let registry = StepRegistry::builder().build();
    assert!(registry.get(StepName::BuildImage).is_none());
    assert!(registry.required_params(StepName::BuildImage).is_empty());
    assert!(registry.is_empty());
}

#[test]
fn step_result_builders_set_success_flag() {
    let ok = StepResult::ok(serde_json::json!({})).with_metadata("k", "v");
    assert!(ok.success);
    assert_eq!(ok.metadata.get("k"), Some(&"v".to_string()));

    let failed = StepResult::failure(serde_json::json!({"error": "boom"}));
    assert!(!failed.success);
}
