use super::*;

#[test]
fn verify_dockerfile_params_deserializes_with_redirect_fields() {
    let json = serde_json::json!({
        "session_id": "sess-1",
        "dockerfile_content": "FROM node:20-alpine\n",
        "fixing_mode": true,
        "previous_error": "build failed",
        "failed_tool": "build_image"
    });
    let params: VerifyDockerfileParams = serde_json::from_value(json).expect("should deserialize");
    assert_eq!(params.session_id, "sess-1");
    assert!(params.redirect.fixing_mode);
    assert_eq!(params.redirect.previous_error.as_deref(), Some("build failed"));
}

#[test]
fn verify_dockerfile_params_defaults_redirect_fields_when_absent() {
    let json = serde_json::json!({
        "session_id": "sess-1",
        "dockerfile_content": "FROM node:20-alpine\n",
    });
    let params: VerifyDockerfileParams = serde_json::from_value(json).expect("should deserialize");
    assert!(!params.redirect.fixing_mode);
    assert_eq!(params.redirect.previous_error, None);
}

#[test]
fn push_image_params_optional_fields_default_to_none() {
    let json = serde_json::json!({
        "session_id": "sess-1",
        "registry": "localhost:5001",
    });
    let params: PushImageParams = serde_json::from_value(json).expect("should deserialize");
    assert_eq!(params.redirect_attempt, None);
    assert_eq!(params.max_retries, None);
}

#[test]
fn start_workflow_params_round_trip_json() {
    let params = StartWorkflowParams { repo_path: "/repo".to_string() };
    let json = serde_json::to_value(&params).expect("serialize");
    let back: StartWorkflowParams = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back.repo_path, "/repo");
}
