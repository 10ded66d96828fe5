use super::*;

#[test]
fn catalog_has_all_pipeline_step_tools() {
    let names: Vec<&str> = TOOL_CATALOG.iter().map(|t| t.name).collect();
    for expected in [
        "analyze_repository",
        "resolve_base_images",
        "verify_dockerfile",
        "build_image",
        "scan_image",
        "tag_image",
        "push_image",
        "verify_k8s_manifests",
        "prepare_cluster",
        "deploy_application",
        "verify_deployment",
        "start_workflow",
    ] {
        assert!(names.contains(&expected), "missing tool: {expected}");
    }
}

#[test]
fn catalog_names_are_unique() {
    let mut names: Vec<&str> = TOOL_CATALOG.iter().map(|t| t.name).collect();
    let original_len = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), original_len);
}

#[test]
fn input_schema_is_an_object_with_properties() {
    let descriptor = TOOL_CATALOG.iter().find(|t| t.name == "verify_dockerfile").unwrap();
    let schema = descriptor.input_schema();
    assert!(schema.get("properties").is_some());
    let properties = schema["properties"].as_object().unwrap();
    assert!(properties.contains_key("dockerfile_content"));
    assert!(properties.contains_key("session_id"));
}

#[test]
fn all_tool_names_includes_utilities_and_workflow_status() {
    let names = all_tool_names();
    assert!(names.contains(&"list_tools"));
    assert!(names.contains(&"ping"));
    assert!(names.contains(&"server_status"));
    assert!(names.contains(&"workflow_status"));
    assert!(names.contains(&"start_workflow"));
}

#[test]
fn workflow_status_descriptor_has_session_id_field() {
    let descriptor = workflow_status_descriptor();
    let schema = descriptor.input_schema();
    let properties = schema["properties"].as_object().unwrap();
    assert!(properties.contains_key("session_id"));
}
