use super::*;
use tempfile::tempdir;

#[tokio::test]
async fn detects_a_node_express_project() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("package.json"),
        r#"{"dependencies": {"express": "^4.0.0"}, "devDependencies": {"jest": "^29.0.0"}, "scripts": {"build": "tsc", "start": "node dist/index.js"}}"#,
    )
    .unwrap();

    let analyzer = FilesystemRepositoryAnalyzer;
    let artifact = analyzer.analyze(dir.path()).await.unwrap();

    assert_eq!(artifact.language, "node");
    assert_eq!(artifact.framework.as_deref(), Some("express"));
    assert_eq!(artifact.default_port, 3000);
    assert_eq!(artifact.build_command.as_deref(), Some("tsc"));
    assert_eq!(artifact.start_command.as_deref(), Some("node dist/index.js"));
    assert!(artifact.dependencies.contains(&"express".to_string()));
    assert!(artifact.dev_dependencies.contains(&"jest".to_string()));
}

#[tokio::test]
async fn detects_a_rust_axum_project() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("Cargo.toml"),
        "[package]\nname = \"svc\"\n\n[dependencies]\naxum = \"0.7\"\ntokio = { version = \"1\" }\n",
    )
    .unwrap();

    let analyzer = FilesystemRepositoryAnalyzer;
    let artifact = analyzer.analyze(dir.path()).await.unwrap();

    assert_eq!(artifact.language, "rust");
    assert_eq!(artifact.framework.as_deref(), Some("axum"));
    assert_eq!(artifact.default_port, 8080);
    assert!(artifact.dependencies.iter().any(|d| d == "axum"));
}

#[tokio::test]
async fn falls_back_to_unknown_with_no_marker_files() {
    let dir = tempdir().unwrap();
    let analyzer = FilesystemRepositoryAnalyzer;
    let artifact = analyzer.analyze(dir.path()).await.unwrap();

    assert_eq!(artifact.language, "unknown");
    assert!(artifact.framework.is_none());
}
