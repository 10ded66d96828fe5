// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem-backed [`RepositoryAnalyzer`]: looks for the marker file
//! of each supported ecosystem and extracts enough detail for the
//! later Dockerfile-authoring steps to pick a sensible base image and
//! entry point.

use async_trait::async_trait;
use ctz_core::AnalyzeArtifact;
use ctz_engine::{CollaboratorError, RepositoryAnalyzer};
use std::path::Path;

pub struct FilesystemRepositoryAnalyzer;

#[async_trait]
impl RepositoryAnalyzer for FilesystemRepositoryAnalyzer {
    async fn analyze(&self, repo_path: &Path) -> Result<AnalyzeArtifact, CollaboratorError> {
        if let Some(artifact) = detect_node(repo_path) {
            return Ok(artifact);
        }
        if let Some(artifact) = detect_python(repo_path) {
            return Ok(artifact);
        }
        if let Some(artifact) = detect_go(repo_path) {
            return Ok(artifact);
        }
        if let Some(artifact) = detect_rust(repo_path) {
            return Ok(artifact);
        }
        Ok(AnalyzeArtifact {
            language: "unknown".to_string(),
            framework: None,
            default_port: 8080,
            build_command: None,
            start_command: None,
            dependencies: Vec::new(),
            dev_dependencies: Vec::new(),
            repository_path: repo_path.to_path_buf(),
        })
    }
}

fn detect_node(repo_path: &Path) -> Option<AnalyzeArtifact> {
    let content = std::fs::read_to_string(repo_path.join("package.json")).ok()?;
    let manifest: serde_json::Value = serde_json::from_str(&content).ok()?;

    let names = |key: &str| -> Vec<String> {
        manifest
            .get(key)
            .and_then(serde_json::Value::as_object)
            .map(|deps| deps.keys().cloned().collect())
            .unwrap_or_default()
    };
    let dependencies = names("dependencies");
    let dev_dependencies = names("devDependencies");

    let framework = ["next", "express", "nestjs", "react", "vue", "@angular/core"]
        .into_iter()
        .find(|name| dependencies.iter().any(|d| d == name))
        .map(|name| name.trim_start_matches('@').replace("/core", "").to_string());

    let script = |name: &str| -> Option<String> {
        manifest.get("scripts").and_then(|s| s.get(name)).and_then(serde_json::Value::as_str).map(String::from)
    };

    Some(AnalyzeArtifact {
        language: "node".to_string(),
        framework,
        default_port: 3000,
        build_command: script("build"),
        start_command: script("start"),
        dependencies,
        dev_dependencies,
        repository_path: repo_path.to_path_buf(),
    })
}

fn detect_python(repo_path: &Path) -> Option<AnalyzeArtifact> {
    let (content, dependencies) = if let Ok(content) = std::fs::read_to_string(repo_path.join("requirements.txt"))
    {
        let deps = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| line.split(['=', '<', '>', '~', '!']).next().unwrap_or(line).trim().to_string())
            .collect();
        (content, deps)
    } else if let Ok(content) = std::fs::read_to_string(repo_path.join("pyproject.toml")) {
        (content.clone(), Vec::new())
    } else {
        return None;
    };

    let framework = ["django", "flask", "fastapi"].into_iter().find(|name| content.to_lowercase().contains(name));

    Some(AnalyzeArtifact {
        language: "python".to_string(),
        framework: framework.map(String::from),
        default_port: 8000,
        build_command: None,
        start_command: None,
        dependencies,
        dev_dependencies: Vec::new(),
        repository_path: repo_path.to_path_buf(),
    })
}

fn detect_go(repo_path: &Path) -> Option<AnalyzeArtifact> {
    let content = std::fs::read_to_string(repo_path.join("go.mod")).ok()?;
    let framework = ["gin-gonic/gin", "labstack/echo", "gofiber/fiber"]
        .into_iter()
        .find(|name| content.contains(name))
        .map(|name| name.rsplit('/').next().unwrap_or(name).to_string());
    let dependencies = content
        .lines()
        .filter(|line| line.trim_start().starts_with("require") || line.contains('/'))
        .filter_map(|line| line.split_whitespace().next())
        .filter(|token| token.contains('.') && token.contains('/'))
        .map(String::from)
        .collect();

    Some(AnalyzeArtifact {
        language: "go".to_string(),
        framework,
        default_port: 8080,
        build_command: Some("go build -o app .".to_string()),
        start_command: Some("./app".to_string()),
        dependencies,
        dev_dependencies: Vec::new(),
        repository_path: repo_path.to_path_buf(),
    })
}

fn detect_rust(repo_path: &Path) -> Option<AnalyzeArtifact> {
    let content = std::fs::read_to_string(repo_path.join("Cargo.toml")).ok()?;
    let framework = ["actix-web", "axum", "rocket", "warp"].into_iter().find(|name| content.contains(name));
    let dependencies = content
        .lines()
        .skip_while(|line| !line.trim().eq_ignore_ascii_case("[dependencies]"))
        .skip(1)
        .take_while(|line| !line.trim_start().starts_with('['))
        .filter_map(|line| line.split(['=', ' ']).next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect();

    Some(AnalyzeArtifact {
        language: "rust".to_string(),
        framework: framework.map(String::from),
        default_port: 8080,
        build_command: Some("cargo build --release".to_string()),
        start_command: None,
        dependencies,
        dev_dependencies: Vec::new(),
        repository_path: repo_path.to_path_buf(),
    })
}

#[cfg(test)]
#[path = "repository_tests.rs"]
mod tests;
