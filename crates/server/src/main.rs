// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! The `ctz-server` binary: wires the session store, policy engine,
//! and collaborator adapters into the dispatcher and orchestrator, then
//! serves the whole thing as an MCP server over stdio.

mod adapters;
mod cleanup;
mod config;
mod handler;
mod subprocess;

use ctz_core::{StepName, SystemClock};
use ctz_engine::handlers::{
    AnalyzeRepositoryHandler, BuildImageHandler, DeployApplicationHandler, PrepareClusterHandler,
    PushImageHandler, ResolveBaseImagesHandler, ScanImageHandler, TagImageHandler,
    VerifyDeploymentHandler, VerifyDockerfileHandler, VerifyK8sManifestsHandler,
};
use ctz_engine::{Dispatcher, Orchestrator};
use ctz_policy::PolicyEngine;
use ctz_storage::{SessionManager, SessionStore};
use ctz_workflow::StepRegistry;
use handler::CtzToolServer;
use rmcp::ServiceExt;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn stdio() -> (tokio::io::Stdin, tokio::io::Stdout) {
    (tokio::io::stdin(), tokio::io::stdout())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_level = config::log_level()?;
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::new(log_level))
        .try_init()
        .ok();

    let workspace_dir = config::workspace_dir();
    std::fs::create_dir_all(&workspace_dir)?;

    let store = SessionStore::open(&config::store_path())?;
    let clock = SystemClock;
    let session_ttl = config::session_ttl()?;
    let sessions = Arc::new(
        SessionManager::new(store, clock.clone(), workspace_dir).with_ttl_ms(session_ttl.as_millis() as u64),
    );

    let policy = Arc::new(match config::policy_path() {
        Some(dir) => PolicyEngine::load(&dir)?,
        None => PolicyEngine::built_in(),
    });

    let registry = Arc::new(build_registry(policy));
    let dispatcher = Arc::new(Dispatcher::new(sessions.clone(), registry));
    let orchestrator = Arc::new(Orchestrator::new(dispatcher.clone()));

    cleanup::spawn(sessions.clone());

    let max_sessions = config::max_sessions()?;
    let server = CtzToolServer::new(dispatcher, orchestrator, clock, max_sessions);

    tracing::info!(
        event = "server.start",
        service = %config::service_name(),
        version = %config::service_version(),
        "starting ctz-server"
    );

    let running = server.serve(stdio()).await?;
    running.waiting().await?;

    tracing::info!(event = "server.stop", "ctz-server shutting down");
    tokio::task::yield_now().await;

    Ok(())
}

fn build_registry(policy: Arc<PolicyEngine>) -> StepRegistry {
    let repository_analyzer = Arc::new(adapters::FilesystemRepositoryAnalyzer);
    let image_builder = Arc::new(adapters::DockerImageBuilder);
    let image_scanner = Arc::new(adapters::TrivyImageScanner);
    let registry_adapter: Arc<dyn ctz_engine::ImageRegistry> = Arc::new(adapters::DockerRegistryAdapter::new(
        config::registry_username(),
        config::registry_password(),
    ));
    let cluster_adapter: Arc<dyn ctz_engine::ClusterAdapter> = Arc::new(adapters::KubectlClusterAdapter);

    StepRegistry::builder()
        .register(StepName::AnalyzeRepository, Arc::new(AnalyzeRepositoryHandler { analyzer: repository_analyzer }))
        .register(StepName::ResolveBaseImages, Arc::new(ResolveBaseImagesHandler { ai: None }))
        .register(StepName::VerifyDockerfile, Arc::new(VerifyDockerfileHandler { policy: policy.clone() }))
        .register(StepName::BuildImage, Arc::new(BuildImageHandler { builder: image_builder }))
        .register(StepName::ScanImage, Arc::new(ScanImageHandler { scanner: image_scanner, policy: policy.clone() }))
        .register(StepName::TagImage, Arc::new(TagImageHandler { registry: registry_adapter.clone() }))
        .register(StepName::PushImage, Arc::new(PushImageHandler { registry: registry_adapter }))
        .register(StepName::VerifyK8sManifests, Arc::new(VerifyK8sManifestsHandler { policy }))
        .register(StepName::PrepareCluster, Arc::new(PrepareClusterHandler { cluster: cluster_adapter.clone() }))
        .register(StepName::DeployApplication, Arc::new(DeployApplicationHandler { cluster: cluster_adapter.clone() }))
        .register(StepName::VerifyDeployment, Arc::new(VerifyDeploymentHandler { cluster: cluster_adapter }))
        .build()
}
