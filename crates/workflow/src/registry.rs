// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The step registry: maps a step name to its handler and declared
//! required parameters. Populated once at startup by the binary that
//! wires concrete handlers (the dispatcher only ever reads from it).

use crate::state::WorkflowState;
use async_trait::async_trait;
use ctz_core::{CoreError, StepName};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Arguments supplied to a step handler by the dispatcher, already
/// validated for the handler's declared required parameters.
pub type StepParams = serde_json::Map<String, serde_json::Value>;

/// Outcome of a single step handler invocation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub data: serde_json::Value,
    pub metadata: HashMap<String, String>,
}

impl StepResult {
    pub fn ok(data: serde_json::Value) -> Self {
        Self { success: true, data, metadata: HashMap::new() }
    }

    pub fn failure(data: serde_json::Value) -> Self {
        Self { success: false, data, metadata: HashMap::new() }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A single step's executable behaviour.
///
/// Handlers read their required artifacts from `state`, do their work,
/// and return a [`StepResult`] without mutating `state` themselves —
/// the dispatcher applies the artifact write and bookkeeping update on
/// success so a handler can't leave state partially written.
#[async_trait]
pub trait StepHandler: Send + Sync {
    /// Parameter names this handler requires beyond `session_id`.
    fn required_params(&self) -> &'static [&'static str] {
        &[]
    }

    /// `cancel` is signalled if the caller's context is cancelled while
    /// this step is running; a handler that makes its own cancellable
    /// calls (sampling, subprocesses) should pass it through rather than
    /// fabricating its own token.
    async fn execute(
        &self,
        state: &WorkflowState,
        params: &StepParams,
        cancel: &CancellationToken,
    ) -> Result<StepResult, CoreError>;
}

/// Immutable map from step name to handler, built once at startup.
pub struct StepRegistry {
    handlers: HashMap<StepName, Arc<dyn StepHandler>>,
}

impl StepRegistry {
    pub fn builder() -> StepRegistryBuilder {
        StepRegistryBuilder { handlers: HashMap::new() }
    }

    pub fn get(&self, step: StepName) -> Option<&Arc<dyn StepHandler>> {
        self.handlers.get(&step)
    }

    pub fn required_params(&self, step: StepName) -> &'static [&'static str] {
        self.handlers.get(&step).map(|h| h.required_params()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

pub struct StepRegistryBuilder {
    handlers: HashMap<StepName, Arc<dyn StepHandler>>,
}

impl StepRegistryBuilder {
    pub fn register(mut self, step: StepName, handler: Arc<dyn StepHandler>) -> Self {
        self.handlers.insert(step, handler);
        self
    }

    pub fn build(self) -> StepRegistry {
        StepRegistry { handlers: self.handlers }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
