// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `resolve_base_images`: rank candidate base images for the language
//! the previous step detected. Samples the configured AI client for a
//! reasoned ranking when one is wired in, otherwise falls back to the
//! static catalogue.

use crate::ai::AiClient;
use crate::support::base_image_candidates;
use async_trait::async_trait;
use ctz_core::{BaseImagesArtifact, CoreError, SamplingRequest};
use ctz_workflow::{StepHandler, StepParams, StepResult, WorkflowState};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const SCHEMA: &str = r#"{
    "type": "object",
    "properties": {
        "selected": { "type": "string" },
        "rationale": { "type": "string" }
    },
    "required": ["selected", "rationale"]
}"#;

pub struct ResolveBaseImagesHandler {
    pub ai: Option<Arc<AiClient>>,
}

#[async_trait]
impl StepHandler for ResolveBaseImagesHandler {
    async fn execute(
        &self,
        state: &WorkflowState,
        _params: &StepParams,
        cancel: &CancellationToken,
    ) -> Result<StepResult, CoreError> {
        let analyze = state
            .artifacts
            .analyze
            .as_ref()
            .ok_or_else(|| CoreError::validation("analyze_repository has not completed for this session"))?;

        let candidates = base_image_candidates(&analyze.language);
        let artifact = match &self.ai {
            Some(ai) => self.sample_selection(ai, analyze, &candidates, cancel).await?,
            None => BaseImagesArtifact {
                selected: candidates.first().cloned().unwrap_or_default(),
                candidates,
                rationale: "no AI client configured, chose the most-preferred static candidate".to_string(),
            },
        };

        let data = serde_json::to_value(&artifact)
            .map_err(|e| CoreError::fatal(format!("failed to serialize base images artifact: {e}")))?;
        Ok(StepResult::ok(data))
    }
}

impl ResolveBaseImagesHandler {
    async fn sample_selection(
        &self,
        ai: &AiClient,
        analyze: &ctz_core::AnalyzeArtifact,
        candidates: &[String],
        cancel: &CancellationToken,
    ) -> Result<BaseImagesArtifact, CoreError> {
        #[allow(clippy::expect_used)]
        let schema: serde_json::Value = serde_json::from_str(SCHEMA)
            .expect("SCHEMA is a fixed, valid JSON Schema literal");
        let prompt = SamplingRequest::builder(format!(
            "Language: {}\nFramework: {:?}\nCandidate base images: {}\n\nChoose the best base image for a \
             production container and explain why in one sentence.",
            analyze.language,
            analyze.framework,
            candidates.join(", ")
        ))
        .system_prompt(
            "You are selecting a container base image. Prefer the smallest image that \
             satisfies the runtime's needs. Respond with ONLY a JSON object.",
        )
        .temperature(0.0)
        .build();

        let value = ai
            .sample_json_with_schema(&prompt, Some(&schema), cancel)
            .await
            .map_err(|e| CoreError::transient(format!("base image sampling failed: {e}")))?;

        let selected = value
            .get("selected")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_else(|| candidates.first().map(String::as_str).unwrap_or(""))
            .to_string();
        let rationale = value
            .get("rationale")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("no rationale returned")
            .to_string();

        Ok(BaseImagesArtifact { candidates: candidates.to_vec(), selected, rationale })
    }
}

#[cfg(test)]
#[path = "resolve_base_images_tests.rs"]
mod tests;
