// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named prompt templates: load once at startup, render against a data
//! mapping, and hand back a ready-to-send [`SamplingRequest`] carrying
//! the template's declared defaults.

use ctz_core::SamplingRequest;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

fn variable_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::expect_used)]
    PATTERN.get_or_init(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("valid regex"))
}

/// A named template as loaded from disk or registered in code.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub name: String,
    pub system_prompt: Option<String>,
    pub user_template: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PromptError {
    #[error("unknown prompt template: {0}")]
    UnknownTemplate(String),
    #[error("template {template} is missing variable: {variable}")]
    MissingVariable { template: String, variable: String },
}

/// An immutable set of templates, resolved by name.
#[derive(Debug, Clone, Default)]
pub struct PromptManager {
    templates: HashMap<String, PromptTemplate>,
}

impl PromptManager {
    pub fn new() -> Self {
        Self { templates: HashMap::new() }
    }

    pub fn register(mut self, template: PromptTemplate) -> Self {
        self.templates.insert(template.name.clone(), template);
        self
    }

    /// Render `name` against `vars`, returning a request carrying the
    /// template's declared sampling defaults. Unknown template names
    /// and missing variables both fail rather than degrading silently.
    pub fn render(
        &self,
        name: &str,
        vars: &HashMap<String, String>,
    ) -> Result<SamplingRequest, PromptError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| PromptError::UnknownTemplate(name.to_string()))?;

        let rendered = substitute(&template.user_template, vars)
            .map_err(|variable| PromptError::MissingVariable { template: name.to_string(), variable })?;

        let mut builder = SamplingRequest::builder(rendered)
            .temperature(template.temperature)
            .max_tokens(template.max_tokens);
        if let Some(system) = &template.system_prompt {
            builder = builder.system_prompt(system.clone());
        }
        Ok(builder.build())
    }
}

/// Replace every `{{var}}` in `text` with `vars[var]`; returns the
/// first missing variable name as `Err` rather than leaving it blank.
fn substitute(text: &str, vars: &HashMap<String, String>) -> Result<String, String> {
    let mut missing = None;
    let rendered = variable_pattern().replace_all(text, |caps: &regex::Captures| {
        let key = &caps[1];
        match vars.get(key) {
            Some(value) => value.clone(),
            None => {
                if missing.is_none() {
                    missing = Some(key.to_string());
                }
                String::new()
            }
        }
    });
    match missing {
        Some(variable) => Err(variable),
        None => Ok(rendered.into_owned()),
    }
}

#[cfg(test)]
#[path = "prompt_tests.rs"]
mod tests;
