// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage-crate error type, mapped onto `ctz_core::CoreError` at the
//! dispatcher boundary.

use ctz_core::{CoreError, SessionId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session already exists: {0}")]
    AlreadyExists(SessionId),
    #[error("session not found: {0}")]
    NotFound(SessionId),
    #[error("storage engine error: {0}")]
    Engine(#[from] sled::Error),
    #[error("failed to (de)serialize session record: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid workspace path: {0}")]
    InvalidPath(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists(id) => CoreError::already_exists(format!("session already exists: {id}")),
            StoreError::NotFound(id) => CoreError::not_found(format!("session not found: {id}")),
            StoreError::Engine(e) => CoreError::fatal(format!("storage engine error: {e}")),
            StoreError::Serde(e) => CoreError::fatal(format!("session record corrupt: {e}")),
            StoreError::InvalidPath(msg) => CoreError::validation(msg),
        }
    }
}
