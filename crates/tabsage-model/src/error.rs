// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use thiserror::Error;

/// Errors from the chat backend.
///
/// `ModelMissing` is the "not found" class that the bounded remediation in
/// [`crate::ensure_model_available`] keys on; everything else propagates
/// unchanged to the caller.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("model '{model}' is not available on the backend")]
    ModelMissing { model: String },

    #[error("backend returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("backend transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BackendError {
    pub fn is_model_missing(&self) -> bool {
        matches!(self, Self::ModelMissing { .. })
    }
}
