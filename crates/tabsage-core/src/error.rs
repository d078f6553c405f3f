// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Error type for the profiling pipeline.

use tabsage_model::BackendError;
use thiserror::Error;

use crate::prompt::PromptError;
use crate::remote::RemoteInferenceError;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("dataset has no rows")]
    EmptyDataset,
    #[error("dataset tags must be a non-empty string")]
    MissingTags,
    #[error("model '{0}' is not listed in the model stack")]
    UnknownModel(String),
    #[error("model '{name}' has no id for the configured source")]
    UnresolvedModelId { name: String },
    #[error("unknown tool '{0}' selected by the classifier")]
    UnknownTool(String),
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Remote(#[from] RemoteInferenceError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
