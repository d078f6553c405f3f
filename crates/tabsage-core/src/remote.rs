// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Seams for remote schema-inference services and result upload sinks.
//!
//! The profiler talks to these traits only; a deployment wires in real
//! clients, and tests wire in scripted stand-ins.

use async_trait::async_trait;
use thiserror::Error;

use crate::table::Table;

/// Failure classes for remote schema inference.  Fatal classes abort the
/// run; the rest degrade to the local description path.
#[derive(Debug, Error)]
pub enum RemoteInferenceError {
    #[error("remote inference misconfigured: {0}")]
    Configuration(String),
    #[error("remote inference authentication failed: {0}")]
    Auth(String),
    #[error("remote inference transient failure: {0}")]
    Transient(String),
    #[error("remote inference backend error: {0}")]
    Backend(String),
}

impl RemoteInferenceError {
    /// Configuration and auth failures will not heal on retry or fallback
    /// with a different dataset, so they propagate instead of degrading.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Auth(_))
    }
}

/// A remote service that can describe fields and detect numeric columns
/// for a previously uploaded dataset summary.
#[async_trait]
pub trait SchemaInference: Send + Sync {
    async fn describe_fields(&self, summary_id: &str) -> Result<Table, RemoteInferenceError>;
    async fn detect_numeric_fields(&self, summary_id: &str)
        -> Result<Table, RemoteInferenceError>;
}

/// A destination that accepts tables keyed by destination name.
#[async_trait]
pub trait UploadSink: Send + Sync {
    async fn upload(&self, table: &Table, destination: &str) -> anyhow::Result<()>;
}
