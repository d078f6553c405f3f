// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use async_trait::async_trait;
use tracing::warn;

use crate::{BackendError, ChatRequest, ChatResponse};

/// Trait over the LLM backend.  One implementation talks to a live Ollama
/// server; the mocks in [`crate::mock`] implement it for tests.
///
/// Exactly one backend object is constructed per process and shared by
/// `Arc` across every agent.  Calls are sequential at the call sites; the
/// trait makes no thread-safety promise beyond `Send + Sync`.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// One chat completion round-trip.
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, BackendError>;

    /// Check that `model_id` exists on the backend.
    /// Absence is `Err(BackendError::ModelMissing)`.
    async fn show_model(&self, model_id: &str) -> Result<(), BackendError>;

    /// Fetch `model_id` onto the backend.  Blocks until the pull completes.
    async fn pull_model(&self, model_id: &str) -> Result<(), BackendError>;

    /// Names of all models currently available on the backend.
    async fn list_models(&self) -> Result<Vec<String>, BackendError>;
}

/// Make sure `model_id` is present on the backend before a chat call.
///
/// On a missing model this pulls **once** and re-checks once.  If the model
/// is still missing after the pull, the typed `ModelMissing` error is
/// returned — there is no retry loop.  Any other backend error propagates
/// unchanged.
pub async fn ensure_model_available(
    backend: &dyn ChatBackend,
    model_id: &str,
) -> Result<(), BackendError> {
    match backend.show_model(model_id).await {
        Ok(()) => Ok(()),
        Err(BackendError::ModelMissing { .. }) => {
            warn!(model = model_id, "model missing on backend, pulling once");
            backend.pull_model(model_id).await?;
            backend.show_model(model_id).await
        }
        Err(e) => Err(e),
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScriptedBackend;

    #[tokio::test]
    async fn available_model_needs_no_pull() {
        let backend = ScriptedBackend::always("ok");
        ensure_model_available(&backend, "llama3.2:3b").await.unwrap();
        assert!(backend.pulled().is_empty());
    }

    #[tokio::test]
    async fn missing_model_is_pulled_once_then_available() {
        let backend = ScriptedBackend::always("ok").with_missing_model("phi4:14b", true);
        ensure_model_available(&backend, "phi4:14b").await.unwrap();
        assert_eq!(backend.pulled(), vec!["phi4:14b"]);
    }

    #[tokio::test]
    async fn stubborn_missing_model_fails_after_exactly_one_pull() {
        let backend = ScriptedBackend::always("ok").with_missing_model("ghost:1b", false);
        let err = ensure_model_available(&backend, "ghost:1b").await.unwrap_err();
        assert!(err.is_model_missing());
        assert_eq!(backend.pulled(), vec!["ghost:1b"], "must pull exactly once");
    }
}
