// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::{BackendError, ChatBackend, ChatMessage, ChatRequest, ChatResponse};

/// Deterministic mock backend for tests.  Echoes the last user message back
/// as the assistant response.
#[derive(Default)]
pub struct MockBackend;

#[async_trait]
impl ChatBackend for MockBackend {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, BackendError> {
        let reply = req.last_user_text().unwrap_or("[no input]");
        Ok(ChatResponse { message: ChatMessage::assistant(format!("MOCK: {reply}")) })
    }

    async fn show_model(&self, _model_id: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn pull_model(&self, _model_id: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn list_models(&self) -> Result<Vec<String>, BackendError> {
        Ok(vec!["mock-model".into()])
    }
}

/// A pre-scripted mock backend.  Each `chat` call pops the next reply from
/// the front of the queue; every request is recorded so tests can inspect
/// exactly what was sent.  Missing models and pull behavior are simulated
/// so the bounded remediation path can be exercised without a server.
pub struct ScriptedBackend {
    replies: Mutex<Vec<String>>,
    /// All requests seen, in order.
    requests: Mutex<Vec<ChatRequest>>,
    /// Models `show_model` reports as missing.
    missing: Mutex<HashSet<String>>,
    /// Every model id passed to `pull_model`, in order.
    pulled: Mutex<Vec<String>>,
    /// Whether a pull removes the model from the missing set.
    pull_resolves: bool,
}

impl ScriptedBackend {
    /// Build a backend from an ordered list of replies.
    pub fn new(replies: Vec<impl Into<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
            missing: Mutex::new(HashSet::new()),
            pulled: Mutex::new(Vec::new()),
            pull_resolves: true,
        }
    }

    /// Convenience: backend that returns the same reply forever.
    pub fn always(reply: impl Into<String>) -> Self {
        Self::new(vec![reply.into()])
    }

    /// Mark `model` as missing.  `pull_resolves` controls whether pulling it
    /// makes subsequent `show_model` calls succeed.
    pub fn with_missing_model(self, model: impl Into<String>, pull_resolves: bool) -> Self {
        self.missing.lock().unwrap().insert(model.into());
        Self { pull_resolves, ..self }
    }

    /// All requests seen so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Every model id pulled, in order.
    pub fn pulled(&self) -> Vec<String> {
        self.pulled.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, BackendError> {
        self.requests.lock().unwrap().push(req);
        let reply = {
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                replies.remove(0)
            } else {
                // Keep the final reply so `always` repeats forever.
                replies.first().cloned().unwrap_or_else(|| "[no more replies]".into())
            }
        };
        Ok(ChatResponse { message: ChatMessage::assistant(reply) })
    }

    async fn show_model(&self, model_id: &str) -> Result<(), BackendError> {
        if self.missing.lock().unwrap().contains(model_id) {
            return Err(BackendError::ModelMissing { model: model_id.to_string() });
        }
        Ok(())
    }

    async fn pull_model(&self, model_id: &str) -> Result<(), BackendError> {
        self.pulled.lock().unwrap().push(model_id.to_string());
        if self.pull_resolves {
            self.missing.lock().unwrap().remove(model_id);
        }
        Ok(())
    }

    async fn list_models(&self) -> Result<Vec<String>, BackendError> {
        Ok(vec!["scripted-mock".into()])
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn req(text: &str) -> ChatRequest {
        ChatRequest {
            model: "m".into(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user(text)],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn mock_echoes_last_user_message() {
        let b = MockBackend;
        let resp = b.chat(req("hi")).await.unwrap();
        assert_eq!(resp.text(), "MOCK: hi");
    }

    #[tokio::test]
    async fn scripted_pops_replies_in_order() {
        let b = ScriptedBackend::new(vec!["one", "two"]);
        assert_eq!(b.chat(req("a")).await.unwrap().text(), "one");
        assert_eq!(b.chat(req("b")).await.unwrap().text(), "two");
        // Final reply repeats once exhausted.
        assert_eq!(b.chat(req("c")).await.unwrap().text(), "two");
    }

    #[tokio::test]
    async fn scripted_records_requests() {
        let b = ScriptedBackend::always("ok");
        b.chat(req("first")).await.unwrap();
        b.chat(req("second")).await.unwrap();
        let reqs = b.requests();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[1].last_user_text(), Some("second"));
    }

    #[tokio::test]
    async fn missing_model_reported_until_pulled() {
        let b = ScriptedBackend::always("ok").with_missing_model("x", true);
        assert!(b.show_model("x").await.is_err());
        b.pull_model("x").await.unwrap();
        assert!(b.show_model("x").await.is_ok());
    }
}
