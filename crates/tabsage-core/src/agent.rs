// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! A single prompt-bound agent over a shared chat backend.
//!
//! An [`Agent`] pairs a [`PromptSpec`] with a named model from the model
//! stack and an optional set of tool bindings.  Model names resolve to
//! concrete model ids eagerly at construction, so a broken stack entry
//! fails before any request is made.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tabsage_config::{Config, ModelStack};
use tabsage_model::{ensure_model_available, ChatBackend, ChatMessage, ChatRequest};
use tabsage_tools::ToolBinding;
use tracing::debug;

use crate::error::ProfileError;
use crate::prompt::PromptSpec;

/// Static description of an agent: its role prompt, the stack-level model
/// name it runs on, and the tools it may be offered.
#[derive(Clone)]
pub struct AgentSpec {
    pub name: &'static str,
    pub prompt: PromptSpec,
    pub model: String,
    pub tools: Vec<ToolBinding>,
}

pub struct Agent {
    backend: Arc<dyn ChatBackend>,
    spec: AgentSpec,
    model_id: String,
    options: Value,
    keep_alive: String,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.spec.name)
            .field("model_id", &self.model_id)
            .field("options", &self.options)
            .field("keep_alive", &self.keep_alive)
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Resolve `spec.model` through the stack and bind the agent to a
    /// backend.  Unknown model names and names with no id for the
    /// configured source fail here.
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        stack: &ModelStack,
        config: &Config,
        spec: AgentSpec,
    ) -> Result<Self, ProfileError> {
        let entry = stack
            .get(&spec.model)?
            .ok_or_else(|| ProfileError::UnknownModel(spec.model.clone()))?;
        let model_id = entry
            .resolved_id(stack.source())
            .ok_or_else(|| ProfileError::UnresolvedModelId { name: spec.model.clone() })?
            .to_string();
        let options = serde_json::to_value(&config.chat)
            .map_err(|e| ProfileError::Other(e.into()))?;
        Ok(Self {
            backend,
            spec,
            model_id,
            options,
            keep_alive: config.backend.keep_alive.clone(),
        })
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    pub fn backend(&self) -> &Arc<dyn ChatBackend> {
        &self.backend
    }

    /// One request/response turn: make sure the model is present, render
    /// the user message from `vars`, and return the trimmed reply.
    pub async fn run(&self, vars: &BTreeMap<String, String>) -> Result<String, ProfileError> {
        ensure_model_available(self.backend.as_ref(), &self.model_id).await?;

        let user = self.spec.prompt.render(vars)?;
        debug!(agent = self.spec.name, model = %self.model_id, "dispatching chat request");

        let mut request = ChatRequest {
            model: self.model_id.clone(),
            messages: vec![
                ChatMessage::system(&self.spec.prompt.system),
                ChatMessage::user(&user),
            ],
            options: self.options.clone(),
            keep_alive: self.keep_alive.clone(),
            ..ChatRequest::default()
        };
        if !self.spec.tools.is_empty() {
            request.tools =
                self.spec.tools.iter().map(|b| b.schema().clone()).collect();
        }

        let response = self.backend.chat(request).await?;
        Ok(response.text().trim().to_string())
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tabsage_model::ScriptedBackend;

    fn stack_with(body: &str) -> (tempfile::NamedTempFile, ModelStack) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        let stack = ModelStack::new(file.path(), tabsage_config::ModelSource::Dev);
        (file, stack)
    }

    fn spec() -> AgentSpec {
        AgentSpec {
            name: "test",
            prompt: PromptSpec::new("be terse", "{q}"),
            model: "base".into(),
            tools: Vec::new(),
        }
    }

    #[tokio::test]
    async fn resolves_model_and_runs() {
        let (_file, stack) =
            stack_with("[[models]]\nname = \"base\"\ndev = \"tinyllama\"\n");
        let backend = Arc::new(ScriptedBackend::always("fine"));
        let agent = Agent::new(backend.clone(), &stack, &Config::default(), spec()).unwrap();
        assert_eq!(agent.model_id(), "tinyllama");

        let mut vars = BTreeMap::new();
        vars.insert("q".to_string(), "status?".to_string());
        assert_eq!(agent.run(&vars).await.unwrap(), "fine");

        let request = backend.last_request().unwrap();
        assert_eq!(request.messages[0].content, "be terse");
        assert_eq!(request.messages[1].content, "status?");
        assert!(request.tools.is_empty());
    }

    #[tokio::test]
    async fn variants_share_one_backend() {
        let (_file, stack) =
            stack_with("[[models]]\nname = \"base\"\ndev = \"tinyllama\"\n");
        let backend: Arc<dyn ChatBackend> = Arc::new(ScriptedBackend::always("ok"));
        let a = Agent::new(backend.clone(), &stack, &Config::default(), spec()).unwrap();
        let b = Agent::new(backend.clone(), &stack, &Config::default(), spec()).unwrap();
        assert!(Arc::ptr_eq(a.backend(), b.backend()));
    }

    #[tokio::test]
    async fn unknown_model_name_fails_at_construction() {
        let (_file, stack) =
            stack_with("[[models]]\nname = \"other\"\ndev = \"x\"\n");
        let backend = Arc::new(ScriptedBackend::always("unused"));
        let err = Agent::new(backend, &stack, &Config::default(), spec()).unwrap_err();
        assert!(matches!(err, ProfileError::UnknownModel(name) if name == "base"));
    }

    #[tokio::test]
    async fn missing_source_id_fails_at_construction() {
        let (_file, stack) =
            stack_with("[[models]]\nname = \"base\"\nprod = \"only-prod\"\n");
        let backend = Arc::new(ScriptedBackend::always("unused"));
        let err = Agent::new(backend, &stack, &Config::default(), spec()).unwrap_err();
        assert!(matches!(err, ProfileError::UnresolvedModelId { name } if name == "base"));
    }
}
