// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Client for the native Ollama HTTP API (`/api/chat`, `/api/show`,
//! `/api/pull`, `/api/tags`).  Local servers are keyless, so no auth header
//! handling exists here.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::{BackendError, ChatBackend, ChatRequest, ChatResponse};

pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Construct a client against `endpoint` (e.g. `http://localhost:11434`).
    ///
    /// Call once at process start; share by `Arc`.
    pub fn new(endpoint: &str) -> Self {
        debug!(endpoint, "connecting chat backend");
        Self {
            base_url: endpoint.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Map a non-success response to a typed error.  404 and "not found"
    /// bodies are the model-missing class.
    async fn error_from(resp: reqwest::Response, model: &str) -> BackendError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        if status == 404 || body.contains("not found") {
            BackendError::ModelMissing { model: model.to_string() }
        } else {
            BackendError::Api { status, body }
        }
    }
}

#[async_trait]
impl ChatBackend for OllamaClient {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, BackendError> {
        let mut body = json!({
            "model": req.model,
            "messages": req.messages,
            "stream": false,
            "options": req.options,
            "keep_alive": req.keep_alive,
        });
        if !req.tools.is_empty() {
            let tools: Vec<Value> = req
                .tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
            body["tools"] = json!(tools);
        }

        debug!(
            model = %req.model,
            message_count = req.messages.len(),
            tool_count = req.tools.len(),
            "sending chat request"
        );

        let resp = self.client.post(self.url("/api/chat")).json(&body).send().await?;
        if !resp.status().is_success() {
            return Err(Self::error_from(resp, &req.model).await);
        }
        let parsed: ChatResponse = serde_json::from_value(resp.json::<Value>().await?)?;
        Ok(parsed)
    }

    async fn show_model(&self, model_id: &str) -> Result<(), BackendError> {
        let resp = self
            .client
            .post(self.url("/api/show"))
            .json(&json!({ "model": model_id }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::error_from(resp, model_id).await);
        }
        Ok(())
    }

    async fn pull_model(&self, model_id: &str) -> Result<(), BackendError> {
        debug!(model = model_id, "pulling model");
        let resp = self
            .client
            .post(self.url("/api/pull"))
            .json(&json!({ "model": model_id, "stream": false }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::error_from(resp, model_id).await);
        }
        Ok(())
    }

    async fn list_models(&self) -> Result<Vec<String>, BackendError> {
        let resp = self.client.get(self.url("/api/tags")).send().await?;
        if !resp.status().is_success() {
            return Err(Self::error_from(resp, "").await);
        }
        let body: Value = resp.json().await?;
        let names = body["models"]
            .as_array()
            .map(|models| {
                models
                    .iter()
                    .filter_map(|m| m["name"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        Ok(names)
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
