// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Explicit builder for tool descriptors.
//!
//! A tool declares its parameters with explicit type tags and descriptions;
//! the builder produces the JSON-schema `parameters` object the backend
//! expects: `{type: "object", required: [...], properties: {...}}` with one
//! primitive type per parameter.

use std::fmt;

use serde_json::{json, Map, Value};

use tabsage_model::ToolSchema;

/// JSON-schema primitive type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Integer,
    Number,
    Boolean,
    /// Anything that is not an int/float/bool.
    Text,
}

impl ParamType {
    pub fn json_name(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Text => "string",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_name())
    }
}

/// One declared tool parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    name: String,
    ty: ParamType,
    description: Option<String>,
    required: bool,
}

impl ParamSpec {
    /// A parameter with no default value — listed in `required`.
    pub fn required(name: impl Into<String>, ty: ParamType) -> Self {
        Self { name: name.into(), ty, description: None, required: true }
    }

    /// A parameter with a default value — omitted from `required`.
    pub fn optional(name: impl Into<String>, ty: ParamType) -> Self {
        Self { name: name.into(), ty, description: None, required: false }
    }

    pub fn describe(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }
}

/// Builder producing a [`ToolSchema`].
///
/// Descriptions degrade gracefully rather than fail: a missing tool
/// description becomes the literal `"Unknown"`, a missing parameter
/// description becomes a synthesized placeholder.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    description: Option<String>,
    params: Vec<ParamSpec>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), description: None, params: Vec::new() }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn param(mut self, p: ParamSpec) -> Self {
        self.params.push(p);
        self
    }

    pub fn build(self) -> ToolSchema {
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        let mut properties = Map::new();
        for p in &self.params {
            let desc = p
                .description
                .clone()
                .unwrap_or_else(|| format!("Argument '{}' of type {}", p.name, p.ty));
            properties.insert(
                p.name.clone(),
                json!({ "type": p.ty.json_name(), "description": desc }),
            );
        }

        ToolSchema {
            name: self.name,
            description: self.description.unwrap_or_else(|| "Unknown".to_string()),
            parameters: json!({
                "type": "object",
                "required": required,
                "properties": properties,
            }),
        }
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
