// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The model stack: a declarative list of named model entries mapping a
//! role name (e.g. `"base"`, `"thinking_agent"`) to concrete backend model
//! ids for the dev and prod sources.
//!
//! The stack document is re-read on **every** lookup so edits to the file
//! are observed live, at the cost of a full re-read per lookup.  Lookups
//! are cheap relative to a model call, and profiling runs resolve each
//! agent's model exactly once.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ModelSource;

/// One entry of the model stack document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Role name agents resolve by.  Case-sensitive exact match.
    pub name: String,
    /// Backend model id used when the configured source is `dev`.
    #[serde(default)]
    pub dev: Option<String>,
    /// Backend model id used when the configured source is `prod`.
    #[serde(default)]
    pub prod: Option<String>,
    /// Optional per-model endpoint override.
    #[serde(default)]
    pub url: Option<String>,
    /// Alternative model ids a caller may substitute manually.
    #[serde(default)]
    pub alt: Vec<String>,
}

impl ModelEntry {
    /// The concrete backend id for the given source, if declared.
    pub fn resolved_id(&self, source: ModelSource) -> Option<&str> {
        match source {
            ModelSource::Dev => self.dev.as_deref(),
            ModelSource::Prod => self.prod.as_deref(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct StackDoc {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

/// Resolver over the model stack document.
///
/// Holds only the path and the source; no entry is ever cached.
#[derive(Debug, Clone)]
pub struct ModelStack {
    path: PathBuf,
    source: ModelSource,
}

impl ModelStack {
    pub fn new(path: impl Into<PathBuf>, source: ModelSource) -> Self {
        Self { path: path.into(), source }
    }

    pub fn source(&self) -> ModelSource {
        self.source
    }

    /// Look up the first entry whose name equals `name`.
    ///
    /// Absence is `Ok(None)` — callers decide whether that is fatal.  An
    /// unreadable or unparseable stack document is a configuration error.
    pub fn get(&self, name: &str) -> anyhow::Result<Option<ModelEntry>> {
        let doc = self.read()?;
        let entry = doc.models.into_iter().find(|m| m.name == name);
        debug!(model = name, found = entry.is_some(), "model stack lookup");
        Ok(entry)
    }

    /// All entries in declaration order (fresh read).
    pub fn entries(&self) -> anyhow::Result<Vec<ModelEntry>> {
        Ok(self.read()?.models)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> anyhow::Result<StackDoc> {
        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading model stack {}", self.path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("parsing model stack {}", self.path.display()))
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn stack_file(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, "{body}").unwrap();
        f
    }

    const STACK: &str = r#"
[[models]]
name = "base"
dev = "llama3.2:3b"
prod = "llama3.3:70b"

[[models]]
name = "thinking_agent"
dev = "qwen3:8b"
alt = ["deepseek-r1:8b"]
"#;

    #[test]
    fn lookup_returns_first_exact_match() {
        let f = stack_file(STACK);
        let stack = ModelStack::new(f.path(), ModelSource::Dev);
        let entry = stack.get("base").unwrap().unwrap();
        assert_eq!(entry.resolved_id(ModelSource::Dev), Some("llama3.2:3b"));
        assert_eq!(entry.resolved_id(ModelSource::Prod), Some("llama3.3:70b"));
    }

    #[test]
    fn lookup_is_idempotent() {
        let f = stack_file(STACK);
        let stack = ModelStack::new(f.path(), ModelSource::Dev);
        let a = stack.get("thinking_agent").unwrap();
        let b = stack.get("thinking_agent").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_name_is_none_not_error() {
        let f = stack_file(STACK);
        let stack = ModelStack::new(f.path(), ModelSource::Dev);
        assert!(stack.get("nope").unwrap().is_none());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let f = stack_file(STACK);
        let stack = ModelStack::new(f.path(), ModelSource::Dev);
        assert!(stack.get("Base").unwrap().is_none());
    }

    #[test]
    fn edits_to_the_stack_are_observed_live() {
        let mut f = stack_file(STACK);
        let stack = ModelStack::new(f.path(), ModelSource::Dev);
        assert!(stack.get("fresh").unwrap().is_none());

        write!(f, "\n[[models]]\nname = \"fresh\"\ndev = \"phi4:14b\"\n").unwrap();
        f.flush().unwrap();
        let entry = stack.get("fresh").unwrap().unwrap();
        assert_eq!(entry.resolved_id(ModelSource::Dev), Some("phi4:14b"));
    }

    #[test]
    fn missing_source_id_resolves_to_none() {
        let f = stack_file(STACK);
        let stack = ModelStack::new(f.path(), ModelSource::Prod);
        let entry = stack.get("thinking_agent").unwrap().unwrap();
        assert_eq!(entry.resolved_id(ModelSource::Prod), None);
    }

    #[test]
    fn unreadable_stack_is_an_error() {
        let stack = ModelStack::new("/tmp/tabsage_missing_stack_xyz.toml", ModelSource::Dev);
        assert!(stack.get("base").is_err());
    }
}
