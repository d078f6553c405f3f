// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use tabsage_config::DuplicatePolicy;
use tabsage_model::ToolSchema;

use crate::Tool;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool '{0}' is not registered")]
    Unregistered(String),
    #[error("tool '{0}' is already registered")]
    Duplicate(String),
}

/// Central registry holding all declared tools.
///
/// Registration happens once, before first use; all methods after that take
/// `&self` and the registry is immutable in practice.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    on_duplicate: DuplicatePolicy,
}

impl ToolRegistry {
    pub fn new(on_duplicate: DuplicatePolicy) -> Self {
        Self { tools: HashMap::new(), on_duplicate }
    }

    /// Register a tool.  The duplicate policy decides what happens when the
    /// name is already taken: overwrite silently, overwrite with a warning,
    /// or refuse with [`ToolError::Duplicate`].
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            match self.on_duplicate {
                DuplicatePolicy::Overwrite => {}
                DuplicatePolicy::Warn => {
                    warn!(tool = %name, "re-registering tool, prior descriptor replaced");
                }
                DuplicatePolicy::Reject => return Err(ToolError::Duplicate(name)),
            }
        }
        self.tools.insert(name, Arc::new(tool));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Bind a registered tool for attachment to an agent.
    /// Fails at bind time — never at call time — for unregistered names.
    pub fn bind(&self, name: &str) -> Result<ToolBinding, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::Unregistered(name.to_string()))?;
        let schema = tool.schema();
        Ok(ToolBinding { tool, schema })
    }

    /// Descriptors for all registered tools, name-sorted.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self.tools.values().map(|t| t.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Execute a tool by name.  Unknown names are a typed error.
    pub fn dispatch(&self, name: &str, args: &Value) -> anyhow::Result<Value> {
        match self.tools.get(name) {
            Some(tool) => tool.execute(args),
            None => Err(ToolError::Unregistered(name.to_string()).into()),
        }
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}

/// A registered tool together with the descriptor snapshot taken at bind
/// time.  Immutable after construction.
#[derive(Clone)]
pub struct ToolBinding {
    tool: Arc<dyn Tool>,
    schema: ToolSchema,
}

impl std::fmt::Debug for ToolBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolBinding")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl ToolBinding {
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    pub fn execute(&self, args: &Value) -> anyhow::Result<Value> {
        self.tool.execute(args)
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{ParamSpec, ParamType, SchemaBuilder};

    /// Minimal tool for registry tests.
    struct EchoTool {
        name: &'static str,
    }

    impl Tool for EchoTool {
        fn name(&self) -> &str {
            self.name
        }

        fn schema(&self) -> ToolSchema {
            SchemaBuilder::new(self.name)
                .description("echoes its input")
                .param(ParamSpec::required("text", ParamType::Text))
                .build()
        }

        fn execute(&self, args: &Value) -> anyhow::Result<Value> {
            Ok(json!({ "echo": args["text"] }))
        }
    }

    #[test]
    fn register_and_get() {
        let mut reg = ToolRegistry::default();
        reg.register(EchoTool { name: "echo" }).unwrap();
        assert!(reg.get("echo").is_some());
    }

    #[test]
    fn bind_unregistered_fails() {
        let reg = ToolRegistry::default();
        let err = reg.bind("nope").unwrap_err();
        assert!(matches!(err, ToolError::Unregistered(_)));
    }

    #[test]
    fn bind_registered_exposes_stored_descriptor() {
        let mut reg = ToolRegistry::default();
        reg.register(EchoTool { name: "echo" }).unwrap();
        let binding = reg.bind("echo").unwrap();
        assert_eq!(binding.name(), "echo");
        assert_eq!(binding.schema().description, "echoes its input");
        assert_eq!(
            binding.schema().parameters["required"],
            json!(["text"])
        );
    }

    #[test]
    fn dispatch_known_tool_succeeds() {
        let mut reg = ToolRegistry::default();
        reg.register(EchoTool { name: "echo" }).unwrap();
        let out = reg.dispatch("echo", &json!({ "text": "hi" })).unwrap();
        assert_eq!(out, json!({ "echo": "hi" }));
    }

    #[test]
    fn dispatch_unknown_tool_is_typed_error() {
        let reg = ToolRegistry::default();
        let err = reg.dispatch("missing", &json!({})).unwrap_err();
        assert!(err.to_string().contains("not registered"));
    }

    #[test]
    fn duplicate_policy_warn_overwrites() {
        let mut reg = ToolRegistry::new(DuplicatePolicy::Warn);
        reg.register(EchoTool { name: "t" }).unwrap();
        reg.register(EchoTool { name: "t" }).unwrap();
        assert_eq!(reg.names().len(), 1);
    }

    #[test]
    fn duplicate_policy_overwrite_is_silent() {
        let mut reg = ToolRegistry::new(DuplicatePolicy::Overwrite);
        reg.register(EchoTool { name: "t" }).unwrap();
        reg.register(EchoTool { name: "t" }).unwrap();
        assert_eq!(reg.names().len(), 1);
    }

    #[test]
    fn duplicate_policy_reject_fails() {
        let mut reg = ToolRegistry::new(DuplicatePolicy::Reject);
        reg.register(EchoTool { name: "t" }).unwrap();
        let err = reg.register(EchoTool { name: "t" }).unwrap_err();
        assert!(matches!(err, ToolError::Duplicate(_)));
    }

    #[test]
    fn schemas_are_name_sorted() {
        let mut reg = ToolRegistry::default();
        reg.register(EchoTool { name: "zeta" }).unwrap();
        reg.register(EchoTool { name: "alpha" }).unwrap();
        let schemas = reg.schemas();
        let names: Vec<&str> = schemas.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
