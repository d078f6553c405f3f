// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde_json::Value;

use tabsage_model::ToolSchema;

/// Trait every callable tool implements.
///
/// Tools here are local statistical routines, so `execute` is synchronous;
/// the name returned by `name()` must match `schema().name`, since dispatch
/// is by name.
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// Descriptor sent to the model.  Built once per registration via
    /// [`crate::SchemaBuilder`].
    fn schema(&self) -> ToolSchema;

    /// Execute with parsed JSON arguments.  Argument validation errors are
    /// ordinary `Err` results, surfaced at call time by the dispatcher.
    fn execute(&self, args: &Value) -> anyhow::Result<Value>;
}
