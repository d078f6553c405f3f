// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod schema;
mod tool;
mod registry;

pub use schema::{ParamSpec, ParamType, SchemaBuilder};
pub use tool::Tool;
pub use registry::{ToolBinding, ToolError, ToolRegistry};
