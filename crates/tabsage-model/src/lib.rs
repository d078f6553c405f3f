// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod types;
mod error;
mod backend;
mod ollama;
mod mock;

pub use types::*;
pub use error::BackendError;
pub use backend::{ensure_model_available, ChatBackend};
pub use ollama::OllamaClient;
pub use mock::{MockBackend, ScriptedBackend};
