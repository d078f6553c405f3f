// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod schema;
mod loader;
mod stack;

pub use schema::*;
pub use loader::load;
pub use stack::{ModelEntry, ModelStack};
