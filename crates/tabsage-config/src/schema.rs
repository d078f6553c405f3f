// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde::{Deserialize, Serialize};

/// Serde default helper — returns `true`.
///
/// `#[serde(default)]` on a `bool` always falls back to `bool::default()`
/// (i.e. `false`), so fields that should be on unless explicitly disabled
/// need a named function.
fn default_true() -> bool {
    true
}

fn default_local_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_keep_alive() -> String {
    "15m".to_string()
}

fn default_stack_file() -> String {
    "models.toml".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub chat: ChatOptions,
    #[serde(default)]
    pub tools: ToolsConfig,
    /// Path to the model stack document (a TOML file with `[[models]]`
    /// entries).  Relative paths resolve against the working directory.
    #[serde(default = "default_stack_file")]
    pub stack_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            chat: ChatOptions::default(),
            tools: ToolsConfig::default(),
            stack_file: default_stack_file(),
        }
    }
}

/// Connection settings for the chat backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Preferred endpoint (e.g. a GPU box on the LAN).  Used whenever it is
    /// set and non-empty; otherwise `local_url` is used.
    #[serde(default)]
    pub remote_url: Option<String>,
    /// Fallback endpoint, normally the local Ollama server.
    #[serde(default = "default_local_url")]
    pub local_url: String,
    /// Which model-stack id column to resolve: `dev` or `prod`.
    #[serde(default)]
    pub source: ModelSource,
    /// How long the backend keeps the model loaded between calls.
    /// Forwarded verbatim as the `keep_alive` request field.
    #[serde(default = "default_keep_alive")]
    pub keep_alive: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            local_url: default_local_url(),
            source: ModelSource::default(),
            keep_alive: default_keep_alive(),
        }
    }
}

impl BackendConfig {
    /// The endpoint agents actually connect to: the remote URL when set and
    /// non-empty, else the local one.
    pub fn endpoint(&self) -> &str {
        match self.remote_url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => &self.local_url,
        }
    }
}

/// Which id column of a model-stack entry to resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSource {
    #[default]
    Dev,
    Prod,
}

/// Sampling and runtime options forwarded to the backend unmodified.
///
/// These mirror Ollama's `options` object.  tabsage treats them as an opaque
/// bag: nothing here is interpreted locally, the whole struct is serialized
/// into each chat request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatOptions {
    /// Context window size in tokens.  Small by default — profiling prompts
    /// are short and a smaller window loads faster.
    #[serde(default = "ChatOptions::default_num_ctx")]
    pub num_ctx: u32,
    #[serde(default = "ChatOptions::default_temperature")]
    pub temperature: f32,
    #[serde(default = "ChatOptions::default_top_p")]
    pub top_p: f32,
    #[serde(default = "ChatOptions::default_top_k")]
    pub top_k: u32,
    #[serde(default = "ChatOptions::default_repeat_penalty")]
    pub repeat_penalty: f32,
    /// Cap on generated tokens per call.
    #[serde(default = "ChatOptions::default_num_predict")]
    pub num_predict: u32,
    #[serde(default = "ChatOptions::default_num_thread")]
    pub num_thread: u32,
    #[serde(default = "ChatOptions::default_num_gpu")]
    pub num_gpu: u32,
    #[serde(default = "default_true")]
    pub low_vram: bool,
    #[serde(default = "default_true")]
    pub f16_kv: bool,
    #[serde(default = "default_true")]
    pub use_mmap: bool,
    #[serde(default)]
    pub use_mlock: bool,
    /// Fixed sampling seed.  `None` leaves the backend nondeterministic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl ChatOptions {
    fn default_num_ctx() -> u32 {
        1024
    }
    fn default_temperature() -> f32 {
        0.3
    }
    fn default_top_p() -> f32 {
        0.9
    }
    fn default_top_k() -> u32 {
        40
    }
    fn default_repeat_penalty() -> f32 {
        1.05
    }
    fn default_num_predict() -> u32 {
        128
    }
    fn default_num_thread() -> u32 {
        2
    }
    fn default_num_gpu() -> u32 {
        1
    }
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            num_ctx: Self::default_num_ctx(),
            temperature: Self::default_temperature(),
            top_p: Self::default_top_p(),
            top_k: Self::default_top_k(),
            repeat_penalty: Self::default_repeat_penalty(),
            num_predict: Self::default_num_predict(),
            num_thread: Self::default_num_thread(),
            num_gpu: Self::default_num_gpu(),
            low_vram: true,
            f16_kv: true,
            use_mmap: true,
            use_mlock: false,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// What to do when a tool is registered under an already-taken name.
    #[serde(default)]
    pub on_duplicate: DuplicatePolicy,
}

/// Behavior of the tool registry when a name is registered twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Replace the prior descriptor silently.
    Overwrite,
    /// Replace the prior descriptor but log a warning.
    #[default]
    Warn,
    /// Refuse the registration with an error.
    Reject,
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
