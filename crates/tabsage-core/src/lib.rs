// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Profiling pipeline: tables, prompt-bound agents, missingness
//! diagnostics, and the dataset profiler that ties them together.

pub mod agent;
pub mod agents;
pub mod diagnostics;
pub mod error;
pub mod profiler;
pub mod prompt;
pub mod remote;
pub mod table;

pub use agent::{Agent, AgentSpec};
pub use agents::{
    ColumnDescription, DatasetSummarizer, FieldDescriber, MissingnessClassifier,
    MissingnessEvaluator, ToolVerdict,
};
pub use diagnostics::register_diagnostics;
pub use error::ProfileError;
pub use profiler::{DatasetProfiler, EntryReport, EpisodeIds};
pub use prompt::{PromptError, PromptSpec};
pub use remote::{RemoteInferenceError, SchemaInference, UploadSink};
pub use table::{Cell, Column, DType, Table};
