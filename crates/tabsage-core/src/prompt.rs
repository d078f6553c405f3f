// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Prompt templates for the profiling agents.
//!
//! A [`PromptSpec`] pairs a system prompt with an optional user-message
//! template.  Templates use `{name}` placeholders; literal braces are
//! written `{{` and `}}`.  When no template is given, the input variables
//! are rendered as a plain `{key: value, ...}` listing.

use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PromptError {
    #[error("prompt template references unknown placeholder '{0}'")]
    MissingPlaceholder(String),
    #[error("prompt template has an unbalanced brace")]
    UnbalancedBrace,
}

#[derive(Debug, Clone)]
pub struct PromptSpec {
    pub system: String,
    pub input_template: Option<String>,
}

impl PromptSpec {
    pub fn new(system: impl Into<String>, input_template: impl Into<String>) -> Self {
        Self { system: system.into(), input_template: Some(input_template.into()) }
    }

    pub fn system_only(system: impl Into<String>) -> Self {
        Self { system: system.into(), input_template: None }
    }

    /// Produce the user message for one invocation.
    pub fn render(&self, vars: &BTreeMap<String, String>) -> Result<String, PromptError> {
        match &self.input_template {
            Some(template) => fill(template, vars),
            None => {
                let pairs: Vec<String> =
                    vars.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                Ok(format!("{{{}}}", pairs.join(", ")))
            }
        }
    }
}

fn fill(template: &str, vars: &BTreeMap<String, String>) -> Result<String, PromptError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => return Err(PromptError::UnbalancedBrace),
                    }
                }
                match vars.get(&name) {
                    Some(value) => out.push_str(value),
                    None => return Err(PromptError::MissingPlaceholder(name)),
                }
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(PromptError::UnbalancedBrace);
                }
            }
            c => out.push(c),
        }
    }
    Ok(out)
}

/// System prompt for the dataset summarizer.
pub const SUMMARIZER_SYSTEM: &str = "You are a senior data analyst. Given a preview of a tabular \
dataset and a set of descriptive tags, write a concise summary of the dataset in at most two \
sentences. Cover its key characteristics, the likely analysis objectives, and any columns that \
look like unique identifiers. Reply with the summary only.";

pub const SUMMARIZER_INPUT: &str =
    "Dataset tags: {dataset_tags}\n\nDataset preview:\n{dataset_preview}";

/// System prompt for the per-column field describer.
pub const DESCRIBER_SYSTEM: &str = "You are a senior data analyst. Given a description of a \
dataset, the name of one of its columns, and a few sample values, explain in exactly one \
sentence what the field most likely means. Reply with the sentence only.";

pub const DESCRIBER_INPUT: &str = "Dataset description: {dataset_description}\nColumn name: \
{column_name}\nSample values: {sample_values}";

/// System prompt preamble for the missingness classifier.  The list of
/// available diagnostic tools is appended per-toolset at construction time.
pub const CLASSIFIER_SYSTEM_PREAMBLE: &str = "You are a data quality analyst. Missing data \
falls into three mechanisms:\n\
- MCAR (missing completely at random): missingness is unrelated to any observed or \
unobserved value.\n\
- MAR (missing at random): missingness depends on other observed columns.\n\
- MNAR (missing not at random): missingness depends on the missing value itself.\n\n\
Given a field summary of a dataset and a target column, choose the single diagnostic tool \
best suited to investigate the missingness mechanism of the target column. Reply with \
exactly one tool name from the list below and nothing else.\n\nAvailable tools:";

pub const CLASSIFIER_INPUT: &str =
    "Field summary:\n{field_summary}\n\nTarget column: {target_column}";

/// System prompt for the missingness evaluator.
pub const EVALUATOR_SYSTEM: &str = "You are a data quality analyst. A diagnostic tool has been \
run to investigate the missingness mechanism of a column. Interpret its result in the context \
of the field summary and the stated objective, state which missingness mechanism the evidence \
supports, and recommend a handling strategy. Be brief and concrete.";

pub const EVALUATOR_INPUT: &str = "Objective: {task_objective}\nTool: {tool_name}\nTool result: \
{tool_result}\n\nField summary:\n{field_summary}";

// ─── Unit tests ──────────────────────────────────────────────────────────────
