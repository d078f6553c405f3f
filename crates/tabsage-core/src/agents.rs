// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The concrete profiling agents.
//!
//! Each agent wraps an [`Agent`] with a fixed role prompt and typed entry
//! points for the one job it performs.  All of them share the single chat
//! backend they were constructed over.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tabsage_config::{Config, ModelStack};
use tabsage_model::ChatBackend;
use tabsage_tools::ToolBinding;
use tracing::info;

use crate::agent::{Agent, AgentSpec};
use crate::error::ProfileError;
use crate::prompt::{
    PromptSpec, CLASSIFIER_INPUT, CLASSIFIER_SYSTEM_PREAMBLE, DESCRIBER_INPUT, DESCRIBER_SYSTEM,
    EVALUATOR_INPUT, EVALUATOR_SYSTEM, SUMMARIZER_INPUT, SUMMARIZER_SYSTEM,
};
use crate::table::Table;

/// How many distinct sample values the describer is shown per column.
const SAMPLE_VALUES: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescription {
    pub column_name: String,
    pub data_type: String,
    pub description: String,
}

/// Outcome of one classifier turn: the tool it picked and what the tool
/// returned.
#[derive(Debug, Clone)]
pub struct ToolVerdict {
    pub tool_name: String,
    pub tool_result: Value,
}

fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Produces the two-sentence dataset summary from tags and a preview.
pub struct DatasetSummarizer {
    agent: Agent,
}

impl DatasetSummarizer {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        stack: &ModelStack,
        config: &Config,
    ) -> Result<Self, ProfileError> {
        let spec = AgentSpec {
            name: "summarizer",
            prompt: PromptSpec::new(SUMMARIZER_SYSTEM, SUMMARIZER_INPUT),
            model: "base".to_string(),
            tools: Vec::new(),
        };
        Ok(Self { agent: Agent::new(backend, stack, config, spec)? })
    }

    pub async fn summarize(&self, tags: &str, preview: &str) -> Result<String, ProfileError> {
        self.agent
            .run(&vars(&[("dataset_tags", tags), ("dataset_preview", preview)]))
            .await
    }
}

/// Produces a one-sentence meaning for each column of a table, in column
/// order, one model call per column.
pub struct FieldDescriber {
    agent: Agent,
}

impl FieldDescriber {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        stack: &ModelStack,
        config: &Config,
    ) -> Result<Self, ProfileError> {
        let spec = AgentSpec {
            name: "describer",
            prompt: PromptSpec::new(DESCRIBER_SYSTEM, DESCRIBER_INPUT),
            model: "base".to_string(),
            tools: Vec::new(),
        };
        Ok(Self { agent: Agent::new(backend, stack, config, spec)? })
    }

    pub async fn describe_column(
        &self,
        dataset_description: &str,
        column_name: &str,
        sample_values: &str,
    ) -> Result<String, ProfileError> {
        self.agent
            .run(&vars(&[
                ("dataset_description", dataset_description),
                ("column_name", column_name),
                ("sample_values", sample_values),
            ]))
            .await
    }

    /// Describe every column of `table`, strictly in source order.  Each
    /// column's request shows up to three distinct non-missing values; a
    /// fully missing column is shown an empty sample list.
    pub async fn describe_columns(
        &self,
        table: &Table,
        dataset_description: &str,
    ) -> Result<Vec<ColumnDescription>, ProfileError> {
        let mut out = Vec::with_capacity(table.n_cols());
        for column in table.columns() {
            let samples = column.distinct_samples(SAMPLE_VALUES).join(", ");
            info!(column = column.name(), "describing field");
            let description = self
                .describe_column(dataset_description, column.name(), &samples)
                .await?;
            out.push(ColumnDescription {
                column_name: column.name().to_string(),
                data_type: column.dtype().name().to_string(),
                description,
            });
        }
        Ok(out)
    }
}

/// Picks one missingness diagnostic tool for a target column and runs it.
pub struct MissingnessClassifier {
    agent: Agent,
    bindings: Vec<ToolBinding>,
}

impl MissingnessClassifier {
    /// The available tools are baked into the system prompt, so the
    /// classifier sees the same tool list the dispatcher enforces.
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        stack: &ModelStack,
        config: &Config,
        bindings: Vec<ToolBinding>,
    ) -> Result<Self, ProfileError> {
        let mut system = String::from(CLASSIFIER_SYSTEM_PREAMBLE);
        for binding in &bindings {
            system.push_str(&format!(
                "\n- {}: {}",
                binding.name(),
                binding.schema().description
            ));
        }
        let spec = AgentSpec {
            name: "classifier",
            prompt: PromptSpec::new(system, CLASSIFIER_INPUT),
            model: "base".to_string(),
            tools: bindings.clone(),
        };
        Ok(Self { agent: Agent::new(backend, stack, config, spec)?, bindings })
    }

    /// Ask the model to pick a tool for `target_column`, then execute the
    /// pick.  A reply naming no registered tool is an error, not a retry.
    pub async fn classify(
        &self,
        field_summary: &str,
        target_column: &str,
    ) -> Result<ToolVerdict, ProfileError> {
        let reply = self
            .agent
            .run(&vars(&[
                ("field_summary", field_summary),
                ("target_column", target_column),
            ]))
            .await?;
        let tool_name = reply.trim();

        let binding = self
            .bindings
            .iter()
            .find(|b| b.name() == tool_name)
            .ok_or_else(|| ProfileError::UnknownTool(tool_name.to_string()))?;

        info!(tool = tool_name, column = target_column, "running missingness diagnostic");
        let tool_result = binding.execute(&json!({ "target_col": target_column }))?;
        Ok(ToolVerdict { tool_name: tool_name.to_string(), tool_result })
    }
}

/// Interprets a diagnostic tool's result and recommends a handling strategy.
pub struct MissingnessEvaluator {
    agent: Agent,
}

impl MissingnessEvaluator {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        stack: &ModelStack,
        config: &Config,
    ) -> Result<Self, ProfileError> {
        let spec = AgentSpec {
            name: "evaluator",
            prompt: PromptSpec::new(EVALUATOR_SYSTEM, EVALUATOR_INPUT),
            model: "thinking_agent".to_string(),
            tools: Vec::new(),
        };
        Ok(Self { agent: Agent::new(backend, stack, config, spec)? })
    }

    pub async fn evaluate(
        &self,
        task_objective: &str,
        verdict: &ToolVerdict,
        field_summary: &str,
    ) -> Result<String, ProfileError> {
        let result_text = verdict.tool_result.to_string();
        self.agent
            .run(&vars(&[
                ("task_objective", task_objective),
                ("tool_name", &verdict.tool_name),
                ("tool_result", &result_text),
                ("field_summary", field_summary),
            ]))
            .await
    }
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tabsage_config::DuplicatePolicy;
    use tabsage_model::ScriptedBackend;
    use tabsage_tools::{SchemaBuilder, Tool, ToolRegistry};

    const STACK: &str = "[[models]]\nname = \"base\"\ndev = \"tinyllama\"\n\n\
[[models]]\nname = \"thinking_agent\"\ndev = \"qwen\"\n";

    fn stack() -> (tempfile::NamedTempFile, ModelStack) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(STACK.as_bytes()).unwrap();
        let stack = ModelStack::new(file.path(), tabsage_config::ModelSource::Dev);
        (file, stack)
    }

    struct FixedTool;

    impl Tool for FixedTool {
        fn name(&self) -> &str {
            "chi_square_missingness"
        }

        fn schema(&self) -> tabsage_model::ToolSchema {
            SchemaBuilder::new("chi_square_missingness")
                .description("Chi-square test of missingness against a grouping column")
                .build()
        }

        fn execute(&self, args: &Value) -> anyhow::Result<Value> {
            Ok(json!({ "echo": args["target_col"] }))
        }
    }

    fn binding() -> ToolBinding {
        let mut registry = ToolRegistry::new(DuplicatePolicy::Warn);
        registry.register(FixedTool).unwrap();
        registry.bind("chi_square_missingness").unwrap()
    }

    #[tokio::test]
    async fn describer_walks_columns_in_order() {
        let (_f, stack) = stack();
        let backend = Arc::new(ScriptedBackend::new(vec![
            "age in years",
            "annual income",
        ]));
        let describer =
            FieldDescriber::new(backend.clone(), &stack, &Config::default()).unwrap();

        let csv = "age,income\n25,\n30,\n25,\n";
        let table = Table::from_csv_reader(csv.as_bytes()).unwrap();
        let described = describer.describe_columns(&table, "a people dataset").await.unwrap();

        assert_eq!(described.len(), 2);
        assert_eq!(described[0].column_name, "age");
        assert_eq!(described[0].data_type, "int64");
        assert_eq!(described[0].description, "age in years");
        assert_eq!(described[1].column_name, "income");
        assert_eq!(described[1].description, "annual income");

        // The fully missing income column is shown an empty sample list.
        let requests = backend.requests();
        assert!(requests[0].last_user_text().unwrap().contains("Sample values: 25, 30"));
        assert!(requests[1].last_user_text().unwrap().ends_with("Sample values: "));
    }

    #[tokio::test]
    async fn classifier_dispatches_named_tool() {
        let (_f, stack) = stack();
        let backend = Arc::new(ScriptedBackend::always("chi_square_missingness"));
        let classifier = MissingnessClassifier::new(
            backend.clone(),
            &stack,
            &Config::default(),
            vec![binding()],
        )
        .unwrap();

        let verdict = classifier.classify("| col |\n", "income").await.unwrap();
        assert_eq!(verdict.tool_name, "chi_square_missingness");
        assert_eq!(verdict.tool_result, json!({ "echo": "income" }));

        // The tool list is part of the system prompt and the request offers
        // the tool schemas.
        let request = backend.last_request().unwrap();
        assert!(request.messages[0].content.contains("chi_square_missingness"));
        assert_eq!(request.tools.len(), 1);
    }

    #[tokio::test]
    async fn classifier_rejects_unknown_tool_name() {
        let (_f, stack) = stack();
        let backend = Arc::new(ScriptedBackend::always("made_up_tool"));
        let classifier = MissingnessClassifier::new(
            backend,
            &stack,
            &Config::default(),
            vec![binding()],
        )
        .unwrap();

        let err = classifier.classify("summary", "income").await.unwrap_err();
        assert!(matches!(err, ProfileError::UnknownTool(name) if name == "made_up_tool"));
    }

    #[tokio::test]
    async fn evaluator_uses_thinking_model() {
        let (_f, stack) = stack();
        let backend = Arc::new(ScriptedBackend::always("looks MAR, impute by group"));
        let evaluator =
            MissingnessEvaluator::new(backend.clone(), &stack, &Config::default()).unwrap();

        let verdict =
            ToolVerdict { tool_name: "t".into(), tool_result: json!({ "p": 0.01 }) };
        let text = evaluator.evaluate("clean the data", &verdict, "summary").await.unwrap();
        assert_eq!(text, "looks MAR, impute by group");
        assert_eq!(backend.last_request().unwrap().model, "qwen");
    }
}
