// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Missingness diagnostic tools.
//!
//! Each tool closes over a shared [`Table`] and reports a statistic the
//! evaluator can reason about.  They compute locally; no model call and no
//! I/O happens inside `execute`.

use std::sync::Arc;

use anyhow::{bail, Context};
use serde_json::{json, Value};
use tabsage_model::ToolSchema;
use tabsage_tools::{ParamSpec, ParamType, SchemaBuilder, Tool, ToolRegistry};

use crate::table::{Column, Table};

fn target_col(args: &Value) -> anyhow::Result<&str> {
    args.get("target_col")
        .and_then(Value::as_str)
        .context("missing required argument 'target_col'")
}

fn require_column<'a>(table: &'a Table, name: &str) -> anyhow::Result<&'a Column> {
    table
        .column(name)
        .with_context(|| format!("column '{name}' not found in dataset"))
}

fn missingness_indicator(column: &Column) -> Vec<f64> {
    column.cells().iter().map(|c| if c.is_null() { 1.0 } else { 0.0 }).collect()
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        cov += (a - mean_x) * (b - mean_y);
        var_x += (a - mean_x).powi(2);
        var_y += (b - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

/// Correlates the target column's missingness indicator against every other
/// column's.  Strong correlations suggest MAR; near-zero ones are consistent
/// with MCAR.
pub struct MissingIndicatorCorrelation {
    table: Arc<Table>,
}

impl Tool for MissingIndicatorCorrelation {
    fn name(&self) -> &str {
        "missing_indicator_correlation"
    }

    fn schema(&self) -> ToolSchema {
        SchemaBuilder::new("missing_indicator_correlation")
            .description(
                "Pearson correlation between the target column's missingness \
                 indicator and every other column's, to test whether values go \
                 missing together",
            )
            .param(
                ParamSpec::required("target_col", ParamType::Text)
                    .describe("Column whose missingness is under investigation"),
            )
            .build()
    }

    fn execute(&self, args: &Value) -> anyhow::Result<Value> {
        let target = target_col(args)?;
        let column = require_column(&self.table, target)?;
        let indicator = missingness_indicator(column);

        let mut correlations = Vec::new();
        let mut abs_sum = 0.0;
        for other in self.table.columns() {
            if other.name() == target {
                continue;
            }
            let r = pearson(&indicator, &missingness_indicator(other));
            abs_sum += r.abs();
            correlations.push(json!({ "column": other.name(), "r": r }));
        }
        let mean_abs_r = if correlations.is_empty() {
            0.0
        } else {
            abs_sum / correlations.len() as f64
        };
        Ok(json!({
            "target_col": target,
            "correlations": correlations,
            "mean_abs_r": mean_abs_r,
        }))
    }
}

/// Chi-square statistic of the target's missing/present split across the
/// categories of a grouping column.  A large statistic means missingness
/// depends on the group, i.e. not MCAR.
pub struct ChiSquareMissingness {
    table: Arc<Table>,
}

impl Tool for ChiSquareMissingness {
    fn name(&self) -> &str {
        "chi_square_missingness"
    }

    fn schema(&self) -> ToolSchema {
        SchemaBuilder::new("chi_square_missingness")
            .description(
                "Chi-square test of whether the target column's missing rate \
                 differs across the categories of a grouping column",
            )
            .param(
                ParamSpec::required("target_col", ParamType::Text)
                    .describe("Column whose missingness is under investigation"),
            )
            .param(
                ParamSpec::optional("group_col", ParamType::Text)
                    .describe("Categorical column to group by; defaults to the first text column"),
            )
            .build()
    }

    fn execute(&self, args: &Value) -> anyhow::Result<Value> {
        let target = target_col(args)?;
        let column = require_column(&self.table, target)?;

        let group = match args.get("group_col").and_then(Value::as_str) {
            Some(name) => require_column(&self.table, name)?,
            None => self
                .table
                .columns()
                .iter()
                .find(|c| !c.is_numeric() && c.name() != target)
                .context("no categorical column available to group by")?,
        };
        if group.name() == target {
            bail!("group column must differ from the target column");
        }

        // Contingency: per group category, counts of missing and present
        // target cells.
        let mut counts: Vec<(String, usize, usize)> = Vec::new();
        for (g, t) in group.cells().iter().zip(column.cells()) {
            let key = g.to_string();
            let entry = match counts.iter_mut().find(|(k, _, _)| *k == key) {
                Some(e) => e,
                None => {
                    counts.push((key, 0, 0));
                    counts.last_mut().unwrap()
                }
            };
            if t.is_null() {
                entry.1 += 1;
            } else {
                entry.2 += 1;
            }
        }

        let total: usize = counts.iter().map(|(_, m, p)| m + p).sum();
        let total_missing: usize = counts.iter().map(|(_, m, _)| *m).sum();
        if total == 0 {
            bail!("empty contingency table");
        }
        let missing_rate = total_missing as f64 / total as f64;

        let mut chi_square = 0.0;
        for (_, missing, present) in &counts {
            let row = (missing + present) as f64;
            for (observed, rate) in [(*missing as f64, missing_rate), (*present as f64, 1.0 - missing_rate)] {
                let expected = row * rate;
                if expected > 0.0 {
                    chi_square += (observed - expected).powi(2) / expected;
                }
            }
        }
        let dof = counts.len().saturating_sub(1);

        Ok(json!({
            "target_col": target,
            "group_col": group.name(),
            "chi_square": chi_square,
            "dof": dof,
            "groups": counts.len(),
        }))
    }
}

/// Goodness-of-fit of missing counts across all columns against a uniform
/// spread.  Uniform missingness across unrelated columns points at MCAR at
/// the dataset level.
pub struct UniformMissingnessGof {
    table: Arc<Table>,
}

impl Tool for UniformMissingnessGof {
    fn name(&self) -> &str {
        "uniform_missingness_gof"
    }

    fn schema(&self) -> ToolSchema {
        SchemaBuilder::new("uniform_missingness_gof")
            .description(
                "Chi-square goodness-of-fit of per-column missing counts \
                 against a uniform distribution over all columns",
            )
            .param(
                ParamSpec::required("target_col", ParamType::Text)
                    .describe("Column whose missingness is under investigation"),
            )
            .build()
    }

    fn execute(&self, args: &Value) -> anyhow::Result<Value> {
        let target = target_col(args)?;
        require_column(&self.table, target)?;

        let counts: Vec<(String, usize)> = self
            .table
            .columns()
            .iter()
            .map(|c| (c.name().to_string(), c.missing_count()))
            .collect();
        let total: usize = counts.iter().map(|(_, n)| n).sum();
        if total == 0 {
            return Ok(json!({
                "target_col": target,
                "chi_square": 0.0,
                "total_missing": 0,
            }));
        }
        let expected = total as f64 / counts.len() as f64;
        let chi_square: f64 = counts
            .iter()
            .map(|(_, n)| (*n as f64 - expected).powi(2) / expected)
            .sum();

        Ok(json!({
            "target_col": target,
            "chi_square": chi_square,
            "dof": counts.len().saturating_sub(1),
            "total_missing": total,
            "per_column": counts
                .iter()
                .map(|(name, n)| json!({ "column": name, "missing": n }))
                .collect::<Vec<_>>(),
        }))
    }
}

/// Register the builtin diagnostics over a shared table snapshot.
pub fn register_diagnostics(
    registry: &mut ToolRegistry,
    table: Arc<Table>,
) -> Result<(), tabsage_tools::ToolError> {
    registry.register(MissingIndicatorCorrelation { table: table.clone() })?;
    registry.register(ChiSquareMissingness { table: table.clone() })?;
    registry.register(UniformMissingnessGof { table })?;
    Ok(())
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tabsage_config::DuplicatePolicy;

    // income is missing exactly where group == "b".
    const CSV: &str = "group,income,score\na,100,1\nb,,2\na,120,\nb,,4\na,90,5\n";

    fn table() -> Arc<Table> {
        Arc::new(Table::from_csv_reader(CSV.as_bytes()).unwrap())
    }

    fn registry() -> ToolRegistry {
        let mut r = ToolRegistry::new(DuplicatePolicy::Warn);
        register_diagnostics(&mut r, table()).unwrap();
        r
    }

    #[test]
    fn registers_all_three_tools() {
        assert_eq!(
            registry().names(),
            vec![
                "chi_square_missingness",
                "missing_indicator_correlation",
                "uniform_missingness_gof",
            ]
        );
    }

    #[test]
    fn chi_square_detects_group_dependence() {
        let result = registry()
            .dispatch(
                "chi_square_missingness",
                &json!({ "target_col": "income", "group_col": "group" }),
            )
            .unwrap();
        assert_eq!(result["group_col"], "group");
        assert_eq!(result["groups"], 2);
        // Missingness is perfectly separated by group, so the statistic
        // equals n.
        assert!((result["chi_square"].as_f64().unwrap() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn chi_square_defaults_to_first_text_column() {
        let result = registry()
            .dispatch("chi_square_missingness", &json!({ "target_col": "income" }))
            .unwrap();
        assert_eq!(result["group_col"], "group");
    }

    #[test]
    fn correlation_reports_all_other_columns() {
        let result = registry()
            .dispatch("missing_indicator_correlation", &json!({ "target_col": "income" }))
            .unwrap();
        let correlations = result["correlations"].as_array().unwrap();
        assert_eq!(correlations.len(), 2);
        assert!(result["mean_abs_r"].as_f64().unwrap() >= 0.0);
    }

    #[test]
    fn gof_handles_no_missing_values() {
        let mut r = ToolRegistry::new(DuplicatePolicy::Warn);
        let full = Arc::new(
            Table::from_csv_reader("a,b\n1,2\n3,4\n".as_bytes()).unwrap(),
        );
        register_diagnostics(&mut r, full).unwrap();
        let result = r
            .dispatch("uniform_missingness_gof", &json!({ "target_col": "a" }))
            .unwrap();
        assert_eq!(result["total_missing"], 0);
        assert_eq!(result["chi_square"], 0.0);
    }

    #[test]
    fn missing_target_argument_is_an_error() {
        let err = registry()
            .dispatch("missing_indicator_correlation", &json!({}))
            .unwrap_err();
        assert!(err.to_string().contains("target_col"));
    }

    #[test]
    fn unknown_column_is_an_error() {
        let err = registry()
            .dispatch("uniform_missingness_gof", &json!({ "target_col": "nope" }))
            .unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
