// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use tabsage_config::{Config, ModelStack};
use tabsage_core::{
    register_diagnostics, DatasetProfiler, DatasetSummarizer, FieldDescriber,
    MissingnessClassifier, MissingnessEvaluator, Table,
};
use tabsage_model::{ChatBackend, OllamaClient};
use tabsage_tools::ToolRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = tabsage_config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::ShowConfig => {
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::ListModels { refresh } => list_models_cmd(&config, refresh).await,
        Commands::Profile { file, tags, classify_missing, objective } => {
            profile_cmd(&config, &file, &tags, classify_missing.as_deref(), &objective).await
        }
    }
}

async fn profile_cmd(
    config: &Config,
    file: &Path,
    tags: &str,
    classify_missing: Option<&str>,
    objective: &str,
) -> anyhow::Result<()> {
    let stack = ModelStack::new(&config.stack_file, config.backend.source);
    let backend: Arc<dyn ChatBackend> =
        Arc::new(OllamaClient::new(config.backend.endpoint()));

    let table = Table::from_csv_path(file)?;
    let mut profiler = DatasetProfiler::new(table, tags)?;

    let summarizer = DatasetSummarizer::new(backend.clone(), &stack, config)?;
    let describer = FieldDescriber::new(backend.clone(), &stack, config)?;
    profiler.enrich(&summarizer, &describer, None).await?;

    println!("{}", profiler.episode_recap());

    if let Some(column) = classify_missing {
        let target = profiler
            .data()
            .column(column)
            .with_context(|| format!("column '{column}' not found in dataset"))?
            .name()
            .to_string();

        let mut registry = ToolRegistry::new(config.tools.on_duplicate);
        register_diagnostics(&mut registry, Arc::new(profiler.data().clone()))?;
        let bindings = registry
            .names()
            .iter()
            .map(|name| registry.bind(name))
            .collect::<Result<Vec<_>, _>>()?;

        let classifier =
            MissingnessClassifier::new(backend.clone(), &stack, config, bindings)?;
        let evaluator = MissingnessEvaluator::new(backend, &stack, config)?;

        let field_summary = profiler.field_summary().to_markdown();
        let verdict = classifier.classify(&field_summary, &target).await?;
        println!("\n--- Missingness Diagnostic ---");
        println!("Tool: {}", verdict.tool_name);
        println!("Result: {}", verdict.tool_result);

        let evaluation = evaluator.evaluate(objective, &verdict, &field_summary).await?;
        println!("\n{evaluation}");
    }

    Ok(())
}

/// Print the model stack, optionally alongside the backend's live list.
async fn list_models_cmd(config: &Config, refresh: bool) -> anyhow::Result<()> {
    let stack = ModelStack::new(&config.stack_file, config.backend.source);
    let entries = stack.entries()?;

    if entries.is_empty() {
        println!("No models listed in {}.", config.stack_file);
    } else {
        let name_w = entries.iter().map(|e| e.name.len()).max().unwrap_or(8).max(8);
        println!("{:<name_w$}  {:<24}  {:<24}", "NAME", "DEV", "PROD");
        println!("{}", "-".repeat(name_w + 52));
        for e in &entries {
            println!(
                "{:<name_w$}  {:<24}  {:<24}",
                e.name,
                e.dev.as_deref().unwrap_or("-"),
                e.prod.as_deref().unwrap_or("-"),
            );
        }
        println!("\nTotal: {} model(s), resolving source: {:?}", entries.len(), stack.source());
    }

    if refresh {
        let backend = OllamaClient::new(config.backend.endpoint());
        let live = backend.list_models().await?;
        println!("\nBackend at {} reports:", config.backend.endpoint());
        for model in &live {
            println!("  {model}");
        }
    }
    Ok(())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
