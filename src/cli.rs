// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tabsage",
    about = "LLM-assisted profiling of tabular datasets",
    version,
    long_about = None,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (overrides auto-discovery)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v = debug, -vv = trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Profile a CSV dataset: field summary, dataset description, and
    /// per-column field descriptions.
    Profile {
        /// Path to the CSV file to profile
        file: PathBuf,

        /// Descriptive tags for the dataset, e.g. "healthcare, patient intake"
        #[arg(long, short = 't', required = true)]
        tags: String,

        /// Also investigate the missingness mechanism of this column using
        /// the diagnostic toolset
        #[arg(long, value_name = "COLUMN")]
        classify_missing: Option<String>,

        /// Objective handed to the evaluator when --classify-missing is set
        #[arg(
            long,
            default_value = "profile the dataset and recommend a missing-data handling strategy"
        )]
        objective: String,
    },
    /// Print the effective configuration and exit
    ShowConfig,
    /// List the model stack, and optionally the models the backend reports
    ListModels {
        /// Query the backend for its live model list
        #[arg(long)]
        refresh: bool,
    },
}
