// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! The dataset profiling pipeline.
//!
//! [`DatasetProfiler`] validates its inputs and computes the field summary
//! eagerly at construction, then enriches the profile with model-generated
//! descriptions.  Remote schema inference is preferred when wired in;
//! transient remote failures degrade to the local description loop, while
//! configuration and auth failures abort the run.

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::agents::{ColumnDescription, DatasetSummarizer, FieldDescriber};
use crate::error::ProfileError;
use crate::remote::{RemoteInferenceError, SchemaInference, UploadSink};
use crate::table::{Cell, Column, DType, Table};

/// Distinct-value count above which a numeric column is reported as
/// continuous rather than by its exact cardinality.
const CONTINUOUS_THRESHOLD: usize = 20;

/// How many rows of the dataset the summarizer's preview shows.
const PREVIEW_ROWS: usize = 3;

/// How many rows of the dataset the local description loop sees.
const DESCRIBE_HEAD_ROWS: usize = 10;

/// Stable identifiers for one profiling run.
#[derive(Debug, Clone)]
pub struct EpisodeIds {
    pub episode_id: String,
    pub timestamp: String,
    pub observations_id: String,
    pub cognitive_id: String,
}

impl EpisodeIds {
    pub fn generate() -> Self {
        let episode_id = Uuid::new_v4().simple().to_string();
        Self {
            timestamp: Utc::now().to_rfc3339(),
            observations_id: format!("{episode_id}_observations"),
            cognitive_id: format!("{episode_id}_cognitive"),
            episode_id,
        }
    }
}

/// The assembled profile, ready for rendering or upload.
#[derive(Debug, Clone)]
pub struct EntryReport {
    pub description: Option<String>,
    pub field_summary: Table,
    pub field_description: Option<Table>,
    pub numeric_table: Option<Table>,
}

pub struct DatasetProfiler {
    data: Table,
    tags: String,
    ids: EpisodeIds,
    field_summary: Table,
    description: Option<String>,
    field_description: Option<Table>,
    numeric_table: Option<Table>,
}

impl DatasetProfiler {
    /// Validate the dataset and tags and compute the field summary.
    /// A rowless dataset and blank tags are both rejected up front.
    pub fn new(data: Table, tags: impl Into<String>) -> Result<Self, ProfileError> {
        let tags = tags.into();
        if data.n_rows() == 0 {
            return Err(ProfileError::EmptyDataset);
        }
        if tags.trim().is_empty() {
            return Err(ProfileError::MissingTags);
        }
        let field_summary = field_summary(&data);
        Ok(Self {
            data,
            tags,
            ids: EpisodeIds::generate(),
            field_summary,
            description: None,
            field_description: None,
            numeric_table: None,
        })
    }

    pub fn ids(&self) -> &EpisodeIds {
        &self.ids
    }

    pub fn tags(&self) -> &str {
        &self.tags
    }

    pub fn data(&self) -> &Table {
        &self.data
    }

    pub fn field_summary(&self) -> &Table {
        &self.field_summary
    }

    /// Push the raw dataset and its field summary to the sink under this
    /// episode's destination names.
    pub async fn upload_summary(&self, sink: &dyn UploadSink) -> Result<(), ProfileError> {
        sink.upload(&self.data, &self.ids.cognitive_id).await?;
        sink.upload(&self.field_summary, &self.ids.observations_id).await?;
        info!(episode = %self.ids.episode_id, "uploaded dataset and field summary");
        Ok(())
    }

    /// Generate the dataset description, then the per-field descriptions.
    ///
    /// When a remote inference service is wired in, field descriptions and
    /// the numeric-column table come from it, and both are assigned only
    /// after both remote calls succeed.  Fatal remote errors propagate;
    /// transient ones fall back to describing the head of the dataset
    /// locally, with no numeric table.
    pub async fn enrich(
        &mut self,
        summarizer: &DatasetSummarizer,
        describer: &FieldDescriber,
        remote: Option<&dyn SchemaInference>,
    ) -> Result<(), ProfileError> {
        let preview = self.data.head(PREVIEW_ROWS).to_markdown();
        let description = summarizer.summarize(&self.tags, &preview).await?;
        self.description = Some(description.clone());

        if let Some(remote) = remote {
            match self.enrich_remote(remote).await {
                Ok(()) => return Ok(()),
                Err(err) if err.is_fatal() => return Err(err.into()),
                Err(err) => {
                    warn!(error = %err, "remote schema inference failed, describing locally");
                }
            }
        }

        let head = self.data.head(DESCRIBE_HEAD_ROWS);
        let described = describer.describe_columns(&head, &description).await?;
        self.field_description = Some(description_table(&described));
        self.numeric_table = None;
        Ok(())
    }

    async fn enrich_remote(
        &mut self,
        remote: &dyn SchemaInference,
    ) -> Result<(), RemoteInferenceError> {
        let fields = remote.describe_fields(&self.ids.observations_id).await?;
        let numeric = remote.detect_numeric_fields(&self.ids.observations_id).await?;
        self.field_description = Some(fields);
        self.numeric_table = Some(numeric);
        Ok(())
    }

    pub fn report(&self) -> EntryReport {
        EntryReport {
            description: self.description.clone(),
            field_summary: self.field_summary.clone(),
            field_description: self.field_description.clone(),
            numeric_table: self.numeric_table.clone(),
        }
    }

    /// Human-readable recap of everything gathered so far, in a fixed
    /// section order.
    pub fn episode_recap(&self) -> String {
        let mut out = String::from("--- Data Summary ---\n");
        match &self.description {
            Some(d) => out.push_str(&format!("Dataset Description: {d}\n")),
            None => out.push_str("No dataset description available.\n"),
        }
        out.push_str(&format!("Data Field Summary:\n{}", self.field_summary.to_markdown()));
        if let Some(fields) = &self.field_description {
            out.push_str(&format!("Data Field Description:\n{}", fields.to_markdown()));
        }
        out
    }
}

/// One row per column: name, missing count, total count, storage type, and
/// cardinality.  A numeric column with more than [`CONTINUOUS_THRESHOLD`]
/// distinct values reports the literal `continuous`.
fn field_summary(data: &Table) -> Table {
    let mut names = Vec::new();
    let mut missing = Vec::new();
    let mut totals = Vec::new();
    let mut dtypes = Vec::new();
    let mut uniques = Vec::new();

    for column in data.columns() {
        names.push(Cell::Text(column.name().to_string()));
        missing.push(Cell::Int(column.missing_count() as i64));
        totals.push(Cell::Int(column.len() as i64));
        dtypes.push(Cell::Text(column.dtype().name().to_string()));
        let distinct = column.distinct_count();
        let rendered = if column.is_numeric() && distinct > CONTINUOUS_THRESHOLD {
            "continuous".to_string()
        } else {
            distinct.to_string()
        };
        uniques.push(Cell::Text(rendered));
    }

    // Columns are equal length by construction.
    Table::new(vec![
        Column::new("data_field_name", DType::Utf8, names),
        Column::new("missing_count", DType::Int64, missing),
        Column::new("total_count", DType::Int64, totals),
        Column::new("data_type", DType::Utf8, dtypes),
        Column::new("unique_values", DType::Utf8, uniques),
    ])
    .expect("summary columns are equal length")
}

fn description_table(described: &[ColumnDescription]) -> Table {
    let names = described.iter().map(|d| Cell::Text(d.column_name.clone())).collect();
    let dtypes = described.iter().map(|d| Cell::Text(d.data_type.clone())).collect();
    let texts = described.iter().map(|d| Cell::Text(d.description.clone())).collect();
    Table::new(vec![
        Column::new("data_field_name", DType::Utf8, names),
        Column::new("data_type", DType::Utf8, dtypes),
        Column::new("description", DType::Utf8, texts),
    ])
    .expect("description columns are equal length")
}

// ─── Unit tests ──────────────────────────────────────────────────────────────
