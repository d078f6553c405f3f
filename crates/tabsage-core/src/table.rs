// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! A small rectangular table over named, typed columns.
//!
//! Consumers only need column iteration, per-column distinct/missing
//! counts, head-N sampling, and markdown rendering — so this stays a plain
//! vector-of-columns structure over the `csv` reader rather than pulling in
//! a full dataframe dependency.

use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};

/// One cell.  `Null` is a missing value (an empty CSV field).
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

/// Storage type of a column, named the way the summary tables report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Int64,
    Float64,
    Bool,
    Utf8,
}

impl DType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int64 => "int64",
            Self::Float64 => "float64",
            Self::Bool => "bool",
            Self::Utf8 => "str",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }
}

#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    dtype: DType,
    cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, dtype: DType, cells: Vec<Cell>) -> Self {
        Self { name: name.into(), dtype, cells }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_null()).count()
    }

    /// Number of distinct non-null values.  Distinctness is judged on the
    /// rendered form, which is exact for every type this table stores.
    pub fn distinct_count(&self) -> usize {
        let mut seen = HashSet::new();
        for cell in &self.cells {
            if !cell.is_null() {
                seen.insert(cell.to_string());
            }
        }
        seen.len()
    }

    /// Up to `n` distinct non-null values in first-encountered order,
    /// rendered as strings.  An all-missing column yields an empty vec.
    pub fn distinct_samples(&self, n: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for cell in &self.cells {
            if cell.is_null() {
                continue;
            }
            let rendered = cell.to_string();
            if seen.insert(rendered.clone()) {
                out.push(rendered);
                if out.len() == n {
                    break;
                }
            }
        }
        out
    }

    pub fn is_numeric(&self) -> bool {
        self.dtype.is_numeric()
    }

    fn head(&self, n: usize) -> Column {
        Column {
            name: self.name.clone(),
            dtype: self.dtype,
            cells: self.cells.iter().take(n).cloned().collect(),
        }
    }
}

/// A rectangular table with named columns in source order.
#[derive(Debug, Clone)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Build from columns.  Fails if column lengths disagree.
    pub fn new(columns: Vec<Column>) -> anyhow::Result<Self> {
        if let Some(first) = columns.first() {
            let len = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != len) {
                bail!(
                    "column '{}' has {} rows, expected {}",
                    bad.name(),
                    bad.len(),
                    len
                );
            }
        }
        Ok(Self { columns })
    }

    pub fn from_csv_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        Self::from_csv_reader(file)
            .with_context(|| format!("parsing {}", path.display()))
    }

    /// Read a headered CSV, inferring each column's storage type from its
    /// non-empty cells: all-int → int64, all-float → float64, all-bool →
    /// bool, anything else → str.  Empty fields become nulls.
    pub fn from_csv_reader<R: Read>(reader: R) -> anyhow::Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers: Vec<String> = rdr
            .headers()
            .context("reading CSV header")?
            .iter()
            .map(str::to_string)
            .collect();

        let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in rdr.records() {
            let record = record.context("reading CSV record")?;
            for (i, field) in record.iter().enumerate() {
                if i < raw.len() {
                    raw[i].push(field.to_string());
                }
            }
        }

        let columns = headers
            .into_iter()
            .zip(raw)
            .map(|(name, cells)| infer_column(name, &cells))
            .collect();
        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// The first `n` rows as a new table.
    pub fn head(&self, n: usize) -> Table {
        Table { columns: self.columns.iter().map(|c| c.head(n)).collect() }
    }

    /// Render as a markdown table.  Nulls render as empty cells.
    pub fn to_markdown(&self) -> String {
        if self.columns.is_empty() {
            return String::new();
        }
        let mut out = String::new();
        let header: Vec<&str> = self.columns.iter().map(Column::name).collect();
        out.push_str(&format!("| {} |\n", header.join(" | ")));
        out.push_str(&format!("| {} |\n", vec!["---"; self.columns.len()].join(" | ")));
        for row in 0..self.n_rows() {
            let cells: Vec<String> =
                self.columns.iter().map(|c| c.cells()[row].to_string()).collect();
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        out
    }
}

fn infer_column(name: String, cells: &[String]) -> Column {
    let non_empty: Vec<&str> = cells.iter().map(String::as_str).filter(|s| !s.is_empty()).collect();

    let dtype = if non_empty.is_empty() {
        DType::Utf8
    } else if non_empty.iter().all(|s| s.parse::<i64>().is_ok()) {
        DType::Int64
    } else if non_empty.iter().all(|s| s.parse::<f64>().is_ok()) {
        DType::Float64
    } else if non_empty.iter().all(|s| s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false")) {
        DType::Bool
    } else {
        DType::Utf8
    };

    let parsed = cells
        .iter()
        .map(|s| {
            if s.is_empty() {
                return Cell::Null;
            }
            match dtype {
                DType::Int64 => Cell::Int(s.parse().unwrap_or_default()),
                DType::Float64 => Cell::Float(s.parse().unwrap_or_default()),
                DType::Bool => Cell::Bool(s.eq_ignore_ascii_case("true")),
                DType::Utf8 => Cell::Text(s.clone()),
            }
        })
        .collect();

    Column::new(name, dtype, parsed)
}

// ─── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "age,income,name,active\n25,50000.5,alice,true\n30,,bob,false\n25,61000.0,carol,true\n";

    fn table() -> Table {
        Table::from_csv_reader(CSV.as_bytes()).unwrap()
    }

    #[test]
    fn csv_type_inference() {
        let t = table();
        assert_eq!(t.column("age").unwrap().dtype(), DType::Int64);
        assert_eq!(t.column("income").unwrap().dtype(), DType::Float64);
        assert_eq!(t.column("name").unwrap().dtype(), DType::Utf8);
        assert_eq!(t.column("active").unwrap().dtype(), DType::Bool);
    }

    #[test]
    fn column_order_follows_source() {
        let t = table();
        let names: Vec<&str> = t.columns().iter().map(Column::name).collect();
        assert_eq!(names, vec!["age", "income", "name", "active"]);
    }

    #[test]
    fn missing_and_distinct_counts() {
        let t = table();
        let income = t.column("income").unwrap();
        assert_eq!(income.missing_count(), 1);
        assert_eq!(income.distinct_count(), 2);
        let age = t.column("age").unwrap();
        assert_eq!(age.missing_count(), 0);
        assert_eq!(age.distinct_count(), 2);
    }

    #[test]
    fn distinct_samples_first_encountered_order() {
        let col = Column::new(
            "x",
            DType::Int64,
            vec![Cell::Int(25), Cell::Null, Cell::Int(30), Cell::Int(25), Cell::Int(40), Cell::Int(7)],
        );
        assert_eq!(col.distinct_samples(3), vec!["25", "30", "40"]);
    }

    #[test]
    fn distinct_samples_all_missing_is_empty() {
        let col = Column::new("x", DType::Float64, vec![Cell::Null, Cell::Null]);
        assert!(col.distinct_samples(3).is_empty());
    }

    #[test]
    fn head_limits_rows() {
        let t = table().head(2);
        assert_eq!(t.n_rows(), 2);
        assert_eq!(t.n_cols(), 4);
    }

    #[test]
    fn ragged_columns_rejected() {
        let cols = vec![
            Column::new("a", DType::Int64, vec![Cell::Int(1)]),
            Column::new("b", DType::Int64, vec![Cell::Int(1), Cell::Int(2)]),
        ];
        assert!(Table::new(cols).is_err());
    }

    #[test]
    fn markdown_renders_nulls_as_empty() {
        let md = table().to_markdown();
        assert!(md.starts_with("| age | income | name | active |\n"));
        assert!(md.contains("| 30 |  | bob | false |"));
    }
}
