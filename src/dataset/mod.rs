//! Row-oriented tabular dataset with classified columns.
//!
//! A [`Dataset`] is an ordered list of [`Row`]s that all share the same
//! header list. Every column is classified exactly once as either
//! [`ColumnKind::Numeric`] or [`ColumnKind::Categorical`], so the two header
//! lists returned by [`Dataset::numeric_headers`] and
//! [`Dataset::categorical_headers`] always partition [`Dataset::headers`].
//!
//! Datasets are normally produced by [`parse_dataset`] or a configured
//! [`DatasetParser`], but can also be assembled from in-memory cells with
//! [`Dataset::from_rows`].
//!
//! ## Quick Start
//!
//! ```rust
//! use oneway::dataset::{parse_dataset, Cell, ColumnKind};
//!
//! let data = parse_dataset("region,sales\nnorth,12.5\nsouth,9\n").unwrap();
//!
//! assert_eq!(data.headers(), vec!["region", "sales"]);
//! assert_eq!(data.numeric_headers(), vec!["sales"]);
//! assert_eq!(data.column_kind("region"), Some(ColumnKind::Categorical));
//! assert_eq!(data.cell(1, "sales"), Some(&Cell::Number(9.0)));
//! ```

mod infer;
mod parser;

use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};

pub use infer::{parse_number, TypeInference, DEFAULT_NULL_MARKERS, NUMERIC_THRESHOLD};
pub use parser::{parse_dataset, DatasetParser, Delimiter, RaggedRows};

/// A single cell value.
///
/// After ingestion, numeric columns hold [`Cell::Number`] for every value
/// that parsed, categorical columns hold [`Cell::Text`], and missing values
/// are [`Cell::Null`] in both.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum Cell {
    /// A finite number.
    Number(f64),
    /// A non-empty, trimmed string.
    Text(String),
    /// A missing value.
    Null,
}

impl Cell {
    /// Returns `true` for [`Cell::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The value as a finite number, if it is one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }

    /// The value as text, if it is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The value rendered as a group label.
    ///
    /// Text is trimmed and numbers use their shortest display form. Empty
    /// text, non-finite numbers and nulls have no label.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        match self {
            Self::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Self::Number(v) if v.is_finite() => Some(v.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Null => Ok(()),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Classification of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnKind {
    /// Enough non-null values parse as finite numbers.
    Numeric,
    /// Everything else.
    Categorical,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => f.write_str("numeric"),
            Self::Categorical => f.write_str("categorical"),
        }
    }
}

/// A named, classified column.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Column {
    /// Unique, non-empty header name.
    pub name: String,
    /// Column classification.
    pub kind: ColumnKind,
}

/// One record; cells are positional and aligned with the dataset headers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    /// All cells in header order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The cell at a column position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }
}

/// An ordered sequence of rows sharing one classified header list.
///
/// With the `serde` feature, deserialization checks row widths and brings
/// header names and cells into canonical form, as [`Dataset::from_rows`] does.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawDataset")
)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset from in-memory cells using the default [`TypeInference`].
    ///
    /// Header names go through the same normalization as parsed headers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowWidth`] if any row's length differs from the
    /// number of headers.
    ///
    /// # Example
    ///
    /// ```rust
    /// use oneway::dataset::{Cell, Dataset};
    ///
    /// let data = Dataset::from_rows(
    ///     vec!["group".into(), "score".into()],
    ///     vec![
    ///         vec![Cell::from("a"), Cell::from(1.5)],
    ///         vec![Cell::from("b"), Cell::from("2.5")],
    ///     ],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(data.numeric_headers(), vec!["score"]);
    /// assert_eq!(data.cell(1, "score"), Some(&Cell::Number(2.5)));
    /// ```
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        Self::from_rows_with(headers, rows, &TypeInference::default())
    }

    /// Build a dataset from in-memory cells with explicit inference settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowWidth`] if any row's length differs from the
    /// number of headers.
    pub fn from_rows_with(
        headers: Vec<String>,
        rows: Vec<Vec<Cell>>,
        inference: &TypeInference,
    ) -> Result<Self> {
        check_width(headers.len(), &rows)?;
        Ok(Self::build(normalize_headers(headers), rows, inference))
    }

    /// Classify columns and normalize cells. Rows must already match the header width.
    pub(crate) fn build(headers: Vec<String>, rows: Vec<Vec<Cell>>, inference: &TypeInference) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == headers.len()));

        let kinds = classify_columns(&rows, headers.len(), inference);
        let rows = rows
            .into_iter()
            .map(|cells| Row {
                cells: cells
                    .into_iter()
                    .zip(&kinds)
                    .map(|(cell, &kind)| inference.normalize(cell, kind))
                    .collect(),
            })
            .collect();
        let columns = headers
            .into_iter()
            .zip(kinds)
            .map(|(name, kind)| Column { name, kind })
            .collect();

        Self { columns, rows }
    }

    /// Column descriptors in declared order.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Header names in declared order.
    #[must_use]
    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Headers of numeric columns, in declared order.
    #[must_use]
    pub fn numeric_headers(&self) -> Vec<&str> {
        self.headers_of(ColumnKind::Numeric)
    }

    /// Headers of categorical columns, in declared order.
    #[must_use]
    pub fn categorical_headers(&self) -> Vec<&str> {
        self.headers_of(ColumnKind::Categorical)
    }

    fn headers_of(&self, kind: ColumnKind) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// All rows in input order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of data rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Position of a column by name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Column descriptor by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Classification of a column by name.
    #[must_use]
    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        self.column(name).map(|c| c.kind)
    }

    /// The cells of one column, top to bottom.
    pub fn column_cells(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().filter_map(move |row| row.cells.get(index)))
    }

    /// The cell at a row index and column name.
    #[must_use]
    pub fn cell(&self, row: usize, name: &str) -> Option<&Cell> {
        let index = self.column_index(name)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }

    /// Serialize the header and rows back to delimited text.
    ///
    /// Numbers use their shortest round-trip form and nulls become empty
    /// fields. Fields containing the delimiter, quotes or newlines are quoted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Export`] if the writer fails.
    pub fn to_delimited(&self, delimiter: u8) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        let write_err = |e: csv::Error| Error::export(e.to_string());
        writer
            .write_record(self.columns.iter().map(|c| c.name.as_str()))
            .map_err(write_err)?;
        for row in &self.rows {
            writer
                .write_record(row.cells.iter().map(ToString::to_string))
                .map_err(write_err)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| Error::export(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| Error::export(e.to_string()))
    }
}

/// Wire form of a [`Dataset`] before validation.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawDataset {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawDataset> for Dataset {
    type Error = Error;

    /// Keep the declared column kinds, but check widths and normalize names and cells.
    fn try_from(raw: RawDataset) -> Result<Self> {
        let rows: Vec<Vec<Cell>> = raw.rows.into_iter().map(|r| r.cells).collect();
        check_width(raw.columns.len(), &rows)?;

        let (names, kinds): (Vec<String>, Vec<ColumnKind>) =
            raw.columns.into_iter().map(|c| (c.name, c.kind)).unzip();
        let inference = TypeInference::default();
        let rows = rows
            .into_iter()
            .map(|cells| Row {
                cells: cells
                    .into_iter()
                    .zip(&kinds)
                    .map(|(cell, &kind)| inference.normalize(cell, kind))
                    .collect(),
            })
            .collect();
        let columns = normalize_headers(names)
            .into_iter()
            .zip(kinds)
            .map(|(name, kind)| Column { name, kind })
            .collect();

        Ok(Self { columns, rows })
    }
}

/// Every row must have exactly `expected` cells.
fn check_width(expected: usize, rows: &[Vec<Cell>]) -> Result<()> {
    match rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
        Some((row, cells)) => Err(Error::RowWidth {
            row,
            expected,
            actual: cells.len(),
        }),
        None => Ok(()),
    }
}

fn classify_columns(rows: &[Vec<Cell>], width: usize, inference: &TypeInference) -> Vec<ColumnKind> {
    #[cfg(feature = "parallel")]
    {
        crate::parallel::par_classify_columns(rows, width, inference)
    }
    #[cfg(not(feature = "parallel"))]
    {
        infer::classify_columns_sequential(rows, width, inference)
    }
}

/// Trim header names, default empty ones and make duplicates unique.
///
/// An empty name at 1-based position N becomes `column_N`. A repeated name
/// gets the smallest suffix `_2`, `_3`, ... that is not already taken.
pub(crate) fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(raw.len());
    let mut headers = Vec::with_capacity(raw.len());

    for (position, name) in raw.into_iter().enumerate() {
        let trimmed = name.trim();
        let base = if trimmed.is_empty() {
            format!("column_{}", position + 1)
        } else {
            trimmed.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 2;
        while seen.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        headers.push(candidate);
    }

    headers
}
