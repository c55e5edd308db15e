//! Error types for the oneway library.
//!
//! Every failure is a typed value carrying enough context (line, column,
//! group, condition) to be shown to an end user as-is. Variants are grouped
//! into the coarse categories of [`ErrorKind`] so callers can branch on the
//! class of failure without matching every variant.

use std::fmt;

use thiserror::Error;

/// Which side of an ANOVA a column was selected for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColumnRole {
    /// The categorical column whose labels define the groups.
    Group,
    /// The numeric column whose values are compared across groups.
    Value,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group => f.write_str("group"),
            Self::Value => f.write_str("value"),
        }
    }
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed, empty or undecodable input text.
    Parse,
    /// A column selection that does not fit the dataset.
    Validation,
    /// Too few groups or observations survive filtering.
    InsufficientData,
    /// Zero within-group variance.
    DegenerateVariance,
    /// Sums of squares or the F statistic left the finite `f64` range.
    Overflow,
    /// Serializing a dataset back to delimited text failed.
    Export,
}

/// The main error type for the oneway library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ============ Ingestion Errors ============
    /// The input could not be turned into a dataset.
    #[error("parse error{}: {message}", at_line(.line))]
    Parse {
        /// 1-based source line, when the failure is tied to one.
        line: Option<usize>,
        /// Description of what is wrong with the input.
        message: String,
    },

    /// A programmatically supplied row does not match the header width.
    #[error("row {row} has {actual} cells, expected {expected}")]
    RowWidth {
        /// 0-based index of the offending row.
        row: usize,
        /// Number of headers.
        expected: usize,
        /// Number of cells in the row.
        actual: usize,
    },

    // ============ Validation Errors ============
    /// A selected column is not among the dataset's headers.
    #[error("{role} column '{column}' not found")]
    ColumnNotFound {
        /// Which selection referred to the column.
        role: ColumnRole,
        /// The requested column name.
        column: String,
    },

    /// A selected column exists but has the wrong classification.
    #[error("{role} column '{column}' must be {expected}")]
    WrongColumnKind {
        /// Which selection referred to the column.
        role: ColumnRole,
        /// The requested column name.
        column: String,
        /// The classification the role requires.
        expected: crate::dataset::ColumnKind,
    },

    // ============ Insufficient Data Errors ============
    /// Fewer than two groups remain after filtering.
    #[error("need at least 2 groups with usable values, found {found}")]
    TooFewGroups {
        /// Number of distinct usable group labels.
        found: usize,
    },

    /// A group has fewer than two usable observations.
    #[error("group '{group}' has {count} usable observation(s), need at least 2")]
    GroupTooSmall {
        /// The group label.
        group: String,
        /// Number of usable observations in it.
        count: usize,
    },

    // ============ Numerical Errors ============
    /// Every group is constant, so the within-group mean square is zero.
    #[error("within-group variance is zero (between-group sum of squares {ss_between}); F is undefined")]
    DegenerateVariance {
        /// The between-group sum of squares at the time of failure.
        ss_between: f64,
    },

    /// Values are so large that a sum of squares or F is not finite.
    #[error("value column '{column}' overflows: sums of squares are not finite")]
    NumericOverflow {
        /// The value column being analyzed.
        column: String,
    },

    // ============ Export Errors ============
    /// Writing delimited text failed.
    #[error("export failed: {message}")]
    Export {
        /// Description of the failure.
        message: String,
    },
}

#[allow(clippy::ref_option)]
fn at_line(line: &Option<usize>) -> String {
    line.map(|line| format!(" at line {line}")).unwrap_or_default()
}

/// A specialized `Result` type for oneway operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Create a `Parse` error not tied to a specific line.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            line: None,
            message: message.into(),
        }
    }

    /// Create a `Parse` error at a 1-based source line.
    #[must_use]
    pub fn parse_at(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line: Some(line),
            message: message.into(),
        }
    }

    /// Create an `Export` error.
    #[must_use]
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    /// The category this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } | Self::RowWidth { .. } => ErrorKind::Parse,
            Self::ColumnNotFound { .. } | Self::WrongColumnKind { .. } => ErrorKind::Validation,
            Self::TooFewGroups { .. } | Self::GroupTooSmall { .. } => ErrorKind::InsufficientData,
            Self::DegenerateVariance { .. } => ErrorKind::DegenerateVariance,
            Self::NumericOverflow { .. } => ErrorKind::Overflow,
            Self::Export { .. } => ErrorKind::Export,
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|pos| pos.line() as usize);
        Self::Parse {
            line,
            message: err.to_string(),
        }
    }
}
