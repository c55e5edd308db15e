//! Numeric literal parsing and column classification.
//!
//! A column is numeric when the share of its non-null cells that parse as
//! finite numbers reaches the configured threshold. The default threshold
//! is [`NUMERIC_THRESHOLD`] (every non-null cell must parse), so mixed
//! columns are categorical unless a caller opts into partial tolerance.

use super::{Cell, ColumnKind};

/// Default fraction of non-null cells that must parse for a column to be numeric.
pub const NUMERIC_THRESHOLD: f64 = 1.0;

/// Standard null value markers recognized during parsing.
///
/// Matching is exact on the trimmed field and applies to every column, so a
/// categorical level spelled `NA` or `None` is read as missing unless the
/// parser is given a narrower list.
pub const DEFAULT_NULL_MARKERS: &[&str] = &[
    "", "NA", "N/A", "na", "n/a", "null", "NULL", "None", "none", ".", "NaN", "nan", "NAN",
    "#N/A", "#NA",
];

/// Settings that decide how cells are read as numbers and how columns are classified.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeInference {
    /// Fraction of non-null cells that must parse for a numeric column (default: 1.0).
    ///
    /// Values outside (0, 1] are clamped; NaN falls back to [`NUMERIC_THRESHOLD`].
    pub numeric_threshold: f64,
    /// Digit grouping separator accepted inside numbers, e.g. `Some(',')` for
    /// `1,234.5` (default: none). The decimal point is always `.`.
    pub thousands_separator: Option<char>,
}

impl Default for TypeInference {
    fn default() -> Self {
        Self {
            numeric_threshold: NUMERIC_THRESHOLD,
            thousands_separator: None,
        }
    }
}

impl TypeInference {
    /// Parse a cell string with this configuration's separator.
    #[must_use]
    pub fn parse_number(&self, raw: &str) -> Option<f64> {
        parse_number(raw, self.thousands_separator)
    }

    fn threshold(&self) -> f64 {
        if self.numeric_threshold.is_nan() {
            NUMERIC_THRESHOLD
        } else {
            self.numeric_threshold.clamp(f64::EPSILON, 1.0)
        }
    }

    /// Classify a column from its cells.
    ///
    /// A column with no non-null cells is categorical.
    pub fn classify<'a, I>(&self, cells: I) -> ColumnKind
    where
        I: IntoIterator<Item = &'a Cell>,
    {
        let mut present = 0usize;
        let mut numeric = 0usize;

        for cell in cells {
            match cell {
                Cell::Null => {}
                Cell::Number(v) => {
                    if v.is_finite() {
                        present += 1;
                        numeric += 1;
                    }
                }
                Cell::Text(s) => {
                    if s.trim().is_empty() {
                        continue;
                    }
                    present += 1;
                    if self.parse_number(s).is_some() {
                        numeric += 1;
                    }
                }
            }
        }

        if present == 0 {
            return ColumnKind::Categorical;
        }
        if numeric as f64 / present as f64 >= self.threshold() {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }

    /// Bring a cell into the canonical form for its column's classification.
    pub(crate) fn normalize(&self, cell: Cell, kind: ColumnKind) -> Cell {
        match (cell, kind) {
            (Cell::Null, _) => Cell::Null,
            (Cell::Number(v), ColumnKind::Numeric) if v.is_finite() => Cell::Number(v),
            (Cell::Number(v), ColumnKind::Categorical) if v.is_finite() => Cell::Text(v.to_string()),
            (Cell::Number(_), _) => Cell::Null,
            (Cell::Text(s), kind) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Cell::Null;
                }
                if kind == ColumnKind::Numeric {
                    if let Some(v) = self.parse_number(trimmed) {
                        return Cell::Number(v);
                    }
                }
                if trimmed.len() == s.len() {
                    Cell::Text(s)
                } else {
                    Cell::Text(trimmed.to_string())
                }
            }
        }
    }
}

/// Parse a numeric literal.
///
/// Accepts an optional sign, integer or decimal digits and an optional
/// exponent (`-3`, `.5`, `2.`, `1e-3`). With a separator configured, digit
/// groups in the integer part must be well-formed (`1,234,567.5`). Spellings
/// such as `inf` or `NaN` and values that overflow to infinity are rejected.
///
/// ```rust
/// use oneway::dataset::parse_number;
///
/// assert_eq!(parse_number("-1.5e2", None), Some(-150.0));
/// assert_eq!(parse_number("1,234.5", Some(',')), Some(1234.5));
/// assert_eq!(parse_number("12,34", Some(',')), None);
/// assert_eq!(parse_number("inf", None), None);
/// ```
#[must_use]
pub fn parse_number(raw: &str, thousands_separator: Option<char>) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let allowed = |c: char| {
        c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E') || Some(c) == thousands_separator
    };
    if !s.chars().all(allowed) {
        return None;
    }

    let value = match thousands_separator {
        Some(sep) if s.contains(sep) => strip_grouping(s, sep)?.parse::<f64>().ok()?,
        _ => s.parse::<f64>().ok()?,
    };
    value.is_finite().then_some(value)
}

/// Remove digit-group separators, validating 3-digit grouping.
fn strip_grouping(s: &str, sep: char) -> Option<String> {
    let (sign, rest) = if s.starts_with('+') || s.starts_with('-') {
        s.split_at(1)
    } else {
        ("", s)
    };

    let int_end = rest.find(|c: char| matches!(c, '.' | 'e' | 'E')).unwrap_or(rest.len());
    let (int_part, tail) = rest.split_at(int_end);
    if tail.contains(sep) {
        return None;
    }

    let mut groups = int_part.split(sep);
    let first = groups.next()?;
    if first.is_empty() || first.len() > 3 {
        return None;
    }
    if groups.any(|g| g.len() != 3) {
        return None;
    }

    Some(format!("{sign}{}{tail}", int_part.replace(sep, "")))
}

/// Classify each column of row-major cells in turn.
#[cfg_attr(feature = "parallel", allow(dead_code))]
pub(crate) fn classify_columns_sequential(
    rows: &[Vec<Cell>],
    width: usize,
    inference: &TypeInference,
) -> Vec<ColumnKind> {
    (0..width)
        .map(|col| inference.classify(rows.iter().filter_map(|row| row.get(col))))
        .collect()
}
