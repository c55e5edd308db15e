//! Delimited-text parser producing a classified [`Dataset`].
//!
//! The first non-blank record is the header. Later records become rows;
//! short rows are padded with [`Cell::Null`] and long rows are handled
//! according to [`RaggedRows`]. Quoting follows RFC 4180 (quoted
//! delimiters, doubled quotes, embedded newlines) and every field is
//! trimmed before null-marker matching and type inference.
//!
//! # Example
//!
//! ```rust
//! use oneway::dataset::{DatasetParser, RaggedRows};
//!
//! let text = "city;revenue\nOslo;\"1,250.5\"\nBergen;980\n";
//! let data = DatasetParser::new()
//!     .detect_delimiter()
//!     .thousands_separator(Some(','))
//!     .ragged_rows(RaggedRows::Truncate)
//!     .parse_str(text)
//!     .unwrap();
//!
//! assert_eq!(data.numeric_headers(), vec!["revenue"]);
//! assert_eq!(data.row_count(), 2);
//! ```

use std::borrow::Cow;
use std::str::FromStr;

use csv::{ReaderBuilder, Trim};
use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

use super::infer::{TypeInference, DEFAULT_NULL_MARKERS};
use super::{normalize_headers, Cell, Dataset};
use crate::error::{Error, Result};

/// Candidate delimiters tried by [`Delimiter::Detect`], in tie-break order.
const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// How the field delimiter is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Delimiter {
    /// Always use this byte.
    Byte(u8),
    /// Pick the candidate (`,` `;` TAB `|`) that occurs most often on the
    /// first non-blank line, falling back to comma.
    Detect,
}

impl Default for Delimiter {
    fn default() -> Self {
        Self::Byte(b',')
    }
}

impl FromStr for Delimiter {
    type Err = Error;

    /// `"auto"` selects [`Delimiter::Detect`]; any single ASCII character is
    /// used as-is, and the two-character escape `\t` also means tab.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(Self::Detect),
            "\\t" => Ok(Self::Byte(b'\t')),
            _ => match s.as_bytes() {
                [b] if b.is_ascii() && !matches!(*b, b'"' | b'\n' | b'\r') => Ok(Self::Byte(*b)),
                _ => Err(Error::parse(format!(
                    "delimiter must be a single ASCII character or \"auto\", got {s:?}"
                ))),
            },
        }
    }
}

/// Policy for data rows with more fields than the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RaggedRows {
    /// Fail with a parse error naming the line.
    #[default]
    Reject,
    /// Drop the extra fields.
    Truncate,
}

/// Delimited-text parser configuration and entry point.
///
/// ```rust
/// use oneway::dataset::DatasetParser;
///
/// let data = DatasetParser::new()
///     .delimiter(b'\t')
///     .parse_str("a\tb\n1\tx\n2\ty\n")
///     .unwrap();
/// assert_eq!(data.categorical_headers(), vec!["b"]);
/// ```
#[derive(Debug, Clone)]
pub struct DatasetParser {
    delimiter: Delimiter,
    null_markers: Vec<String>,
    inference: TypeInference,
    ragged_rows: RaggedRows,
}

impl Default for DatasetParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse delimited text with the default [`DatasetParser`] settings.
///
/// The delimiter is a comma and every field equal to one of
/// [`DEFAULT_NULL_MARKERS`] is null, in categorical columns as well. A
/// group literally named `NA` or `None` therefore reads as missing; pass
/// narrower markers to [`DatasetParser::null_markers`] to keep it.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the input has no records, has a header but
/// no data rows, or contains a row longer than the header.
///
/// # Example
///
/// ```rust
/// use oneway::dataset::parse_dataset;
///
/// let data = parse_dataset("g,x\na,1\nb,2\n").unwrap();
/// assert_eq!(data.categorical_headers(), vec!["g"]);
/// assert_eq!(data.numeric_headers(), vec!["x"]);
///
/// assert!(parse_dataset("").is_err());
/// assert!(parse_dataset("g,x\n").is_err());
/// ```
pub fn parse_dataset(raw_text: &str) -> Result<Dataset> {
    DatasetParser::new().parse_str(raw_text)
}

impl DatasetParser {
    /// Create a parser with default settings (comma delimiter, standard null
    /// markers, pure-numeric columns only, long rows rejected).
    #[must_use]
    pub fn new() -> Self {
        Self {
            delimiter: Delimiter::default(),
            null_markers: DEFAULT_NULL_MARKERS.iter().map(|s| (*s).to_string()).collect(),
            inference: TypeInference::default(),
            ragged_rows: RaggedRows::default(),
        }
    }

    /// Set the field delimiter (default: comma).
    #[must_use]
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Delimiter::Byte(delimiter);
        self
    }

    /// Sniff the delimiter from the first non-blank line.
    #[must_use]
    pub fn detect_delimiter(mut self) -> Self {
        self.delimiter = Delimiter::Detect;
        self
    }

    /// Set the delimiter policy directly.
    #[must_use]
    pub fn delimiter_mode(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the null markers (replaces the defaults). Markers are compared
    /// against trimmed fields.
    #[must_use]
    pub fn null_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Set the fraction of non-null cells that must parse for a numeric column.
    #[must_use]
    pub fn numeric_threshold(mut self, threshold: f64) -> Self {
        self.inference.numeric_threshold = threshold;
        self
    }

    /// Accept a digit grouping separator inside numbers.
    ///
    /// `.` and ASCII digits are ignored since they cannot act as separators.
    #[must_use]
    pub fn thousands_separator(mut self, separator: Option<char>) -> Self {
        self.inference.thousands_separator = separator.filter(|&c| c != '.' && !c.is_ascii_digit());
        self
    }

    /// Set the policy for rows longer than the header (default: reject).
    #[must_use]
    pub fn ragged_rows(mut self, policy: RaggedRows) -> Self {
        self.ragged_rows = policy;
        self
    }

    /// The type inference settings in effect.
    #[must_use]
    pub fn inference(&self) -> &TypeInference {
        &self.inference
    }

    /// Parse raw bytes, honoring a UTF-8 or UTF-16 byte order mark.
    ///
    /// Input without a BOM must be valid UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the bytes cannot be decoded, plus every
    /// error of [`DatasetParser::parse_str`].
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Dataset> {
        let text = decode(bytes)?;
        self.parse_str(&text)
    }

    /// Parse delimited text into a classified dataset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the input has no records, has a header but
    /// no data rows, or (under [`RaggedRows::Reject`]) contains a row longer
    /// than the header.
    pub fn parse_str(&self, input: &str) -> Result<Dataset> {
        let input = input.strip_prefix('\u{feff}').unwrap_or(input);
        let delimiter = match self.delimiter {
            Delimiter::Byte(b) => b,
            Delimiter::Detect => detect_delimiter(input),
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .delimiter(delimiter)
            .from_reader(input.as_bytes());

        let mut headers: Option<Vec<String>> = None;
        let mut rows: Vec<Vec<Cell>> = Vec::new();
        let mut blank = 0usize;

        for record in reader.records() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                blank += 1;
                continue;
            }

            let Some(width) = headers.as_ref().map(Vec::len) else {
                headers = Some(record.iter().map(str::to_string).collect());
                continue;
            };

            if record.len() > width {
                let line = record.position().map_or(0, |p| p.line() as usize);
                match self.ragged_rows {
                    RaggedRows::Reject => {
                        return Err(Error::parse_at(
                            line,
                            format!("expected at most {width} fields, got {}", record.len()),
                        ));
                    }
                    RaggedRows::Truncate => {
                        warn!(line, extra = record.len() - width, "truncating long row");
                    }
                }
            }

            let mut row: Vec<Cell> = record.iter().take(width).map(|f| self.cell(f)).collect();
            row.resize(width, Cell::Null);
            rows.push(row);
        }

        let headers = headers.ok_or_else(|| Error::parse("input is empty"))?;
        if rows.is_empty() {
            return Err(Error::parse("no data rows after header"));
        }
        if blank > 0 {
            debug!(blank, "skipped blank records");
        }

        let dataset = Dataset::build(normalize_headers(headers), rows, &self.inference);
        debug!(
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            numeric = dataset.numeric_headers().len(),
            categorical = dataset.categorical_headers().len(),
            delimiter = %char::from(delimiter).escape_default(),
            "parsed dataset"
        );
        Ok(dataset)
    }

    fn cell(&self, field: &str) -> Cell {
        if self.null_markers.iter().any(|m| m == field) {
            Cell::Null
        } else {
            Cell::Text(field.to_string())
        }
    }
}

/// Decode bytes to text, honoring a BOM and otherwise requiring UTF-8.
fn decode(bytes: &[u8]) -> Result<Cow<'_, str>> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        if had_errors {
            return Err(Error::parse(format!("input is not valid {}", encoding.name())));
        }
        return Ok(text);
    }

    UTF_8
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or_else(|| Error::parse("input is not valid UTF-8"))
}

/// Pick the most frequent candidate delimiter on the first non-blank line.
///
/// Quoted sections are skipped. Ties go to the earlier candidate.
fn detect_delimiter(input: &str) -> u8 {
    let Some(line) = input.lines().find(|l| !l.trim().is_empty()) else {
        return b',';
    };

    let mut counts = [0usize; DELIMITER_CANDIDATES.len()];
    let mut in_quotes = false;
    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
        } else if !in_quotes {
            if let Some(i) = DELIMITER_CANDIDATES.iter().position(|&d| d == byte) {
                counts[i] += 1;
            }
        }
    }

    let mut best = 0;
    for (i, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = i;
        }
    }
    if counts[best] == 0 {
        b','
    } else {
        DELIMITER_CANDIDATES[best]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::ColumnKind;
    use crate::error::ErrorKind;

    // ── Basic parsing ───────────────────────────────────────────

    #[test]
    fn test_parse_simple() {
        let data = parse_dataset("name,score\nann,1.5\nbob,2\n").unwrap();
        assert_eq!(data.headers(), vec!["name", "score"]);
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.numeric_headers(), vec!["score"]);
        assert_eq!(data.categorical_headers(), vec!["name"]);
        assert_eq!(data.cell(0, "name"), Some(&Cell::Text("ann".into())));
        assert_eq!(data.cell(1, "score"), Some(&Cell::Number(2.0)));
    }

    #[test]
    fn test_parse_crlf_and_no_trailing_newline() {
        let data = parse_dataset("a,b\r\n1,x\r\n2,y").unwrap();
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.cell(1, "b"), Some(&Cell::Text("y".into())));
    }

    #[test]
    fn test_parse_strips_bom_and_trims() {
        let data = parse_dataset("\u{feff} g , v \n  a ,  3 \n").unwrap();
        assert_eq!(data.headers(), vec!["g", "v"]);
        assert_eq!(data.cell(0, "g"), Some(&Cell::Text("a".into())));
        assert_eq!(data.cell(0, "v"), Some(&Cell::Number(3.0)));
    }

    #[test]
    fn test_parse_quoted_fields() {
        let text = "label,value\n\"a, b\",1\n\"say \"\"hi\"\"\",2\n\"multi\nline\",3\n";
        let data = parse_dataset(text).unwrap();
        assert_eq!(data.row_count(), 3);
        assert_eq!(data.cell(0, "label"), Some(&Cell::Text("a, b".into())));
        assert_eq!(data.cell(1, "label"), Some(&Cell::Text("say \"hi\"".into())));
        assert_eq!(data.cell(2, "label"), Some(&Cell::Text("multi\nline".into())));
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let data = parse_dataset("\n\n   \na,b\n1,2\n\n3,4\n\n").unwrap();
        assert_eq!(data.headers(), vec!["a", "b"]);
        assert_eq!(data.row_count(), 2);
    }

    // ── Header rules ────────────────────────────────────────────

    #[test]
    fn test_parse_header_defaults_and_duplicates() {
        let data = parse_dataset("x,,x\n1,2,3\n").unwrap();
        assert_eq!(data.headers(), vec!["x", "column_2", "x_2"]);
    }

    // ── Ragged rows ─────────────────────────────────────────────

    #[test]
    fn test_short_rows_are_padded() {
        let data = parse_dataset("a,b,c\n1,2\n3,4,5\n").unwrap();
        assert_eq!(data.cell(0, "c"), Some(&Cell::Null));
        assert_eq!(data.column_kind("c"), Some(ColumnKind::Numeric));
    }

    #[test]
    fn test_long_rows_rejected_by_default() {
        let err = parse_dataset("a,b\n1,2\n3,4,5\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(
            err,
            Error::Parse {
                line: Some(3),
                message: "expected at most 2 fields, got 3".into()
            }
        );
    }

    #[test]
    fn test_long_rows_truncated_on_request() {
        let data = DatasetParser::new()
            .ragged_rows(RaggedRows::Truncate)
            .parse_str("a,b\n1,2\n3,4,5\n")
            .unwrap();
        assert_eq!(data.row_count(), 2);
        assert_eq!(data.rows()[1].cells().len(), 2);
    }

    // ── Failures ────────────────────────────────────────────────

    #[test]
    fn test_empty_input() {
        for text in ["", "\n\n", "  \n\t\n"] {
            let err = parse_dataset(text).unwrap_err();
            assert_eq!(err, Error::parse("input is empty"));
        }
    }

    #[test]
    fn test_header_only() {
        let err = parse_dataset("a,b,c\n").unwrap_err();
        assert_eq!(err, Error::parse("no data rows after header"));
        assert_eq!(err.to_string(), "parse error: no data rows after header");
    }

    // ── Null markers and typing ─────────────────────────────────

    #[test]
    fn test_null_markers() {
        let data = parse_dataset("g,v\na,1\nb,NA\nc,\nd,#N/A\ne,.\n").unwrap();
        assert_eq!(data.column_kind("v"), Some(ColumnKind::Numeric));
        let nulls = data.column_cells("v").unwrap().filter(|c| c.is_null()).count();
        assert_eq!(nulls, 4);
    }

    #[test]
    fn test_custom_null_markers() {
        let data = DatasetParser::new()
            .null_markers(["", "-"])
            .parse_str("v\n1\n-\nNA\n")
            .unwrap();
        assert_eq!(data.column_kind("v"), Some(ColumnKind::Categorical));
        assert_eq!(data.cell(1, "v"), Some(&Cell::Null));
        assert_eq!(data.cell(2, "v"), Some(&Cell::Text("NA".into())));
    }

    #[test]
    fn test_null_markers_apply_to_categorical_columns() {
        let text = "region,v\nNA,1\nEU,2\nNone,3\n";

        let data = parse_dataset(text).unwrap();
        assert_eq!(data.cell(0, "region"), Some(&Cell::Null));
        assert_eq!(data.cell(2, "region"), Some(&Cell::Null));

        let data = DatasetParser::new().null_markers([""]).parse_str(text).unwrap();
        assert_eq!(data.cell(0, "region"), Some(&Cell::Text("NA".into())));
        assert_eq!(data.cell(2, "region"), Some(&Cell::Text("None".into())));
    }

    #[test]
    fn test_mixed_column_is_categorical() {
        let data = parse_dataset("v\n1\n2\nthree\n").unwrap();
        assert_eq!(data.column_kind("v"), Some(ColumnKind::Categorical));
        assert_eq!(data.cell(0, "v"), Some(&Cell::Text("1".into())));
    }

    #[test]
    fn test_partial_numeric_threshold() {
        let data = DatasetParser::new()
            .numeric_threshold(0.75)
            .parse_str("v\n1\n2\n3\noops\n")
            .unwrap();
        assert_eq!(data.column_kind("v"), Some(ColumnKind::Numeric));
        assert_eq!(data.cell(3, "v"), Some(&Cell::Text("oops".into())));
    }

    #[test]
    fn test_all_null_column_is_categorical() {
        let data = parse_dataset("a,b\n1,\n2,NA\n").unwrap();
        assert_eq!(data.column_kind("b"), Some(ColumnKind::Categorical));
    }

    #[test]
    fn test_thousands_separator() {
        let text = "v\n\"1,200\"\n\"12,000.5\"\n7\n";
        let plain = parse_dataset(text).unwrap();
        assert_eq!(plain.column_kind("v"), Some(ColumnKind::Categorical));

        let grouped = DatasetParser::new()
            .thousands_separator(Some(','))
            .parse_str(text)
            .unwrap();
        assert_eq!(grouped.column_kind("v"), Some(ColumnKind::Numeric));
        assert_eq!(grouped.cell(1, "v"), Some(&Cell::Number(12_000.5)));
    }

    #[test]
    fn test_thousands_separator_ignores_decimal_point() {
        let parser = DatasetParser::new().thousands_separator(Some('.'));
        assert_eq!(parser.inference().thousands_separator, None);
    }

    // ── Delimiters ──────────────────────────────────────────────

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(detect_delimiter("\n\na\tb\n"), b'\t');
        assert_eq!(detect_delimiter("a|b\n"), b'|');
        assert_eq!(detect_delimiter("\"x;y\",b\n"), b',');
        assert_eq!(detect_delimiter("single\n"), b',');
        assert_eq!(detect_delimiter(""), b',');
    }

    #[test]
    fn test_delimiter_from_str() {
        assert_eq!(Delimiter::default(), Delimiter::Byte(b','));
        assert_eq!(",".parse::<Delimiter>().unwrap(), Delimiter::default());
        assert_eq!(";".parse::<Delimiter>().unwrap(), Delimiter::Byte(b';'));
        assert_eq!("\t".parse::<Delimiter>().unwrap(), Delimiter::Byte(b'\t'));
        assert_eq!("\\t".parse::<Delimiter>().unwrap(), Delimiter::Byte(b'\t'));
        assert_eq!("auto".parse::<Delimiter>().unwrap(), Delimiter::Detect);

        for bad in ["", ";;", "é", "\"", "\n"] {
            let err = bad.parse::<Delimiter>().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Parse, "{bad:?}");
        }
    }

    #[test]
    fn test_delimiter_mode_matches_shorthands() {
        let text = "g;v\na;1\nb;2\n";
        let detected = DatasetParser::new().delimiter_mode(Delimiter::Detect).parse_str(text).unwrap();
        assert_eq!(detected, DatasetParser::new().detect_delimiter().parse_str(text).unwrap());

        // Without detection the default comma keeps the line whole
        let comma = DatasetParser::new().delimiter_mode(Delimiter::default()).parse_str(text).unwrap();
        assert_eq!(comma.headers(), vec!["g;v"]);
    }

    #[test]
    fn test_parse_with_detected_delimiter() {
        let data = DatasetParser::new()
            .detect_delimiter()
            .parse_str("g;v\na;1,5\nb;2\n")
            .unwrap();
        assert_eq!(data.headers(), vec!["g", "v"]);
        assert_eq!(data.column_kind("v"), Some(ColumnKind::Categorical));
    }

    // ── Byte input ──────────────────────────────────────────────

    #[test]
    fn test_parse_bytes_utf8() {
        let data = DatasetParser::new().parse_bytes("g,v\nå,1\nø,2\n".as_bytes()).unwrap();
        assert_eq!(data.cell(0, "g"), Some(&Cell::Text("å".into())));
    }

    #[test]
    fn test_parse_bytes_utf16le_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "g,v\na,1\nb,2\n".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let data = DatasetParser::new().parse_bytes(&bytes).unwrap();
        assert_eq!(data.headers(), vec!["g", "v"]);
        assert_eq!(data.numeric_headers(), vec!["v"]);
    }

    #[test]
    fn test_parse_bytes_invalid_utf8() {
        let err = DatasetParser::new()
            .parse_bytes(&[b'a', b'\n', 0xC3, 0x28, b'\n'])
            .unwrap_err();
        assert_eq!(err, Error::parse("input is not valid UTF-8"));
    }
}
