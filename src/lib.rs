//! # oneway
//!
//! Delimited-text ingestion with automatic column typing, and one-way
//! analysis of variance over the resulting datasets.
//!
//! ## Overview
//!
//! The library is split into two stages:
//! - **Ingestion** ([`dataset`]): parse CSV-style text into a [`Dataset`] whose
//!   columns are each classified as numeric or categorical
//! - **Analysis** ([`anova`]): compare a numeric column across the groups of a
//!   categorical column with a one-way ANOVA F-test
//!
//! ## Quick Start
//!
//! ```rust
//! use oneway::{compute_one_way_anova, parse_dataset};
//!
//! let csv = "\
//! fertilizer,yield
//! A,1
//! A,2
//! A,3
//! B,4
//! B,5
//! B,6
//! C,7
//! C,8
//! C,9
//! ";
//!
//! let data = parse_dataset(csv).unwrap();
//! assert_eq!(data.categorical_headers(), vec!["fertilizer"]);
//! assert_eq!(data.numeric_headers(), vec!["yield"]);
//!
//! let result = compute_one_way_anova(&data, "fertilizer", "yield").unwrap();
//! assert_eq!((result.df_between, result.df_within), (2, 6));
//! assert!((result.f_stat - 27.0).abs() < 1e-12);
//! assert!(result.is_significant(0.01));
//! ```
//!
//! Parsing can be configured with the builder:
//!
//! ```rust
//! use oneway::dataset::DatasetParser;
//!
//! let data = DatasetParser::new()
//!     .detect_delimiter()
//!     .thousands_separator(Some(','))
//!     .parse_str("city;population\nOslo;\"709,037\"\nBergen;\"291,940\"\n")
//!     .unwrap();
//!
//! assert_eq!(data.numeric_headers(), vec!["population"]);
//! ```
//!
//! ## Errors
//!
//! Every fallible operation returns [`Result`]. [`Error::kind`] groups the
//! variants into parse, validation, insufficient-data, degenerate-variance
//! and export failures.
//!
//! ## Logging
//!
//! Parsing and analysis emit [`tracing`] events at `debug` level (and a
//! `warn` when rows are truncated). Install any subscriber to see them.
//!
//! ## Features
//!
//! - `serde`: Enable serialization/deserialization of datasets and results
//! - `parallel`: Classify columns and analyze many measures in parallel using rayon
//! - `python`: Enable Python bindings via PyO3

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod anova;
pub mod dataset;
pub mod error;
#[cfg(feature = "python")]
pub mod python;

#[cfg(feature = "parallel")]
pub mod parallel;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::anova::{
        compute_one_way_anova, compute_one_way_anova_all, f_distribution_p_value, AnovaResult,
        AnovaTableRow, GroupStats, Source,
    };
    pub use crate::dataset::{
        parse_dataset, Cell, Column, ColumnKind, Dataset, DatasetParser, Delimiter, RaggedRows,
        Row, TypeInference,
    };
    pub use crate::error::{ColumnRole, Error, ErrorKind, Result};

    #[cfg(feature = "parallel")]
    pub use crate::parallel::par_compute_one_way_anova_all;
}

// Re-export commonly used items at crate root
pub use anova::{compute_one_way_anova, compute_one_way_anova_all, AnovaResult, GroupStats};
pub use dataset::{parse_dataset, ColumnKind, Dataset, DatasetParser};
pub use error::{Error, ErrorKind, Result};
