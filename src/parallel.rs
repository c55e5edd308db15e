//! Parallel classification and analysis using Rayon.
//!
//! Enable with the `parallel` feature flag. Column classification inside
//! [`crate::dataset::DatasetParser`] switches to the parallel path
//! automatically; [`par_compute_one_way_anova_all`] is the parallel
//! counterpart of [`crate::anova::compute_one_way_anova_all`].
//!
//! # Usage
//!
//! ```ignore
//! use oneway::dataset::parse_dataset;
//! use oneway::parallel::par_compute_one_way_anova_all;
//!
//! let data = parse_dataset("g,x,y\na,1,2\na,2,4\nb,3,1\nb,5,0\n").unwrap();
//! let results = par_compute_one_way_anova_all(&data, "g").unwrap();
//! assert_eq!(results.len(), 2);
//! ```
//!
//! # Performance
//!
//! Each column is an independent unit of work, so the speedup grows with
//! the number of columns. For narrow datasets the sequential versions may
//! be faster due to parallelization overhead.

use rayon::prelude::*;

use crate::anova::{compute_one_way_anova, resolve_column, AnovaResult};
use crate::dataset::{Cell, ColumnKind, Dataset, TypeInference};
use crate::error::{ColumnRole, Result};

/// Classify each column of row-major cells, one column per task.
pub(crate) fn par_classify_columns(
    rows: &[Vec<Cell>],
    width: usize,
    inference: &TypeInference,
) -> Vec<ColumnKind> {
    (0..width)
        .into_par_iter()
        .map(|col| inference.classify(rows.iter().filter_map(|row| row.get(col))))
        .collect()
}

/// Run a one-way ANOVA for every numeric column in parallel.
///
/// Results come back in header order, exactly as the sequential version
/// returns them.
///
/// # Errors
///
/// Fails up front with a validation error if `group_column` is missing or
/// not categorical.
pub fn par_compute_one_way_anova_all(
    data: &Dataset,
    group_column: &str,
) -> Result<Vec<(String, Result<AnovaResult>)>> {
    resolve_column(data, group_column, ColumnRole::Group)?;

    Ok(data
        .numeric_headers()
        .into_par_iter()
        .map(|value| {
            (
                value.to_string(),
                compute_one_way_anova(data, group_column, value),
            )
        })
        .collect())
}
