//! One-way analysis of variance.
//!
//! Compares a numeric value column across the levels of a categorical group
//! column:
//! - Per-group count, mean and sample standard deviation
//! - Between/within sums of squares, degrees of freedom and mean squares
//! - F statistic with its upper-tail p-value
//!
//! ## Quick Start
//!
//! ```rust
//! use oneway::anova::compute_one_way_anova;
//! use oneway::dataset::parse_dataset;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = parse_dataset(
//!     "group,value\nA,1\nA,2\nA,3\nB,4\nB,5\nB,6\nC,7\nC,8\nC,9\n",
//! )?;
//!
//! let result = compute_one_way_anova(&data, "group", "value")?;
//!
//! assert_eq!(result.df_between, 2);
//! assert_eq!(result.df_within, 6);
//! assert!((result.f_stat - 27.0).abs() < 1e-12);
//! assert!(result.p_value < 0.005);
//! assert!((result.groups["B"].mean - 5.0).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```
//!
//! ## Conventions
//!
//! - Rows with a null/empty group label or a missing/non-numeric value are
//!   excluded and counted in [`AnovaResult::excluded_rows`].
//! - At least [`MIN_GROUPS`] groups must remain and each needs at least
//!   [`MIN_GROUP_SIZE`] observations.
//! - Group variances use the n − 1 divisor.
//! - Zero within-group variance is reported as
//!   [`Error::DegenerateVariance`] rather than an infinite F.
//! - Sums of squares that overflow `f64` are reported as
//!   [`Error::NumericOverflow`]; a result never carries NaN or infinity.
//! - Observations are sorted within each group before summing, so the
//!   result does not depend on row order.

mod stats;
mod types;

use std::collections::BTreeMap;

use tracing::debug;

pub use stats::{f_distribution_p_value, ln_gamma, regularized_incomplete_beta};
pub use types::{AnovaResult, AnovaTableRow, GroupStats, Source};

use crate::dataset::{ColumnKind, Dataset};
use crate::error::{ColumnRole, Error, Result};

/// Minimum number of usable groups.
pub const MIN_GROUPS: usize = 2;

/// Minimum number of usable observations per group.
pub const MIN_GROUP_SIZE: usize = 2;

/// Run a one-way ANOVA of `value_column` across the groups of `group_column`.
///
/// # Arguments
/// * `data` - Classified dataset
/// * `group_column` - A categorical column; its labels define the groups
/// * `value_column` - A numeric column; its values are compared
///
/// # Errors
/// * [`Error::ColumnNotFound`] / [`Error::WrongColumnKind`] if a column is
///   missing or has the wrong classification
/// * [`Error::TooFewGroups`] if fewer than two groups have usable values
/// * [`Error::GroupTooSmall`] if a usable group has a single observation
/// * [`Error::DegenerateVariance`] if every group is constant
/// * [`Error::NumericOverflow`] if values are too large for the sums of
///   squares or F to stay finite
///
/// # Algorithm
/// 1. Group usable (label, value) pairs by label
/// 2. Per group: n_i, mean_i, sample variance s_i²
/// 3. Grand mean over all included observations
/// 4. SSB = Σ n_i (mean_i − grand_mean)², SSW = Σ Σ (x − mean_i)²
/// 5. df_between = k − 1, df_within = N − k
/// 6. F = (SSB / df_between) / (SSW / df_within), p = P(F_{df_between, df_within} > F)
pub fn compute_one_way_anova(
    data: &Dataset,
    group_column: &str,
    value_column: &str,
) -> Result<AnovaResult> {
    let group_index = resolve_column(data, group_column, ColumnRole::Group)?;
    let value_index = resolve_column(data, value_column, ColumnRole::Value)?;

    // Collect usable observations
    let mut samples: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut excluded_rows = 0usize;
    for row in data.rows() {
        let label = row.get(group_index).and_then(|c| c.label());
        let value = row.get(value_index).and_then(|c| c.as_number());
        match (label, value) {
            (Some(label), Some(value)) => samples.entry(label).or_default().push(value),
            _ => excluded_rows += 1,
        }
    }

    if samples.len() < MIN_GROUPS {
        return Err(Error::TooFewGroups {
            found: samples.len(),
        });
    }
    if let Some((group, values)) = samples.iter().find(|(_, v)| v.len() < MIN_GROUP_SIZE) {
        return Err(Error::GroupTooSmall {
            group: group.clone(),
            count: values.len(),
        });
    }

    // Per-group statistics
    let mut groups: BTreeMap<String, GroupStats> = BTreeMap::new();
    let mut ss_within = 0.0;
    let mut grand_sum = 0.0;
    let mut n_total = 0usize;
    for (label, values) in &mut samples {
        values.sort_by(f64::total_cmp);
        let (stats, ss) = summarize(values);
        ss_within += ss;
        grand_sum += values.iter().sum::<f64>();
        n_total += stats.n;
        groups.insert(label.clone(), stats);
    }

    let grand_mean = grand_sum / n_total as f64;

    // SS_between = Σ nᵢ(ȳᵢ - ȳ)²
    let ss_between: f64 = groups
        .values()
        .map(|g| g.n as f64 * (g.mean - grand_mean).powi(2))
        .sum();

    let df_between = groups.len() - 1;
    let df_within = n_total - groups.len();
    let ms_between = ss_between / df_between as f64;
    let ms_within = ss_within / df_within as f64;

    let overflow = || Error::NumericOverflow {
        column: value_column.to_string(),
    };
    if !(grand_mean.is_finite() && ss_between.is_finite() && ss_within.is_finite()) {
        return Err(overflow());
    }
    if ms_within == 0.0 {
        return Err(Error::DegenerateVariance { ss_between });
    }

    let f_stat = ms_between / ms_within;
    if !f_stat.is_finite() {
        return Err(overflow());
    }
    let p_value = f_distribution_p_value(f_stat, df_between, df_within);

    debug!(
        group_column,
        value_column,
        groups = groups.len(),
        observations = n_total,
        excluded_rows,
        f_stat,
        p_value,
        "computed one-way anova"
    );

    Ok(AnovaResult {
        group_column: group_column.to_string(),
        value_column: value_column.to_string(),
        f_stat,
        p_value,
        df_between,
        df_within,
        ss_between,
        ss_within,
        ms_between,
        ms_within,
        grand_mean,
        n_total,
        excluded_rows,
        groups,
    })
}

/// Run [`compute_one_way_anova`] for every numeric column against one group column.
///
/// Each numeric column gets its own result, in header order, so one
/// unusable measure does not hide the others.
///
/// # Errors
///
/// Fails up front with a validation error if `group_column` is missing or
/// not categorical.
///
/// ```rust
/// use oneway::anova::compute_one_way_anova_all;
/// use oneway::dataset::parse_dataset;
///
/// let data = parse_dataset("g,x,y\na,1,5\na,2,5\nb,3,5\nb,5,5\n").unwrap();
/// let results = compute_one_way_anova_all(&data, "g").unwrap();
///
/// assert_eq!(results.len(), 2);
/// assert!(results[0].1.is_ok());
/// assert!(results[1].1.is_err()); // y is constant
/// ```
pub fn compute_one_way_anova_all(
    data: &Dataset,
    group_column: &str,
) -> Result<Vec<(String, Result<AnovaResult>)>> {
    resolve_column(data, group_column, ColumnRole::Group)?;

    Ok(data
        .numeric_headers()
        .into_iter()
        .map(|value| {
            (
                value.to_string(),
                compute_one_way_anova(data, group_column, value),
            )
        })
        .collect())
}

/// Look up a column and check it has the classification its role requires.
pub(crate) fn resolve_column(data: &Dataset, column: &str, role: ColumnRole) -> Result<usize> {
    let expected = match role {
        ColumnRole::Group => ColumnKind::Categorical,
        ColumnRole::Value => ColumnKind::Numeric,
    };

    let index = data
        .column_index(column)
        .ok_or_else(|| Error::ColumnNotFound {
            role,
            column: column.to_string(),
        })?;

    if data.columns()[index].kind != expected {
        return Err(Error::WrongColumnKind {
            role,
            column: column.to_string(),
            expected,
        });
    }
    Ok(index)
}

/// Descriptive statistics and sum of squared deviations of sorted values.
///
/// A constant group contributes exactly zero.
fn summarize(sorted: &[f64]) -> (GroupStats, f64) {
    let n = sorted.len();
    let min = sorted[0];
    let max = sorted[n - 1];

    let (mean, ss) = if min == max {
        (min, 0.0)
    } else {
        let mean = sorted.iter().sum::<f64>() / n as f64;
        let ss = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
        (mean, ss)
    };

    let variance = ss / (n - 1) as f64;
    let stats = GroupStats {
        n,
        mean,
        std_dev: variance.sqrt(),
        variance,
        min,
        max,
    };
    (stats, ss)
}
