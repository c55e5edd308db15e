//! One-way ANOVA result types.

use std::collections::BTreeMap;
use std::fmt;

/// Descriptive statistics for one group.
///
/// `variance` and `std_dev` use the sample (n − 1) divisor, the same
/// convention that makes Σ (n_i − 1)·variance_i equal the within-group sum
/// of squares.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupStats {
    /// Number of usable observations.
    pub n: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
    /// Sample variance.
    pub variance: f64,
    /// Smallest observation.
    pub min: f64,
    /// Largest observation.
    pub max: f64,
}

impl GroupStats {
    /// Standard error of the mean (`std_dev / sqrt(n)`).
    #[must_use]
    pub fn std_error(&self) -> f64 {
        self.std_dev / (self.n as f64).sqrt()
    }
}

/// Source of variation in an ANOVA table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Source {
    /// Variation of group means around the grand mean.
    Between,
    /// Variation of observations around their group mean.
    Within,
    /// Variation of observations around the grand mean.
    Total,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Between => f.write_str("Between groups"),
            Self::Within => f.write_str("Within groups"),
            Self::Total => f.write_str("Total"),
        }
    }
}

/// One line of the classic ANOVA table.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnovaTableRow {
    /// Which variation this row describes.
    pub source: Source,
    /// Sum of squares.
    pub sum_of_squares: f64,
    /// Degrees of freedom.
    pub degrees_of_freedom: usize,
    /// Mean square (SS / df), None for the total row.
    pub mean_square: Option<f64>,
    /// F statistic, only on the between-groups row.
    pub f_ratio: Option<f64>,
    /// P-value, only on the between-groups row.
    pub p_value: Option<f64>,
}

/// Complete one-way ANOVA result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnovaResult {
    /// Categorical column that defined the groups.
    pub group_column: String,
    /// Numeric column that was compared.
    pub value_column: String,
    /// F statistic (MS between / MS within).
    pub f_stat: f64,
    /// Upper-tail probability of the F-distribution at `f_stat`.
    pub p_value: f64,
    /// Number of groups minus one.
    pub df_between: usize,
    /// Number of observations minus number of groups.
    pub df_within: usize,
    /// Between-groups sum of squares.
    pub ss_between: f64,
    /// Within-groups sum of squares.
    pub ss_within: f64,
    /// Between-groups mean square.
    pub ms_between: f64,
    /// Within-groups mean square.
    pub ms_within: f64,
    /// Mean of all included observations.
    pub grand_mean: f64,
    /// Number of included observations.
    pub n_total: usize,
    /// Rows dropped for a missing label or a missing/non-numeric value.
    pub excluded_rows: usize,
    /// Per-group statistics keyed by label, in label order.
    pub groups: BTreeMap<String, GroupStats>,
}

impl AnovaResult {
    /// Total sum of squares (`ss_between + ss_within`).
    #[must_use]
    pub fn ss_total(&self) -> f64 {
        self.ss_between + self.ss_within
    }

    /// Total degrees of freedom (`n_total - 1`).
    #[must_use]
    pub fn df_total(&self) -> usize {
        self.df_between + self.df_within
    }

    /// Share of total variation explained by the grouping (η²).
    #[must_use]
    pub fn eta_squared(&self) -> f64 {
        let total = self.ss_total();
        if total > 0.0 {
            self.ss_between / total
        } else {
            0.0
        }
    }

    /// Whether the group means differ at significance level `alpha`.
    #[must_use]
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }

    /// The result laid out as Between / Within / Total rows.
    #[must_use]
    pub fn table(&self) -> [AnovaTableRow; 3] {
        [
            AnovaTableRow {
                source: Source::Between,
                sum_of_squares: self.ss_between,
                degrees_of_freedom: self.df_between,
                mean_square: Some(self.ms_between),
                f_ratio: Some(self.f_stat),
                p_value: Some(self.p_value),
            },
            AnovaTableRow {
                source: Source::Within,
                sum_of_squares: self.ss_within,
                degrees_of_freedom: self.df_within,
                mean_square: Some(self.ms_within),
                f_ratio: None,
                p_value: None,
            },
            AnovaTableRow {
                source: Source::Total,
                sum_of_squares: self.ss_total(),
                degrees_of_freedom: self.df_total(),
                mean_square: None,
                f_ratio: None,
                p_value: None,
            },
        ]
    }
}
