//! Percentile Ranking
//!
//! Ranks a single measurement against a reference cohort of peer values.
//!
//! Convention: percentile-of-score, "mean" kind, i.e. the average of the
//! percentage of cohort values strictly below the score and the percentage
//! at or below it. A value tied with every cohort member therefore ranks 50.

use crate::thresholds::Direction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of ranking a value against a cohort
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "value")]
pub enum Percentile {
    /// Rank in [0, 100]
    Ranked(f64),
    /// Empty cohort (after dropping NaN) or non-finite subject value
    InsufficientData,
}

impl Percentile {
    pub fn value(&self) -> Option<f64> {
        match self {
            Percentile::Ranked(p) => Some(*p),
            Percentile::InsufficientData => None,
        }
    }

    pub fn band(&self) -> Option<PercentileBand> {
        self.value().map(PercentileBand::from_percentile)
    }

    /// `100 - p`, used when lower raw values are better
    pub fn inverted(self) -> Self {
        match self {
            Percentile::Ranked(p) => Percentile::Ranked(100.0 - p),
            Percentile::InsufficientData => Percentile::InsufficientData,
        }
    }
}

/// Qualitative bucket for display (lower edge inclusive, upper exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentileBand {
    /// < 25
    BelowAverage,
    /// [25, 50)
    SlightlyBelow,
    /// [50, 75)
    AverageOrAbove,
    /// >= 75
    WellAboveAverage,
}

impl PercentileBand {
    pub fn from_percentile(p: f64) -> Self {
        if p >= 75.0 {
            PercentileBand::WellAboveAverage
        } else if p >= 50.0 {
            PercentileBand::AverageOrAbove
        } else if p >= 25.0 {
            PercentileBand::SlightlyBelow
        } else {
            PercentileBand::BelowAverage
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PercentileBand::BelowAverage => "below average",
            PercentileBand::SlightlyBelow => "slightly below average",
            PercentileBand::AverageOrAbove => "average or above",
            PercentileBand::WellAboveAverage => "well above average",
        }
    }
}

impl fmt::Display for PercentileBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Percentile rank of `value` within `cohort`
///
/// NaN cohort members are ignored. An empty cohort or a non-finite value
/// yields [`Percentile::InsufficientData`].
pub fn percentile_of_score(value: f64, cohort: &[f64]) -> Percentile {
    if !value.is_finite() {
        return Percentile::InsufficientData;
    }

    let mut n = 0usize;
    let mut strictly_less = 0usize;
    let mut less_or_equal = 0usize;

    for &x in cohort.iter().filter(|x| !x.is_nan()) {
        n += 1;
        if x < value {
            strictly_less += 1;
        }
        if x <= value {
            less_or_equal += 1;
        }
    }

    if n == 0 {
        return Percentile::InsufficientData;
    }

    let n = n as f64;
    let pct_less = strictly_less as f64 * 100.0 / n;
    let pct_less_equal = less_or_equal as f64 * 100.0 / n;

    Percentile::Ranked((pct_less + pct_less_equal) / 2.0)
}

/// Percentile oriented so that higher always means better performance
///
/// For `Ascending` metrics (higher raw value is worse, e.g. sprint time)
/// the rank is inverted before bucketing.
pub fn performance_percentile(value: f64, cohort: &[f64], direction: Direction) -> Percentile {
    let rank = percentile_of_score(value, cohort);
    match direction {
        Direction::Ascending => rank.inverted(),
        Direction::Descending => rank,
    }
}
