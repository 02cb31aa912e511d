//! Value Classifier
//!
//! Maps a raw measurement onto a semaphore scale, producing the boundary
//! color and the qualitative zone it implies.
//!
//! Matching rules:
//! - Absolute scales pick the last boundary `<= value`; values below every
//!   boundary take the lowest boundary. Ascending scales are scanned upward,
//!   descending scales downward from the best (highest) boundary.
//! - Normalized scales (range / difference) pick the first boundary whose
//!   ratio is `>= ratio`, so a ratio in `(0.7, 0.8]` takes the `0.8` color.
//! - NaN or infinite input always yields the gray no-data color.

use crate::thresholds::{Boundary, Direction, ScaleDomain, ThresholdScale, DIFFERENCE_RATIO_MAX};
use crate::utils::color::{Rgb, NO_DATA_COLOR};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative tier implied by a classified color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Optimal,
    Average,
    Critical,
    NoData,
}

impl Zone {
    pub fn label(&self) -> &'static str {
        match self {
            Zone::Optimal => "Optimal",
            Zone::Average => "Average",
            Zone::Critical => "Critical",
            Zone::NoData => "No data",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of classifying one measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub color: Rgb,
    pub zone: Zone,
    /// Index of the matched boundary (`None` for no-data)
    pub boundary_index: Option<usize>,
}

impl Classification {
    pub fn no_data() -> Self {
        Self {
            color: NO_DATA_COLOR,
            zone: Zone::NoData,
            boundary_index: None,
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.zone == Zone::NoData
    }
}

/// Classify a value using an explicit direction
pub fn classify(value: f64, scale: &ThresholdScale, direction: Direction) -> Classification {
    if !value.is_finite() {
        return Classification::no_data();
    }

    let boundaries = scale.boundaries();
    let index = match scale.domain() {
        ScaleDomain::Absolute => match_absolute(boundaries, value, direction),
        domain => match_ratio(boundaries, domain.position(value)),
    };

    matched(boundaries, index, direction)
}

/// Classify a value with the scale's own direction
pub fn classify_value(value: f64, scale: &ThresholdScale) -> Classification {
    classify(value, scale, scale.direction())
}

/// Classify a percentage difference against a ratio-keyed scale
///
/// The difference is divided by the scale's difference maximum (10.0 unless
/// configured otherwise), clamped to [0, 1] and matched on ratio.
pub fn classify_difference(difference_pct: f64, scale: &ThresholdScale) -> Classification {
    if !difference_pct.is_finite() {
        return Classification::no_data();
    }

    let max = match scale.domain() {
        ScaleDomain::Difference { max } => max,
        _ => DIFFERENCE_RATIO_MAX,
    };
    let ratio = (difference_pct / max).clamp(0.0, 1.0);
    let index = match_ratio(scale.boundaries(), ratio);

    matched(scale.boundaries(), index, scale.direction())
}

fn match_absolute(boundaries: &[Boundary], value: f64, direction: Direction) -> usize {
    match direction {
        Direction::Ascending => boundaries
            .iter()
            .rposition(|b| b.value <= value)
            .unwrap_or(0),
        Direction::Descending => {
            // Best boundary first; falling through every boundary means the worst one
            let from_top = boundaries.iter().rev().position(|b| value >= b.value);
            match from_top {
                Some(offset) => boundaries.len() - 1 - offset,
                None => 0,
            }
        }
    }
}

fn match_ratio(boundaries: &[Boundary], ratio: f64) -> usize {
    boundaries
        .iter()
        .position(|b| b.value >= ratio)
        .unwrap_or(boundaries.len() - 1)
}

fn matched(boundaries: &[Boundary], index: usize, direction: Direction) -> Classification {
    Classification {
        color: boundaries[index].color,
        zone: zone_for(index, boundaries.len(), direction),
        boundary_index: Some(index),
    }
}

/// Zone from the matched boundary's severity rank
fn zone_for(index: usize, len: usize, direction: Direction) -> Zone {
    if len < 2 {
        return Zone::NoData;
    }

    let rank = match direction {
        Direction::Ascending => index,
        Direction::Descending => len - 1 - index,
    };
    let severity = rank as f64 / (len - 1) as f64;

    if severity <= 1.0 / 3.0 {
        Zone::Optimal
    } else if severity <= 2.0 / 3.0 {
        Zone::Average
    } else {
        Zone::Critical
    }
}
