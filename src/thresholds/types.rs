//! Threshold scale types
//!
//! A semaphore scale is an ordered list of `(boundary, color)` pairs selected
//! by `(sex, age category, metric)`. Scales are built once from configuration
//! and never mutated afterwards.

use super::error::ScaleError;
use crate::utils::color::{interpolate, Rgb, NO_DATA_COLOR};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Divisor applied to percentage differences before ratio matching.
pub const DIFFERENCE_RATIO_MAX: f64 = 10.0;

/// Athlete sex as recorded in the test spreadsheets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sex {
    /// Hombre (male)
    H,
    /// Mujer (female)
    M,
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "h" | "male" | "hombre" => Ok(Sex::H),
            "m" | "female" | "mujer" => Ok(Sex::M),
            other => Err(format!("Unknown sex: '{}'", other)),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::H => f.write_str("H"),
            Sex::M => f.write_str("M"),
        }
    }
}

/// Age bracket used for scales and reference cohorts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeCategory {
    /// Ages 14-15
    Cadete,
    /// Ages 16-18
    Juvenil,
}

impl AgeCategory {
    pub fn from_age(age: u32) -> Option<Self> {
        match age {
            14..=15 => Some(AgeCategory::Cadete),
            16..=18 => Some(AgeCategory::Juvenil),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeCategory::Cadete => "cadete",
            AgeCategory::Juvenil => "juvenil",
        }
    }
}

impl FromStr for AgeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cadete" => Ok(AgeCategory::Cadete),
            "juvenil" => Ok(AgeCategory::Juvenil),
            other => Err(format!("Unknown age category: '{}'", other)),
        }
    }
}

impl fmt::Display for AgeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which way a raw value gets worse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Higher value is worse (times, body fat, asymmetry)
    Ascending,
    /// Higher value is better (jump height, distance)
    Descending,
}

/// Physical test metrics tracked by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "body_fat")]
    BodyFat,
    #[serde(rename = "cmj")]
    Cmj,
    #[serde(rename = "sprint_40m")]
    Sprint40m,
    #[serde(rename = "agility_505")]
    Agility505,
    #[serde(rename = "agility_asymmetry")]
    AgilityAsymmetry,
    #[serde(rename = "rsa_mean")]
    RsaMean,
    #[serde(rename = "rsa_decrement")]
    RsaDecrement,
    #[serde(rename = "yoyo_ir1")]
    YoyoIr1,
}

impl Metric {
    /// Report order
    pub const ALL: [Metric; 8] = [
        Metric::BodyFat,
        Metric::Cmj,
        Metric::Sprint40m,
        Metric::Agility505,
        Metric::AgilityAsymmetry,
        Metric::RsaMean,
        Metric::RsaDecrement,
        Metric::YoyoIr1,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Metric::BodyFat => "body_fat",
            Metric::Cmj => "cmj",
            Metric::Sprint40m => "sprint_40m",
            Metric::Agility505 => "agility_505",
            Metric::AgilityAsymmetry => "agility_asymmetry",
            Metric::RsaMean => "rsa_mean",
            Metric::RsaDecrement => "rsa_decrement",
            Metric::YoyoIr1 => "yoyo_ir1",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Metric::BodyFat => "Body Fat",
            Metric::Cmj => "Countermovement Jump",
            Metric::Sprint40m => "Sprint 40 m",
            Metric::Agility505 => "Agility 505",
            Metric::AgilityAsymmetry => "Agility Asymmetry",
            Metric::RsaMean => "RSA Mean Time",
            Metric::RsaDecrement => "RSA Decrement",
            Metric::YoyoIr1 => "Yo-Yo IR1",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::BodyFat | Metric::AgilityAsymmetry | Metric::RsaDecrement => "%",
            Metric::Cmj => "cm",
            Metric::Sprint40m | Metric::Agility505 | Metric::RsaMean => "s",
            Metric::YoyoIr1 => "m",
        }
    }

    pub fn natural_direction(&self) -> Direction {
        match self {
            Metric::Cmj | Metric::YoyoIr1 => Direction::Descending,
            _ => Direction::Ascending,
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Metric::ALL
            .into_iter()
            .find(|m| m.code() == wanted)
            .ok_or_else(|| format!("Unknown metric: '{}'", s.trim()))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Registry key: one scale per combination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScaleKey {
    pub sex: Sex,
    pub category: AgeCategory,
    pub metric: Metric,
}

impl ScaleKey {
    pub fn new(sex: Sex, category: AgeCategory, metric: Metric) -> Self {
        Self { sex, category, metric }
    }
}

impl fmt::Display for ScaleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.sex, self.category, self.metric)
    }
}

/// Coordinate system of the boundary values
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScaleDomain {
    /// Boundaries are raw measurement values
    #[default]
    Absolute,
    /// Boundaries are ratios of `(value - min) / (max - min)`
    Range { min: f64, max: f64 },
    /// Boundaries are ratios of `value / max` (percentage differences)
    Difference {
        #[serde(default = "default_difference_max")]
        max: f64,
    },
}

fn default_difference_max() -> f64 {
    DIFFERENCE_RATIO_MAX
}

impl ScaleDomain {
    pub fn difference() -> Self {
        ScaleDomain::Difference { max: DIFFERENCE_RATIO_MAX }
    }

    pub fn is_normalized(&self) -> bool {
        !matches!(self, ScaleDomain::Absolute)
    }

    /// Map a raw value into scale coordinates (ratios are clamped to [0, 1])
    pub fn position(&self, value: f64) -> f64 {
        match *self {
            ScaleDomain::Absolute => value,
            ScaleDomain::Range { min, max } => ((value - min) / (max - min)).clamp(0.0, 1.0),
            ScaleDomain::Difference { max } => (value / max).clamp(0.0, 1.0),
        }
    }

    fn validate(&self) -> Result<(), ScaleError> {
        match *self {
            ScaleDomain::Absolute => Ok(()),
            ScaleDomain::Range { min, max } => {
                if !min.is_finite() || !max.is_finite() || min >= max {
                    return Err(ScaleError::InvalidDomain(format!(
                        "range requires finite min < max, got [{}, {}]",
                        min, max
                    )));
                }
                Ok(())
            }
            ScaleDomain::Difference { max } => {
                if !max.is_finite() || max <= 0.0 {
                    return Err(ScaleError::InvalidDomain(format!(
                        "difference max must be positive, got {}",
                        max
                    )));
                }
                Ok(())
            }
        }
    }
}

/// One `(boundary, color)` pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub value: f64,
    pub color: Rgb,
}

/// Validated, immutable semaphore scale
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdScale {
    direction: Direction,
    domain: ScaleDomain,
    boundaries: SmallVec<[Boundary; 8]>,
}

impl ThresholdScale {
    /// Build a scale, validating boundary order and domain parameters
    ///
    /// Normalized scales are extended to cover [0, 1]: a missing `0.0` entry
    /// repeats the first color, a missing `1.0` entry repeats the last.
    pub fn new<I>(direction: Direction, domain: ScaleDomain, boundaries: I) -> Result<Self, ScaleError>
    where
        I: IntoIterator<Item = (f64, Rgb)>,
    {
        domain.validate()?;

        let mut entries: SmallVec<[Boundary; 8]> = boundaries
            .into_iter()
            .map(|(value, color)| Boundary { value, color })
            .collect();

        if entries.is_empty() {
            return Err(ScaleError::Empty);
        }

        for entry in &entries {
            if !entry.value.is_finite() {
                return Err(ScaleError::NonFinite(entry.value));
            }
            if domain.is_normalized() && !(0.0..=1.0).contains(&entry.value) {
                return Err(ScaleError::RatioOutOfRange(entry.value));
            }
        }

        for pair in entries.windows(2) {
            if pair[1].value <= pair[0].value {
                return Err(ScaleError::NotIncreasing {
                    previous: pair[0].value,
                    next: pair[1].value,
                });
            }
        }

        if domain.is_normalized() {
            let first = entries[0];
            if first.value > 0.0 {
                entries.insert(0, Boundary { value: 0.0, color: first.color });
            }
            let last = entries[entries.len() - 1];
            if last.value < 1.0 {
                entries.push(Boundary { value: 1.0, color: last.color });
            }
        }

        Ok(Self { direction, domain, boundaries: entries })
    }

    /// Documented fallback: a single gray boundary that rates nothing
    pub fn neutral(direction: Direction) -> Self {
        let mut boundaries = SmallVec::new();
        boundaries.push(Boundary { value: 0.0, color: NO_DATA_COLOR });
        Self {
            direction,
            domain: ScaleDomain::Absolute,
            boundaries,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn domain(&self) -> ScaleDomain {
        self.domain
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Same boundaries and domain, different severity orientation
    pub fn with_direction(&self, direction: Direction) -> Self {
        Self {
            direction,
            ..self.clone()
        }
    }

    /// Continuous color at a raw value, interpolating between the two
    /// surrounding boundaries (chart background gradients)
    pub fn gradient_at(&self, value: f64) -> Rgb {
        if !value.is_finite() {
            return NO_DATA_COLOR;
        }

        let pos = self.domain.position(value);
        let first = self.boundaries[0];
        let last = self.boundaries[self.boundaries.len() - 1];
        if pos <= first.value {
            return first.color;
        }
        if pos >= last.value {
            return last.color;
        }

        for pair in self.boundaries.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if lo.value <= pos && pos <= hi.value {
                let ratio = (pos - lo.value) / (hi.value - lo.value);
                return interpolate(lo.color, hi.color, ratio);
            }
        }

        last.color
    }
}
