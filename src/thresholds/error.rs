//! Threshold configuration errors

use super::types::ScaleKey;
use crate::utils::color::ColorError;
use thiserror::Error;

/// Errors raised while building or looking up threshold scales
#[derive(Debug, Error)]
pub enum ScaleError {
    /// A scale needs at least one boundary
    #[error("Scale has no boundaries")]
    Empty,

    /// Boundary is NaN or infinite
    #[error("Boundary value {0} is not finite")]
    NonFinite(f64),

    /// Boundaries must be strictly increasing
    #[error("Boundaries not strictly increasing: {previous} followed by {next}")]
    NotIncreasing { previous: f64, next: f64 },

    /// Normalized scales only accept ratios in [0, 1]
    #[error("Ratio boundary {0} outside [0, 1]")]
    RatioOutOfRange(f64),

    /// Range or difference parameters are unusable
    #[error("Invalid scale domain: {0}")]
    InvalidDomain(String),

    /// Color could not be parsed
    #[error("Invalid color: {0}")]
    Color(#[from] ColorError),

    /// Two entries share the same selector
    #[error("Duplicate scale for {0}")]
    Duplicate(String),

    /// Wraps an error with the position of the offending configuration entry
    #[error("Scale entry #{index} ({metric}): {source}")]
    Entry {
        index: usize,
        metric: String,
        #[source]
        source: Box<ScaleError>,
    },

    /// Configuration JSON is malformed
    #[error("Failed to parse threshold configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// No scale configured and the registry runs in strict mode
    #[error("No threshold scale configured for {0}")]
    MissingScale(ScaleKey),
}
