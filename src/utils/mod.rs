//! Shared utilities
//!
//! - Color: RGB parsing and linear interpolation
//! - Percentile: percentile-of-score ranking against a cohort
//! - Frame helpers: typed column selection with validation

pub mod color;
pub mod percentile;
pub mod frame_helpers;

// Re-export commonly used types
pub use color::{interpolate, interpolate_str, ColorError, Rgb, NO_DATA_COLOR};
pub use percentile::{percentile_of_score, performance_percentile, Percentile, PercentileBand};
pub use frame_helpers::select_typed;
