//! Athlete Performance Dashboard
//!
//! Core of a fitness-testing dashboard for youth athletes: semaphore
//! classification of test results against sex / age-category scales, peer
//! percentiles, and printable per-athlete reports.
//!
//! - `utils/`: color interpolation, percentile ranking, polars helpers
//! - `thresholds/`: typed scale registry loaded from JSON
//! - `classifier`: value to color and zone
//! - `data`: measurement table loaded with Polars
//! - `cache`: TTL cache of loaded tables
//! - `report/`: report assembly and Markdown / JSON / HTML formatters
//! - `config`: environment configuration for the report binary

pub mod utils;
pub mod thresholds;
pub mod classifier;
pub mod data;
pub mod cache;
pub mod report;
pub mod config;

// Re-export commonly used types
pub use utils::{interpolate, percentile_of_score, performance_percentile, Percentile, PercentileBand, Rgb, NO_DATA_COLOR};
pub use thresholds::{
    AgeCategory, Direction, FallbackPolicy, Metric, ScaleDomain, ScaleError, ScaleKey,
    ScaleRegistry, Sex, ThresholdScale,
};
pub use classifier::{classify, classify_difference, classify_value, Classification, Zone};
pub use data::{Athlete, Measurement, MeasurementTable, ReportValue, SeriesPoint};
pub use cache::DatasetCache;
pub use report::{AthleteReport, OutputFormat, ReportGenerator};
pub use config::{AppConfig, ConfigError};
