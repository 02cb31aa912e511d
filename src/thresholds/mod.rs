//! Semaphore threshold scales
//!
//! - `types`: scale keys, directions, domains and the validated scale itself
//! - `registry`: JSON-backed lookup with an explicit fallback policy
//! - `error`: configuration and lookup errors

pub mod error;
pub mod registry;
pub mod types;

pub use error::ScaleError;
pub use registry::{FallbackPolicy, ScaleRegistry};
pub use types::{
    AgeCategory, Boundary, Direction, Metric, ScaleDomain, ScaleKey, Sex, ThresholdScale,
    DIFFERENCE_RATIO_MAX,
};
