//! Athlete Report Assembly
//!
//! Turns a measurement table into per-athlete reports: one card per metric
//! with its semaphore color, zone, peer percentile and trend, plus a zone
//! summary. Formatters render reports as Markdown, JSON or HTML.

pub mod types;
pub mod generator;
pub mod formatters;

pub use types::{AthleteReport, HistoryPoint, MetricCard, Trend, TrendDirection, ZoneSummary};
pub use generator::ReportGenerator;
pub use formatters::{HtmlFormatter, JsonFormatter, MarkdownFormatter, OutputFormat};
