use crate::report::types::AthleteReport;
use serde_json;

/// JSON formatter for athlete reports
pub struct JsonFormatter;

impl JsonFormatter {
    /// Format report as pretty-printed JSON
    pub fn format(report: &AthleteReport) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(report)
    }

    /// Format report as compact JSON (no whitespace)
    pub fn format_compact(report: &AthleteReport) -> Result<String, serde_json::Error> {
        serde_json::to_string(report)
    }

    /// Format several reports as one JSON array
    pub fn format_many(reports: &[AthleteReport]) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(reports)
    }
}
