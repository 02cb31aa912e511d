pub mod markdown;
pub mod json;
pub mod html;

pub use markdown::MarkdownFormatter;
pub use json::JsonFormatter;
pub use html::HtmlFormatter;

use crate::report::types::{AthleteReport, MetricCard};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
    Html,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "md",
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
        }
    }

    /// Output file name for an athlete's report
    ///
    /// `None` when the id is not a single plain path component (empty, `.`,
    /// `..`, or containing a path separator).
    pub fn file_name(&self, athlete_id: &str) -> Option<String> {
        let mut components = Path::new(athlete_id).components();
        let plain = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !plain || athlete_id.contains(['/', '\\']) {
            return None;
        }
        Some(format!("{}.{}", athlete_id, self.extension()))
    }

    /// Render a report in this format
    pub fn render(&self, report: &AthleteReport) -> Result<String, serde_json::Error> {
        match self {
            OutputFormat::Markdown => Ok(MarkdownFormatter::format(report)),
            OutputFormat::Json => JsonFormatter::format(report),
            OutputFormat::Html => Ok(HtmlFormatter::format(report)),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            other => Err(format!("Unknown report format: '{}'", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Json => "json",
            OutputFormat::Html => "html",
        };
        f.write_str(name)
    }
}

/// Latest value with unit, or a dash when missing
pub(crate) fn value_text(card: &MetricCard) -> String {
    match card.latest {
        Some(v) => format!("{:.2} {}", v, card.unit),
        None => "–".to_string(),
    }
}

pub(crate) fn percentile_text(card: &MetricCard) -> String {
    match card.percentile.value() {
        Some(p) => format!("P{:.0}", p),
        None => "–".to_string(),
    }
}

pub(crate) fn trend_text(card: &MetricCard) -> String {
    match &card.trend {
        Some(t) => format!("{} {:+.2}", t.direction.arrow(), t.change),
        None => "–".to_string(),
    }
}

#[cfg(test)]
pub(crate) fn sample_report() -> AthleteReport {
    use crate::classifier::Zone;
    use crate::data::Athlete;
    use crate::report::types::*;
    use crate::thresholds::{AgeCategory, Metric, Sex};
    use crate::utils::color::{Rgb, NO_DATA_COLOR};
    use crate::utils::percentile::{Percentile, PercentileBand};
    use chrono::NaiveDate;

    let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
    let cards = vec![
        MetricCard {
            metric: Metric::Cmj,
            name: "Countermovement Jump".to_string(),
            unit: "cm".to_string(),
            latest: Some(32.0),
            latest_date: Some(d(5, 10)),
            color: Rgb::new(0, 128, 0),
            zone: Zone::Optimal,
            percentile: Percentile::Ranked(90.0),
            band: Some(PercentileBand::WellAboveAverage),
            interpretation: "well above average".to_string(),
            trend: Some(Trend {
                previous: 26.0,
                change: 6.0,
                direction: TrendDirection::Improved,
            }),
            history: vec![
                HistoryPoint { date: d(1, 10), value: Some(26.0), color: Rgb::new(255, 165, 0) },
                HistoryPoint { date: d(3, 12), value: None, color: NO_DATA_COLOR },
                HistoryPoint { date: d(5, 10), value: Some(32.0), color: Rgb::new(0, 128, 0) },
            ],
        },
        MetricCard {
            metric: Metric::YoyoIr1,
            name: "Yo-Yo IR1".to_string(),
            unit: "m".to_string(),
            latest: None,
            latest_date: Some(d(5, 10)),
            color: NO_DATA_COLOR,
            zone: Zone::NoData,
            percentile: Percentile::InsufficientData,
            band: None,
            interpretation: "insufficient data".to_string(),
            trend: None,
            history: vec![],
        },
    ];
    let summary = ZoneSummary::from_cards(&cards);

    AthleteReport {
        athlete: Athlete {
            id: "p1".to_string(),
            name: "Lucía <Captain>".to_string(),
            sex: Sex::M,
            category: AgeCategory::Cadete,
        },
        cards,
        summary,
        notices: vec!["Yo-Yo IR1: latest measurement missing".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!(" JSON ".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("html".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert!("pdf".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default().extension(), "md");
        assert_eq!(OutputFormat::Html.to_string(), "html");
    }

    #[test]
    fn test_file_name_rejects_path_like_ids() {
        assert_eq!(OutputFormat::Html.file_name("c01").as_deref(), Some("c01.html"));
        assert_eq!(OutputFormat::Json.file_name("ana.m").as_deref(), Some("ana.m.json"));

        for id in ["", ".", "..", "../escape", "a/b", "/etc/passwd", "a\\b"] {
            assert_eq!(OutputFormat::Markdown.file_name(id), None, "accepted {:?}", id);
        }
    }
}
