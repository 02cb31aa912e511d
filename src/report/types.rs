use crate::classifier::Zone;
use crate::data::Athlete;
use crate::thresholds::Metric;
use crate::utils::color::Rgb;
use crate::utils::percentile::{Percentile, PercentileBand};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Complete printable report for one athlete
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthleteReport {
    pub athlete: Athlete,
    pub cards: Vec<MetricCard>,
    pub summary: ZoneSummary,
    /// User-facing notices ("insufficient data", missing measurements)
    pub notices: Vec<String>,
}

/// One metric block of the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricCard {
    pub metric: Metric,
    pub name: String,                    // "Sprint 40 m"
    pub unit: String,                    // "s"
    /// `None` when the most recent cell was empty or unreadable
    pub latest: Option<f64>,
    pub latest_date: Option<NaiveDate>,
    pub color: Rgb,
    pub zone: Zone,
    pub percentile: Percentile,
    pub band: Option<PercentileBand>,
    pub interpretation: String,          // band label or "insufficient data"
    pub trend: Option<Trend>,
    pub history: Vec<HistoryPoint>,
}

/// Change versus the previous measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub previous: f64,
    pub change: f64,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improved,
    Declined,
    Unchanged,
}

impl TrendDirection {
    pub fn arrow(&self) -> &'static str {
        match self {
            TrendDirection::Improved => "▲",
            TrendDirection::Declined => "▼",
            TrendDirection::Unchanged => "=",
        }
    }
}

/// Classified historical point for evolution charts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    /// `None` for an empty or unreadable cell
    pub value: Option<f64>,
    pub color: Rgb,
}

/// Count of cards per zone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSummary {
    pub optimal: usize,
    pub average: usize,
    pub critical: usize,
    pub no_data: usize,
}

impl ZoneSummary {
    pub fn from_cards(cards: &[MetricCard]) -> Self {
        let mut summary = Self::default();
        for card in cards {
            match card.zone {
                Zone::Optimal => summary.optimal += 1,
                Zone::Average => summary.average += 1,
                Zone::Critical => summary.critical += 1,
                Zone::NoData => summary.no_data += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.optimal + self.average + self.critical + self.no_data
    }
}
