//! Data Loading and Management
//!
//! Loads the long-format measurement table exported from the test
//! spreadsheets and serves per-athlete time series and reference cohorts.
//!
//! Expected columns: `athlete_id, name, sex, category, metric, date, value`.
//! One row per athlete, metric and test date.

use crate::thresholds::{AgeCategory, Metric, Sex};
use crate::utils::frame_helpers::select_typed;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Date formats seen in the spreadsheet exports
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Athlete identity as recorded in the measurement rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Athlete {
    pub id: String,
    pub name: String,
    pub sex: Sex,
    pub category: AgeCategory,
}

/// A single test result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub athlete_id: String,
    pub metric: Metric,
    pub date: NaiveDate,
    /// NaN when the spreadsheet cell was empty or unreadable
    pub value: f64,
}

/// `(date, value)` pair of a time series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Report input: either a dated series or a single value entered by hand
#[derive(Debug, Clone, PartialEq)]
pub enum ReportValue {
    Row(Vec<SeriesPoint>),
    Scalar(f64),
}

impl ReportValue {
    /// Most recent value (may be NaN when the last cell was empty)
    pub fn latest(&self) -> Option<f64> {
        match self {
            ReportValue::Row(points) => points.last().map(|p| p.value),
            ReportValue::Scalar(v) => Some(*v),
        }
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        match self {
            ReportValue::Row(points) => points.last().map(|p| p.date),
            ReportValue::Scalar(_) => None,
        }
    }

    /// Last finite value before the most recent point
    pub fn previous(&self) -> Option<f64> {
        match self {
            ReportValue::Row(points) if points.len() > 1 => points[..points.len() - 1]
                .iter()
                .rev()
                .map(|p| p.value)
                .find(|v| v.is_finite()),
            _ => None,
        }
    }

    pub fn history(&self) -> &[SeriesPoint] {
        match self {
            ReportValue::Row(points) => points,
            ReportValue::Scalar(_) => &[],
        }
    }
}

/// In-memory measurement table indexed by athlete and metric
#[derive(Debug, Clone, Default)]
pub struct MeasurementTable {
    athletes: FxHashMap<String, Athlete>,
    /// Series sorted by date
    series: FxHashMap<(String, Metric), Vec<SeriesPoint>>,
    rows: usize,
    skipped_rows: usize,
}

impl MeasurementTable {
    /// Build from already-typed athletes and measurements
    pub fn from_measurements(athletes: Vec<Athlete>, measurements: Vec<Measurement>) -> Self {
        let mut table = Self::default();
        for athlete in athletes {
            table.athletes.entry(athlete.id.clone()).or_insert(athlete);
        }
        for m in measurements {
            table.push(m.athlete_id, m.metric, m.date, m.value);
        }
        table.sort_series();
        table
    }

    /// Load from a CSV export
    pub fn from_csv(path: &Path) -> Result<Self> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .with_context(|| format!("Failed to create CSV reader: {:?}", path))?
            .finish()
            .with_context(|| format!("Failed to load measurements CSV: {:?}", path))?;

        let table = Self::from_dataframe(&df)?;
        tracing::debug!(
            "Loaded {} measurements for {} athletes from {:?} ({} rows skipped)",
            table.rows,
            table.athletes.len(),
            path,
            table.skipped_rows
        );
        Ok(table)
    }

    /// Build from a DataFrame with the expected columns
    ///
    /// Rows with an unknown metric, sex, category or date are skipped with a
    /// warning. Null values are kept as NaN measurements.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let columns = [
            ("athlete_id", DataType::String),
            ("name", DataType::String),
            ("sex", DataType::String),
            ("category", DataType::String),
            ("metric", DataType::String),
            ("date", DataType::String),
            ("value", DataType::Float64),
        ];
        let df = select_typed(df, &columns, "measurements")?;

        let ids = df.column("athlete_id")?.str()?;
        let names = df.column("name")?.str()?;
        let sexes = df.column("sex")?.str()?;
        let categories = df.column("category")?.str()?;
        let metrics = df.column("metric")?.str()?;
        let dates = df.column("date")?.str()?;
        let values = df.column("value")?.f64()?;

        let mut table = Self::default();

        for i in 0..df.height() {
            let parsed = Self::parse_row(
                ids.get(i),
                names.get(i),
                sexes.get(i),
                categories.get(i),
                metrics.get(i),
                dates.get(i),
            );

            let (athlete, metric, date) = match parsed {
                Ok(row) => row,
                Err(reason) => {
                    tracing::warn!("Skipping measurement row {}: {}", i, reason);
                    table.skipped_rows += 1;
                    continue;
                }
            };

            let value = values.get(i).unwrap_or(f64::NAN);
            let athlete_id = athlete.id.clone();

            match table.athletes.get(&athlete_id) {
                Some(known) if known.sex != athlete.sex || known.category != athlete.category => {
                    tracing::warn!(
                        "Athlete {} has conflicting sex/category on row {}; keeping first",
                        athlete_id,
                        i
                    );
                }
                Some(_) => {}
                None => {
                    table.athletes.insert(athlete_id.clone(), athlete);
                }
            }

            table.push(athlete_id, metric, date, value);
        }

        table.sort_series();
        Ok(table)
    }

    fn parse_row(
        id: Option<&str>,
        name: Option<&str>,
        sex: Option<&str>,
        category: Option<&str>,
        metric: Option<&str>,
        date: Option<&str>,
    ) -> std::result::Result<(Athlete, Metric, NaiveDate), String> {
        let id = id
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or("missing athlete_id")?;
        let sex: Sex = sex.ok_or("missing sex")?.parse()?;
        let category: AgeCategory = category.ok_or("missing category")?.parse()?;
        let metric: Metric = metric.ok_or("missing metric")?.parse()?;
        let date_raw = date.ok_or("missing date")?;
        let date = parse_date(date_raw).ok_or_else(|| format!("Unreadable date: '{}'", date_raw))?;

        let athlete = Athlete {
            id: id.to_string(),
            name: name.map(str::trim).unwrap_or(id).to_string(),
            sex,
            category,
        };
        Ok((athlete, metric, date))
    }

    fn push(&mut self, athlete_id: String, metric: Metric, date: NaiveDate, value: f64) {
        self.series
            .entry((athlete_id, metric))
            .or_default()
            .push(SeriesPoint { date, value });
        self.rows += 1;
    }

    fn sort_series(&mut self) {
        for points in self.series.values_mut() {
            points.sort_by_key(|p| p.date);
        }
    }

    /// Number of measurements kept
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn athlete(&self, id: &str) -> Option<&Athlete> {
        self.athletes.get(id)
    }

    /// All athletes sorted by id
    pub fn athletes(&self) -> Vec<&Athlete> {
        let mut athletes: Vec<&Athlete> = self.athletes.values().collect();
        athletes.sort_by(|a, b| a.id.cmp(&b.id));
        athletes
    }

    /// Time-ordered series for one athlete and metric (empty if none)
    pub fn series(&self, athlete_id: &str, metric: Metric) -> &[SeriesPoint] {
        self.series
            .get(&(athlete_id.to_string(), metric))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Metrics with at least one measurement for the athlete, in report order
    pub fn metrics_for(&self, athlete_id: &str) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| !self.series(athlete_id, *m).is_empty())
            .collect()
    }

    /// Most recent finite value of a metric for an athlete
    pub fn latest_value(&self, athlete_id: &str, metric: Metric) -> Option<f64> {
        self.series(athlete_id, metric)
            .iter()
            .rev()
            .map(|p| p.value)
            .find(|v| v.is_finite())
    }

    /// Latest finite value of every athlete in the age category
    pub fn reference_cohort(&self, metric: Metric, category: AgeCategory) -> Vec<f64> {
        self.reference_cohort_filtered(metric, category, None)
    }

    /// Reference cohort optionally restricted to one sex
    ///
    /// Each athlete contributes their most recent finite value, so an athlete
    /// whose latest cell is empty still counts with an older result. The
    /// subject of a report is part of their own cohort.
    pub fn reference_cohort_filtered(
        &self,
        metric: Metric,
        category: AgeCategory,
        sex: Option<Sex>,
    ) -> Vec<f64> {
        self.athletes()
            .into_iter()
            .filter(|a| a.category == category)
            .filter(|a| sex.map_or(true, |s| a.sex == s))
            .filter_map(|a| self.latest_value(&a.id, metric))
            .collect()
    }
}

/// Parse a spreadsheet date (`2024-03-18` or `18/03/2024`)
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}
