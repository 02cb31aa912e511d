use crate::classifier::classify_value;
use crate::data::{Athlete, MeasurementTable, ReportValue};
use crate::report::types::*;
use crate::thresholds::{Direction, Metric, ScaleError, ScaleKey, ScaleRegistry};
use crate::utils::percentile::performance_percentile;
use anyhow::{anyhow, Result};
use rayon::prelude::*;

const INSUFFICIENT_DATA: &str = "insufficient data";

/// Builds athlete reports from a measurement table and a scale registry
pub struct ReportGenerator<'a> {
    registry: &'a ScaleRegistry,
    sex_specific_cohorts: bool,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(registry: &'a ScaleRegistry) -> Self {
        Self {
            registry,
            sex_specific_cohorts: false,
        }
    }

    /// Restrict reference cohorts to the athlete's sex as well as age category
    pub fn with_sex_specific_cohorts(mut self, enabled: bool) -> Self {
        self.sex_specific_cohorts = enabled;
        self
    }

    /// Report for one athlete
    ///
    /// Fails when the athlete is unknown, or when a scale is missing and the
    /// registry runs in strict mode.
    pub fn generate(&self, table: &MeasurementTable, athlete_id: &str) -> Result<AthleteReport> {
        let athlete = table
            .athlete(athlete_id)
            .ok_or_else(|| anyhow!("Unknown athlete: '{}'", athlete_id))?;

        let mut cards = Vec::new();
        let mut notices = Vec::new();

        for metric in table.metrics_for(athlete_id) {
            let value = ReportValue::Row(table.series(athlete_id, metric).to_vec());
            let sex = self.sex_specific_cohorts.then_some(athlete.sex);
            let cohort = table.reference_cohort_filtered(metric, athlete.category, sex);

            let card = self.metric_card(athlete, metric, &value, &cohort)?;

            if card.latest.is_none() {
                notices.push(format!("{}: latest measurement missing", card.name));
            }
            if !cohort.iter().any(|v| v.is_finite()) {
                notices.push(format!(
                    "{}: {} (no reference values for {})",
                    card.name, INSUFFICIENT_DATA, athlete.category
                ));
            }

            cards.push(card);
        }

        if cards.is_empty() {
            notices.push("No measurements recorded".to_string());
        }

        let summary = ZoneSummary::from_cards(&cards);
        tracing::debug!(
            "Report for {}: {} cards ({} optimal, {} average, {} critical)",
            athlete.id,
            cards.len(),
            summary.optimal,
            summary.average,
            summary.critical
        );

        Ok(AthleteReport {
            athlete: athlete.clone(),
            cards,
            summary,
            notices,
        })
    }

    /// Reports for every athlete in the table, sorted by athlete id
    pub fn generate_all(&self, table: &MeasurementTable) -> Vec<Result<AthleteReport>> {
        let ids: Vec<&str> = table.athletes().into_iter().map(|a| a.id.as_str()).collect();
        ids.par_iter().map(|id| self.generate(table, id)).collect()
    }

    /// Classify, rank and summarise one metric for an athlete
    ///
    /// `value` is resolved once here: a series contributes latest value,
    /// trend and history; a scalar only the latest value.
    pub fn metric_card(
        &self,
        athlete: &Athlete,
        metric: Metric,
        value: &ReportValue,
        cohort: &[f64],
    ) -> Result<MetricCard, ScaleError> {
        let key = ScaleKey::new(athlete.sex, athlete.category, metric);
        let scale = self.registry.scale_for(&key)?;

        let latest = value.latest().filter(|v| v.is_finite());
        let classification = classify_value(latest.unwrap_or(f64::NAN), scale);

        let percentile = performance_percentile(
            latest.unwrap_or(f64::NAN),
            cohort,
            metric.natural_direction(),
        );
        let band = percentile.band();
        let interpretation = band.map_or(INSUFFICIENT_DATA.to_string(), |b| b.label().to_string());

        let trend = match (latest, value.previous()) {
            (Some(current), Some(previous)) => {
                Some(trend_between(previous, current, metric.natural_direction()))
            }
            _ => None,
        };

        let history = value
            .history()
            .iter()
            .map(|p| HistoryPoint {
                date: p.date,
                value: Some(p.value).filter(|v| v.is_finite()),
                color: classify_value(p.value, scale).color,
            })
            .collect();

        Ok(MetricCard {
            metric,
            name: metric.display_name().to_string(),
            unit: metric.unit().to_string(),
            latest,
            latest_date: value.latest_date(),
            color: classification.color,
            zone: classification.zone,
            percentile,
            band,
            interpretation,
            trend,
            history,
        })
    }
}

fn trend_between(previous: f64, current: f64, direction: Direction) -> Trend {
    let change = current - previous;
    let trend_direction = if change.abs() < f64::EPSILON {
        TrendDirection::Unchanged
    } else {
        let better = match direction {
            Direction::Ascending => change < 0.0,
            Direction::Descending => change > 0.0,
        };
        if better {
            TrendDirection::Improved
        } else {
            TrendDirection::Declined
        }
    };

    Trend {
        previous,
        change,
        direction: trend_direction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Zone;
    use crate::data::{Measurement, SeriesPoint};
    use crate::thresholds::{AgeCategory, FallbackPolicy, Sex};
    use crate::utils::color::{Rgb, NO_DATA_COLOR};
    use crate::utils::percentile::{Percentile, PercentileBand};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    const REGISTRY_JSON: &str = r#"{ "scales": [
        { "metric": "cmj",
          "boundaries": [[20, "red"], [25, "orange"], [30, "green"]] },
        { "metric": "sprint_40m", "sex": "H", "category": "cadete",
          "domain": { "kind": "range", "min": 4.4, "max": 6.3 },
          "boundaries": [[0.0, "green"], [0.35, "darkgreen"], [0.55, "yellow"],
                         [0.75, "orange"], [1.0, "red"]] }
    ] }"#;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, month, day).unwrap()
    }

    fn athlete(id: &str, sex: Sex, category: AgeCategory) -> Athlete {
        Athlete {
            id: id.to_string(),
            name: format!("Athlete {}", id),
            sex,
            category,
        }
    }

    fn measurement(id: &str, metric: Metric, d: NaiveDate, value: f64) -> Measurement {
        Measurement {
            athlete_id: id.to_string(),
            metric,
            date: d,
            value,
        }
    }

    fn sample_table() -> MeasurementTable {
        let athletes = vec![
            athlete("p1", Sex::H, AgeCategory::Cadete),
            athlete("p2", Sex::H, AgeCategory::Cadete),
            athlete("p3", Sex::M, AgeCategory::Cadete),
            athlete("p4", Sex::H, AgeCategory::Cadete),
            athlete("p5", Sex::H, AgeCategory::Cadete),
            athlete("j1", Sex::H, AgeCategory::Juvenil),
        ];
        let measurements = vec![
            measurement("p1", Metric::Cmj, date(1, 10), 26.0),
            measurement("p1", Metric::Cmj, date(5, 10), 32.0),
            measurement("p1", Metric::Sprint40m, date(5, 10), 5.2),
            measurement("p1", Metric::YoyoIr1, date(5, 10), 1200.0),
            measurement("p2", Metric::Cmj, date(5, 10), 10.0),
            measurement("p3", Metric::Cmj, date(5, 10), 12.0),
            measurement("p4", Metric::Cmj, date(5, 10), 18.0),
            measurement("p5", Metric::Cmj, date(5, 10), 14.0),
            measurement("j1", Metric::Sprint40m, date(5, 10), f64::NAN),
        ];
        MeasurementTable::from_measurements(athletes, measurements)
    }

    #[test]
    fn test_generate_report_classifies_and_ranks() {
        let registry = ScaleRegistry::from_json_str(REGISTRY_JSON, FallbackPolicy::Lenient).unwrap();
        let generator = ReportGenerator::new(&registry);
        let report = generator.generate(&sample_table(), "p1").unwrap();

        assert_eq!(report.cards.len(), 3);
        let cmj = &report.cards[0];
        assert_eq!(cmj.metric, Metric::Cmj);
        assert_eq!(cmj.color, Rgb::named("green").unwrap());
        assert_eq!(cmj.zone, Zone::Optimal);
        assert_eq!(cmj.latest, Some(32.0));
        assert_eq!(cmj.latest_date, Some(date(5, 10)));
        // Best of five cadete jumps: (80 + 100) / 2
        assert_relative_eq!(cmj.percentile.value().unwrap(), 90.0, epsilon = 1e-9);
        assert_eq!(cmj.band, Some(PercentileBand::WellAboveAverage));

        let trend = cmj.trend.unwrap();
        assert_relative_eq!(trend.change, 6.0, epsilon = 1e-9);
        assert_eq!(trend.direction, TrendDirection::Improved);
        assert_eq!(cmj.history.len(), 2);
        assert_eq!(cmj.history[0].color, Rgb::named("orange").unwrap());

        // Yo-Yo has no configured scale: lenient registry falls back to gray
        let yoyo = &report.cards[2];
        assert_eq!(yoyo.metric, Metric::YoyoIr1);
        assert_eq!(yoyo.color, NO_DATA_COLOR);
        assert_eq!(yoyo.zone, Zone::NoData);

        assert_eq!(report.summary.total(), 3);
        assert_eq!(report.summary.optimal, 1);
    }

    #[test]
    fn test_sex_specific_cohorts_shrink_reference() {
        let registry = ScaleRegistry::from_json_str(REGISTRY_JSON, FallbackPolicy::Lenient).unwrap();
        let generator = ReportGenerator::new(&registry).with_sex_specific_cohorts(true);
        let report = generator.generate(&sample_table(), "p3").unwrap();

        let cmj = &report.cards[0];
        // Only athlete in the female cadete cohort
        assert_relative_eq!(cmj.percentile.value().unwrap(), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_latest_value_reports_notices() {
        let registry = ScaleRegistry::from_json_str(REGISTRY_JSON, FallbackPolicy::Lenient).unwrap();
        let report = ReportGenerator::new(&registry)
            .generate(&sample_table(), "j1")
            .unwrap();

        let sprint = &report.cards[0];
        assert_eq!(sprint.zone, Zone::NoData);
        assert_eq!(sprint.color, NO_DATA_COLOR);
        assert_eq!(sprint.percentile, Percentile::InsufficientData);
        assert_eq!(sprint.interpretation, "insufficient data");
        assert_eq!(report.notices.len(), 2);
    }

    #[test]
    fn test_strict_registry_fails_on_missing_scale() {
        let registry = ScaleRegistry::from_json_str(REGISTRY_JSON, FallbackPolicy::Strict).unwrap();
        let generator = ReportGenerator::new(&registry);
        assert!(generator.generate(&sample_table(), "p1").is_err());
        assert!(generator.generate(&sample_table(), "p2").is_ok());
    }

    #[test]
    fn test_unknown_athlete_is_an_error() {
        let registry = ScaleRegistry::new(FallbackPolicy::Lenient);
        let err = ReportGenerator::new(&registry)
            .generate(&sample_table(), "nobody")
            .unwrap_err();
        assert!(err.to_string().contains("Unknown athlete"));
    }

    #[test]
    fn test_generate_all_is_sorted_by_athlete() {
        let registry = ScaleRegistry::from_json_str(REGISTRY_JSON, FallbackPolicy::Lenient).unwrap();
        let reports = ReportGenerator::new(&registry).generate_all(&sample_table());
        let ids: Vec<String> = reports
            .into_iter()
            .map(|r| r.unwrap().athlete.id)
            .collect();
        assert_eq!(ids, vec!["j1", "p1", "p2", "p3", "p4", "p5"]);
    }

    #[test]
    fn test_scalar_value_has_no_trend_or_history() {
        let registry = ScaleRegistry::from_json_str(REGISTRY_JSON, FallbackPolicy::Lenient).unwrap();
        let generator = ReportGenerator::new(&registry);
        let subject = athlete("x", Sex::H, AgeCategory::Cadete);

        let card = generator
            .metric_card(&subject, Metric::Sprint40m, &ReportValue::Scalar(6.3), &[5.0, 5.5, 6.0])
            .unwrap();
        assert_eq!(card.color, Rgb::named("red").unwrap());
        assert_eq!(card.zone, Zone::Critical);
        assert!(card.trend.is_none());
        assert!(card.history.is_empty());
        // Slowest time: lower is better, so the rank is inverted
        assert_relative_eq!(card.percentile.value().unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_trend_respects_direction() {
        let faster = trend_between(5.4, 5.1, Direction::Ascending);
        assert_eq!(faster.direction, TrendDirection::Improved);
        let lower_jump = trend_between(30.0, 28.0, Direction::Descending);
        assert_eq!(lower_jump.direction, TrendDirection::Declined);
        let same = trend_between(30.0, 30.0, Direction::Descending);
        assert_eq!(same.direction, TrendDirection::Unchanged);
    }

    #[test]
    fn test_history_points_classified_individually() {
        let registry = ScaleRegistry::from_json_str(REGISTRY_JSON, FallbackPolicy::Lenient).unwrap();
        let generator = ReportGenerator::new(&registry);
        let subject = athlete("x", Sex::M, AgeCategory::Juvenil);
        let series = ReportValue::Row(vec![
            SeriesPoint { date: date(1, 1), value: 18.0 },
            SeriesPoint { date: date(2, 1), value: f64::NAN },
            SeriesPoint { date: date(3, 1), value: 27.0 },
        ]);

        let card = generator.metric_card(&subject, Metric::Cmj, &series, &[]).unwrap();
        let colors: Vec<Rgb> = card.history.iter().map(|h| h.color).collect();
        assert_eq!(
            colors,
            vec![Rgb::named("red").unwrap(), NO_DATA_COLOR, Rgb::named("orange").unwrap()]
        );
        let values: Vec<Option<f64>> = card.history.iter().map(|h| h.value).collect();
        assert_eq!(values, vec![Some(18.0), None, Some(27.0)]);
        assert_eq!(card.trend.unwrap().previous, 18.0);
        assert_eq!(card.percentile, Percentile::InsufficientData);
    }

    #[test]
    fn test_missing_latest_with_populated_cohort_only_flags_measurement() {
        let registry = ScaleRegistry::from_json_str(REGISTRY_JSON, FallbackPolicy::Lenient).unwrap();
        let table = MeasurementTable::from_measurements(
            vec![
                athlete("c1", Sex::H, AgeCategory::Cadete),
                athlete("c2", Sex::H, AgeCategory::Cadete),
                athlete("c3", Sex::H, AgeCategory::Cadete),
            ],
            vec![
                measurement("c1", Metric::Cmj, date(1, 10), 30.0),
                measurement("c1", Metric::Cmj, date(5, 10), f64::NAN),
                measurement("c2", Metric::Cmj, date(5, 10), 25.0),
                measurement("c3", Metric::Cmj, date(5, 10), 35.0),
            ],
        );
        assert_eq!(table.reference_cohort(Metric::Cmj, AgeCategory::Cadete).len(), 3);

        let report = ReportGenerator::new(&registry).generate(&table, "c1").unwrap();
        let cmj = &report.cards[0];
        assert_eq!(cmj.latest, None);
        assert_eq!(cmj.zone, Zone::NoData);
        assert_eq!(cmj.percentile, Percentile::InsufficientData);
        assert!(cmj.trend.is_none());
        assert_eq!(
            report.notices,
            vec!["Countermovement Jump: latest measurement missing".to_string()]
        );
    }
}
