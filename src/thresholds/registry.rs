//! Threshold Scale Registry
//!
//! Loads semaphore scales from JSON, validates every entry at load time and
//! resolves `(sex, category, metric)` lookups.
//!
//! Configuration format:
//! ```json
//! { "scales": [
//!     { "metric": "sprint_40m", "sex": "H", "category": "cadete",
//!       "domain": { "kind": "range", "min": 4.4, "max": 6.3 },
//!       "boundaries": [[0.0, "green"], [0.35, "darkgreen"], [1.0, "red"]] }
//! ] }
//! ```
//! `sex` and `category` may be omitted to cover every value of that field.
//! `direction` defaults to the metric's natural direction and `domain` to
//! `absolute`.

use super::error::ScaleError;
use super::types::{AgeCategory, Direction, Metric, ScaleDomain, ScaleKey, Sex, ThresholdScale};
use crate::utils::color::{ColorSpec, Rgb};
use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const BUILTIN_THRESHOLDS: &str = include_str!("../../data/default_thresholds.json");

/// What to do when no scale matches a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Substitute the neutral gray scale and log a warning
    #[default]
    Lenient,
    /// Fail the lookup with [`ScaleError::MissingScale`]
    Strict,
}

/// Entry selector; `None` fields match any value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ScaleSelector {
    metric: Metric,
    sex: Option<Sex>,
    category: Option<AgeCategory>,
}

impl ScaleSelector {
    fn describe(&self) -> String {
        let sex = self.sex.map_or("*".to_string(), |s| s.to_string());
        let category = self.category.map_or("*".to_string(), |c| c.to_string());
        format!("({}, {}, {})", sex, category, self.metric)
    }
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    scales: Vec<ScaleEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScaleEntry {
    metric: Metric,
    #[serde(default)]
    sex: Option<Sex>,
    #[serde(default)]
    category: Option<AgeCategory>,
    #[serde(default)]
    direction: Option<Direction>,
    #[serde(default)]
    domain: ScaleDomain,
    boundaries: Vec<(f64, ColorSpec)>,
}

impl ScaleEntry {
    fn build(self) -> Result<(ScaleSelector, ThresholdScale), ScaleError> {
        let boundaries = self
            .boundaries
            .into_iter()
            .map(|(value, spec)| Ok((value, Rgb::try_from(spec)?)))
            .collect::<Result<Vec<(f64, Rgb)>, ScaleError>>()?;

        let direction = self.direction.unwrap_or_else(|| self.metric.natural_direction());
        let scale = ThresholdScale::new(direction, self.domain, boundaries)?;

        let selector = ScaleSelector {
            metric: self.metric,
            sex: self.sex,
            category: self.category,
        };
        Ok((selector, scale))
    }
}

/// Immutable lookup table of semaphore scales
#[derive(Debug, Clone)]
pub struct ScaleRegistry {
    scales: FxHashMap<ScaleSelector, ThresholdScale>,
    policy: FallbackPolicy,
    neutral_ascending: ThresholdScale,
    neutral_descending: ThresholdScale,
}

impl ScaleRegistry {
    /// Empty registry; every lookup falls back according to `policy`
    pub fn new(policy: FallbackPolicy) -> Self {
        Self {
            scales: FxHashMap::default(),
            policy,
            neutral_ascending: ThresholdScale::neutral(Direction::Ascending),
            neutral_descending: ThresholdScale::neutral(Direction::Descending),
        }
    }

    /// Scales shipped with the crate (`data/default_thresholds.json`)
    pub fn builtin(policy: FallbackPolicy) -> Result<Self, ScaleError> {
        Self::from_json_str(BUILTIN_THRESHOLDS, policy)
    }

    /// Load and validate a registry from a JSON file
    pub fn load(path: &Path, policy: FallbackPolicy) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read threshold file: {:?}", path))?;

        let registry = Self::from_json_str(&contents, policy)
            .with_context(|| format!("Invalid threshold file: {:?}", path))?;

        tracing::debug!("Loaded {} threshold scales from {:?}", registry.len(), path);
        Ok(registry)
    }

    /// Parse and validate a registry; any malformed entry rejects the whole file
    pub fn from_json_str(json: &str, policy: FallbackPolicy) -> Result<Self, ScaleError> {
        let file: RegistryFile = serde_json::from_str(json)?;
        let mut registry = Self::new(policy);

        for (index, entry) in file.scales.into_iter().enumerate() {
            let metric = entry.metric.code().to_string();
            let (selector, scale) = entry.build().map_err(|source| ScaleError::Entry {
                index,
                metric: metric.clone(),
                source: Box::new(source),
            })?;

            registry.insert_selector(selector, scale).map_err(|source| ScaleError::Entry {
                index,
                metric,
                source: Box::new(source),
            })?;
        }

        Ok(registry)
    }

    /// Register a scale; `None` for `sex` / `category` matches any value
    pub fn insert(
        &mut self,
        metric: Metric,
        sex: Option<Sex>,
        category: Option<AgeCategory>,
        scale: ThresholdScale,
    ) -> Result<(), ScaleError> {
        self.insert_selector(ScaleSelector { metric, sex, category }, scale)
    }

    fn insert_selector(&mut self, selector: ScaleSelector, scale: ThresholdScale) -> Result<(), ScaleError> {
        if self.scales.contains_key(&selector) {
            return Err(ScaleError::Duplicate(selector.describe()));
        }
        self.scales.insert(selector, scale);
        Ok(())
    }

    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.scales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }

    /// Most specific configured scale, without fallback
    ///
    /// Order: exact, then sex-only, then category-only, then metric-wide.
    pub fn lookup(&self, key: &ScaleKey) -> Option<&ThresholdScale> {
        let candidates = [
            (Some(key.sex), Some(key.category)),
            (Some(key.sex), None),
            (None, Some(key.category)),
            (None, None),
        ];

        candidates.into_iter().find_map(|(sex, category)| {
            self.scales.get(&ScaleSelector {
                metric: key.metric,
                sex,
                category,
            })
        })
    }

    /// Scale for a key, applying the fallback policy when nothing matches
    pub fn scale_for(&self, key: &ScaleKey) -> Result<&ThresholdScale, ScaleError> {
        if let Some(scale) = self.lookup(key) {
            return Ok(scale);
        }

        match self.policy {
            FallbackPolicy::Strict => Err(ScaleError::MissingScale(*key)),
            FallbackPolicy::Lenient => {
                tracing::warn!("No threshold scale for {}; using neutral scale", key);
                Ok(match key.metric.natural_direction() {
                    Direction::Ascending => &self.neutral_ascending,
                    Direction::Descending => &self.neutral_descending,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::color::NO_DATA_COLOR;

    const SPRINT_JSON: &str = r##"{
        "scales": [
            { "metric": "sprint_40m", "sex": "H", "category": "cadete",
              "domain": { "kind": "range", "min": 4.4, "max": 6.3 },
              "boundaries": [[0.0, "green"], [0.35, "darkgreen"], [0.55, "yellow"],
                             [0.75, "orange"], [1.0, "red"]] },
            { "metric": "sprint_40m", "sex": "H",
              "domain": { "kind": "range", "min": 4.2, "max": 6.0 },
              "boundaries": [[0.0, "#1a9641"], [1.0, [215, 25, 28]]] },
            { "metric": "cmj",
              "boundaries": [[20, "red"], [25, "orange"], [30, "green"]] }
        ]
    }"##;

    fn key(sex: Sex, category: AgeCategory, metric: Metric) -> ScaleKey {
        ScaleKey::new(sex, category, metric)
    }

    #[test]
    fn test_lookup_prefers_most_specific_entry() {
        let registry = ScaleRegistry::from_json_str(SPRINT_JSON, FallbackPolicy::Strict).unwrap();
        assert_eq!(registry.len(), 3);

        let exact = registry
            .lookup(&key(Sex::H, AgeCategory::Cadete, Metric::Sprint40m))
            .unwrap();
        assert_eq!(exact.len(), 5);
        assert_eq!(exact.domain(), ScaleDomain::Range { min: 4.4, max: 6.3 });

        let sex_only = registry
            .lookup(&key(Sex::H, AgeCategory::Juvenil, Metric::Sprint40m))
            .unwrap();
        assert_eq!(sex_only.domain(), ScaleDomain::Range { min: 4.2, max: 6.0 });

        let wildcard = registry.lookup(&key(Sex::M, AgeCategory::Juvenil, Metric::Cmj)).unwrap();
        assert_eq!(wildcard.direction(), Direction::Descending);

        assert!(registry
            .lookup(&key(Sex::M, AgeCategory::Cadete, Metric::Sprint40m))
            .is_none());
    }

    #[test]
    fn test_strict_policy_reports_missing_scale() {
        let registry = ScaleRegistry::from_json_str(SPRINT_JSON, FallbackPolicy::Strict).unwrap();
        let err = registry
            .scale_for(&key(Sex::M, AgeCategory::Cadete, Metric::YoyoIr1))
            .unwrap_err();
        assert!(matches!(err, ScaleError::MissingScale(_)));
    }

    #[test]
    fn test_lenient_policy_substitutes_neutral_scale() {
        let registry = ScaleRegistry::from_json_str(SPRINT_JSON, FallbackPolicy::Lenient).unwrap();
        let scale = registry
            .scale_for(&key(Sex::M, AgeCategory::Cadete, Metric::YoyoIr1))
            .unwrap();
        assert_eq!(scale.len(), 1);
        assert_eq!(scale.boundaries()[0].color, NO_DATA_COLOR);
        assert_eq!(scale.direction(), Direction::Descending);
    }

    #[test]
    fn test_malformed_entry_rejected_with_index() {
        let json = r#"{ "scales": [
            { "metric": "cmj", "boundaries": [[20, "red"], [30, "green"]] },
            { "metric": "yoyo_ir1", "boundaries": [[800, "red"], [400, "green"]] }
        ] }"#;
        let err = ScaleRegistry::from_json_str(json, FallbackPolicy::Lenient).unwrap_err();
        match err {
            ScaleError::Entry { index, metric, source } => {
                assert_eq!(index, 1);
                assert_eq!(metric, "yoyo_ir1");
                assert!(matches!(*source, ScaleError::NotIncreasing { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_color_and_duplicates_rejected() {
        let bad_color = r#"{ "scales": [
            { "metric": "cmj", "boundaries": [[20, "ultraviolet"]] }
        ] }"#;
        assert!(ScaleRegistry::from_json_str(bad_color, FallbackPolicy::Lenient).is_err());

        let duplicate = r#"{ "scales": [
            { "metric": "cmj", "boundaries": [[20, "red"]] },
            { "metric": "cmj", "boundaries": [[25, "red"]] }
        ] }"#;
        let err = ScaleRegistry::from_json_str(duplicate, FallbackPolicy::Lenient).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));

        let unknown_metric = r#"{ "scales": [
            { "metric": "bench_press", "boundaries": [[20, "red"]] }
        ] }"#;
        assert!(matches!(
            ScaleRegistry::from_json_str(unknown_metric, FallbackPolicy::Lenient),
            Err(ScaleError::Parse(_))
        ));
    }

    #[test]
    fn test_builtin_registry_covers_every_metric() {
        let registry = ScaleRegistry::builtin(FallbackPolicy::Strict).unwrap();
        for metric in Metric::ALL {
            for sex in [Sex::H, Sex::M] {
                for category in [AgeCategory::Cadete, AgeCategory::Juvenil] {
                    let k = key(sex, category, metric);
                    assert!(registry.scale_for(&k).is_ok(), "missing builtin scale for {}", k);
                }
            }
        }
    }
}
