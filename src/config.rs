//! Runtime Configuration
//!
//! Settings for the report binary, read from environment variables with
//! defaults for local development:
//!
//! | Variable | Default |
//! |---|---|
//! | `DATA_PATH` | `data/measurements.csv` |
//! | `THRESHOLDS_PATH` | built-in scale table |
//! | `STRICT_THRESHOLDS` | `false` |
//! | `CACHE_TTL_SECS` | `600` |
//! | `REPORT_FORMAT` | `markdown` |
//! | `ATHLETE_ID` | every athlete |
//! | `OUTPUT_DIR` | stdout |

use crate::report::OutputFormat;
use crate::thresholds::FallbackPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_DATA_PATH: &str = "data/measurements.csv";
const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Variable set but not parseable as the expected type
    #[error("Invalid value for {var}: '{value}' ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    /// Variable set to an empty string
    #[error("Empty value for {0}")]
    Empty(&'static str),
}

/// Report binary settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub data_path: PathBuf,
    /// `None` uses the built-in scale table
    pub thresholds_path: Option<PathBuf>,
    pub strict_thresholds: bool,
    pub cache_ttl_secs: u64,
    pub format: OutputFormat,
    /// `None` reports every athlete
    pub athlete_id: Option<String>,
    /// `None` writes to stdout
    pub output_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            thresholds_path: None,
            strict_thresholds: false,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            format: OutputFormat::default(),
            athlete_id: None,
            output_dir: None,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |var: &'static str| -> Result<Option<String>, ConfigError> {
            match lookup(var) {
                None => Ok(None),
                Some(v) if v.trim().is_empty() => Err(ConfigError::Empty(var)),
                Some(v) => Ok(Some(v.trim().to_string())),
            }
        };

        let data_path = get("DATA_PATH")?
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);
        let thresholds_path = get("THRESHOLDS_PATH")?.map(PathBuf::from);

        let strict_thresholds = match get("STRICT_THRESHOLDS")? {
            Some(v) => parse_bool("STRICT_THRESHOLDS", &v)?,
            None => defaults.strict_thresholds,
        };

        let cache_ttl_secs = match get("CACHE_TTL_SECS")? {
            Some(v) => v.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                var: "CACHE_TTL_SECS",
                value: v.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.cache_ttl_secs,
        };

        let format = match get("REPORT_FORMAT")? {
            Some(v) => v.parse::<OutputFormat>().map_err(|reason| ConfigError::InvalidValue {
                var: "REPORT_FORMAT",
                value: v.clone(),
                reason,
            })?,
            None => defaults.format,
        };

        Ok(Self {
            data_path,
            thresholds_path,
            strict_thresholds,
            cache_ttl_secs,
            format,
            athlete_id: get("ATHLETE_ID")?,
            output_dir: get("OUTPUT_DIR")?.map(PathBuf::from),
        })
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        if self.strict_thresholds {
            FallbackPolicy::Strict
        } else {
            FallbackPolicy::Lenient
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: "expected true/false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: FxHashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.fallback_policy(), FallbackPolicy::Lenient);
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
    }

    #[test]
    fn test_reads_all_variables() {
        let config = config_from(&[
            ("DATA_PATH", "exports/tests.csv"),
            ("THRESHOLDS_PATH", "config/scales.json"),
            ("STRICT_THRESHOLDS", "yes"),
            ("CACHE_TTL_SECS", "30"),
            ("REPORT_FORMAT", "html"),
            ("ATHLETE_ID", " p7 "),
            ("OUTPUT_DIR", "out"),
        ])
        .unwrap();

        assert_eq!(config.data_path, PathBuf::from("exports/tests.csv"));
        assert_eq!(config.thresholds_path, Some(PathBuf::from("config/scales.json")));
        assert_eq!(config.fallback_policy(), FallbackPolicy::Strict);
        assert_eq!(config.cache_ttl_secs, 30);
        assert_eq!(config.format, OutputFormat::Html);
        assert_eq!(config.athlete_id.as_deref(), Some("p7"));
        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = config_from(&[("CACHE_TTL_SECS", "ten")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "CACHE_TTL_SECS", .. }));

        let err = config_from(&[("STRICT_THRESHOLDS", "maybe")]).unwrap_err();
        assert!(err.to_string().contains("STRICT_THRESHOLDS"));

        assert!(config_from(&[("REPORT_FORMAT", "pdf")]).is_err());
        assert!(matches!(
            config_from(&[("DATA_PATH", "  ")]).unwrap_err(),
            ConfigError::Empty("DATA_PATH")
        ));
    }
}
