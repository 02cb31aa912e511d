// Athlete report binary
//
// Loads the measurement export, classifies every metric against the scale
// table and prints (or writes) one report per athlete.
// Usage: DATA_PATH=exports/tests.csv REPORT_FORMAT=html OUTPUT_DIR=out cargo run --bin athlete_report

use anyhow::Context;
use athlete_dashboard::report::JsonFormatter;
use athlete_dashboard::{AppConfig, AthleteReport, DatasetCache, OutputFormat, ReportGenerator, ScaleRegistry};
use std::fs;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "athlete_dashboard=info,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    tracing::info!("Configuration:");
    tracing::info!("  DATA_PATH: {:?}", config.data_path);
    tracing::info!("  THRESHOLDS_PATH: {:?}", config.thresholds_path);
    tracing::info!("  STRICT_THRESHOLDS: {}", config.strict_thresholds);
    tracing::info!("  REPORT_FORMAT: {}", config.format);

    let registry = match &config.thresholds_path {
        Some(path) => ScaleRegistry::load(path, config.fallback_policy())?,
        None => ScaleRegistry::builtin(config.fallback_policy())
            .context("Built-in threshold table is invalid")?,
    };
    tracing::info!("Loaded {} threshold scales", registry.len());

    let cache = DatasetCache::new(config.cache_ttl());
    let table = cache.load_csv(&config.data_path)?;
    tracing::info!(
        "Loaded {} measurements ({} rows skipped)",
        table.len(),
        table.skipped_rows()
    );

    let generator = ReportGenerator::new(&registry);
    let reports: Vec<AthleteReport> = match &config.athlete_id {
        Some(id) => vec![generator.generate(&table, id)?],
        None => generator
            .generate_all(&table)
            .into_iter()
            .collect::<anyhow::Result<Vec<_>>>()?,
    };

    match &config.output_dir {
        Some(dir) => write_reports(dir, &reports, config.format)?,
        None if config.format == OutputFormat::Json && reports.len() > 1 => {
            println!("{}", JsonFormatter::format_many(&reports)?);
        }
        None => {
            for report in &reports {
                println!("{}", config.format.render(report)?);
            }
        }
    }

    tracing::info!("Generated {} reports", reports.len());
    Ok(())
}

fn write_reports(dir: &Path, reports: &[AthleteReport], format: OutputFormat) -> anyhow::Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

    for report in reports {
        let file_name = format.file_name(&report.athlete.id).ok_or_else(|| {
            anyhow::anyhow!("Refusing to write report for unsafe athlete id: {:?}", report.athlete.id)
        })?;
        let path = dir.join(file_name);
        let body = format.render(report)?;
        fs::write(&path, body).with_context(|| format!("Failed to write report: {:?}", path))?;
        tracing::debug!("Wrote {:?}", path);
    }
    Ok(())
}
