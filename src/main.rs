use std::path::PathBuf;

use anyhow::Context;
use bmd_trends::{AnalysisConfig, run};
use clap::Parser;

/// Bone mineral density trends across the Framingham cohorts
#[derive(Debug, Parser)]
#[command(name = "bmd-trends", version, about)]
struct Cli {
    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Original cohort export (CSV or Parquet)
    #[arg(long, value_name = "PATH")]
    original: Option<PathBuf>,

    /// Offspring cohort export (CSV or Parquet)
    #[arg(long, value_name = "PATH")]
    offspring: Option<PathBuf>,

    /// Directory for charts and the report
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Skip chart rendering
    #[arg(long)]
    no_plots: bool,

    /// Write report.json into the output directory
    #[arg(long)]
    report: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?,
            None => AnalysisConfig::default(),
        }
        .with_env_overrides();

        if let Some(path) = self.original {
            config.original.path = path;
        }
        if let Some(path) = self.offspring {
            config.offspring.path = path;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if self.no_plots {
            config.render_plots = false;
        }
        if self.report {
            config.write_report = true;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Cli::parse().into_config()?;
    let report = run(&config).context("analysis failed")?;

    log::info!(
        "Processed {} visits from {} subjects; {} charts written",
        report.visits,
        report.subjects,
        report.charts.len()
    );
    Ok(())
}
