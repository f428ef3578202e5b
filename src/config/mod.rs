//! Configuration for the BMD trend analysis.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BmdError, Result};

/// Environment variable that overrides the output directory
pub const OUTPUT_DIR_ENV: &str = "BMD_OUTPUT_DIR";

/// Where one cohort's visits come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortSource {
    /// CSV or Parquet export of the cohort spreadsheet
    pub path: PathBuf,
    /// Name of the subject identifier column (matched case-insensitively)
    pub id_column: String,
}

impl CohortSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, id_column: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            id_column: id_column.into(),
        }
    }
}

/// Configuration for a full analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Source of the original cohort
    pub original: CohortSource,
    /// Source of the offspring cohort
    pub offspring: CohortSource,
    /// Age breakpoints; intervals are right-closed
    pub age_breaks: Vec<f64>,
    /// Exam year breakpoints (half decades); intervals are right-closed
    pub year_breaks: Vec<f64>,
    /// Directory receiving charts and the JSON report
    pub output_dir: PathBuf,
    /// Whether to render charts at all
    pub render_plots: bool,
    /// Whether to write `report.json` into the output directory
    pub write_report: bool,
    /// Bootstrap resamples for the point-plot confidence intervals
    pub bootstrap_samples: usize,
    /// Seed for the bootstrap resampler
    pub bootstrap_seed: u64,
    /// Formats tried, in order, when an exam date arrives as text
    pub date_formats: Vec<String>,
    /// Fall back to guessing the date format from the string shape
    pub enable_format_detection: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            original: CohortSource::new("cohortBMD_newID2.csv", "newid"),
            offspring: CohortSource::new("offspringBMD_newID2.csv", "newID"),
            age_breaks: vec![30.0, 50.0, 60.0, 70.0, 80.0, 101.0],
            year_breaks: (1985..2011).step_by(5).map(f64::from).collect(),
            output_dir: PathBuf::from("bmd_output"),
            render_plots: true,
            write_report: false,
            bootstrap_samples: 1000,
            bootstrap_seed: 0,
            date_formats: vec![
                "%Y-%m-%d".to_string(),
                "%Y-%m-%d %H:%M:%S".to_string(),
                "%m/%d/%Y".to_string(),
                "%d.%m.%Y".to_string(),
                "%Y%m%d".to_string(),
            ],
            enable_format_detection: true,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file; absent keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| BmdError::io_with_path(path, e))?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides taken from the process environment
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(dir) = std::env::var(OUTPUT_DIR_ENV) {
            if !dir.is_empty() {
                log::debug!("Output directory overridden by {OUTPUT_DIR_ENV}: {dir}");
                self.output_dir = PathBuf::from(dir);
            }
        }
        self
    }

    /// Check the breakpoint lists before any data is touched
    pub fn validate(&self) -> Result<()> {
        for (name, breaks) in [("age_breaks", &self.age_breaks), ("year_breaks", &self.year_breaks)] {
            if breaks.len() < 2 {
                return Err(BmdError::DataError(format!(
                    "{name} needs at least two breakpoints, got {}",
                    breaks.len()
                )));
            }
            if breaks.windows(2).any(|w| !(w[0] < w[1])) {
                return Err(BmdError::DataError(format!(
                    "{name} must be strictly increasing: {breaks:?}"
                )));
            }
        }
        if self.bootstrap_samples == 0 {
            return Err(BmdError::DataError(
                "bootstrap_samples must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
