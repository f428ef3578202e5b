//! The end-to-end analysis run and its serialisable summary.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use crate::algorithm::aggregate::{CrossTab, GroupMean, MeanMatrix, crosstab, group_means};
use crate::algorithm::binning::BinnedTable;
use crate::algorithm::regression::{
    AGE_PERIOD_MODEL, AnovaTable, MissingBin, ModelFrame, OlsFit, SEX_INTERACTION_MODEL, anova,
    fit_formula,
};
use crate::config::AnalysisConfig;
use crate::error::{BmdError, Result};
use crate::loader::load_cohorts;
use crate::models::Cohort;
use crate::plot::render_all;

/// File name of the JSON report inside the output directory
pub const REPORT_FILE: &str = "report.json";

/// Rows shown when printing the head of the merged table
const HEAD_ROWS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct CohortCount {
    pub cohort: Cohort,
    pub visits: usize,
}

/// Everything one run computed
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub visits: usize,
    pub subjects: usize,
    pub cohorts: Vec<CohortCount>,
    /// Visits outside every age group
    pub missing_age_group: usize,
    /// Visits outside every exam period
    pub missing_period: usize,
    pub group_means: Vec<GroupMean>,
    pub mean_matrix: MeanMatrix,
    pub crosstab: CrossTab,
    pub age_period_model: OlsFit,
    pub sex_interaction_model: OlsFit,
    pub sex_interaction_anova: AnovaTable,
    pub charts: Vec<PathBuf>,
}

/// Run the whole analysis: load, bin, aggregate, fit, plot
///
/// Tables and model summaries are printed to stdout as they are computed.
pub fn run(config: &AnalysisConfig) -> Result<AnalysisReport> {
    let start = Instant::now();
    config.validate()?;

    let merged = load_cohorts(config)?;
    println!("{}", merged.head(HEAD_ROWS));

    let binned = BinnedTable::from_config(merged, config)?;
    let means = group_means(&binned);
    let mean_matrix = MeanMatrix::pivot(&binned, &means);
    let counts = crosstab(&binned);
    log::info!(
        "Aggregated {} visits into {} age groups x {} exam periods",
        counts.total(),
        mean_matrix.row_labels.len(),
        mean_matrix.col_labels.len()
    );
    println!("Mean T-score by age group and exam period\n{mean_matrix}");
    println!("Visits by age group and exam period\n{counts}");

    let age_period_model = fit_formula(
        &ModelFrame::from_binned(&binned, MissingBin::AsLevel),
        AGE_PERIOD_MODEL,
    )?;
    println!("{age_period_model}");

    let sex_interaction_model = fit_formula(
        &ModelFrame::from_binned(&binned, MissingBin::Drop),
        SEX_INTERACTION_MODEL,
    )?;
    let sex_interaction_anova = anova(&sex_interaction_model)?;
    println!("{sex_interaction_anova}");

    let charts = if config.render_plots {
        render_all(&binned, config)?
    } else {
        log::info!("Chart rendering disabled");
        Vec::new()
    };

    let table = binned.table();
    let report = AnalysisReport {
        visits: table.len(),
        subjects: table.subject_count(),
        cohorts: table
            .cohort_counts()
            .into_iter()
            .map(|(cohort, visits)| CohortCount { cohort, visits })
            .collect(),
        missing_age_group: binned.age_groups().iter().filter(|b| b.is_none()).count(),
        missing_period: binned.half_decs().iter().filter(|b| b.is_none()).count(),
        group_means: means,
        mean_matrix,
        crosstab: counts,
        age_period_model,
        sex_interaction_model,
        sex_interaction_anova,
        charts,
    };

    if config.write_report {
        std::fs::create_dir_all(&config.output_dir)
            .map_err(|e| BmdError::io_with_path(&config.output_dir, e))?;
        write_report(&report, &config.output_dir.join(REPORT_FILE))?;
    }

    log::info!("Analysis finished in {:?}", start.elapsed());
    Ok(report)
}

/// Write the report as pretty-printed JSON
pub fn write_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| BmdError::io_with_path(path, e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .map_err(|e| BmdError::io_with_path(path, e.into()))?;
    log::info!("Wrote report to {}", path.display());
    Ok(())
}
