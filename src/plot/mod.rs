//! Chart rendering with plotters
//!
//! Point estimates and colour assignment are computed up front; the
//! renderers only draw what they are handed.

pub mod estimates;
pub mod palette;
pub mod point;
pub mod scatter;
pub mod trajectory;

use std::path::{Path, PathBuf};
use std::time::Instant;

pub use estimates::{Grouping, PointEstimate, bootstrap_ci, point_estimates};
pub use point::{PointPlotSpec, render_point_plot};
pub use scatter::{ScatterPoint, ScatterSpec, render_scatter};
pub use trajectory::{TrajectoryLine, render_trajectories};

use crate::algorithm::binning::BinnedTable;
use crate::config::AnalysisConfig;
use crate::error::{BmdError, Result};
use crate::models::{Cohort, Sex};
use crate::utils::{log_operation_complete, log_operation_start};

pub const PERIOD_CHART: &str = "tscore_by_period.png";
pub const PERIOD_SEX_CHART: &str = "tscore_by_period_sex.png";
pub const PERIOD_AGE_CHART: &str = "tscore_by_period_age.png";
pub const TRAJECTORY_CHART: &str = "trajectories.png";
pub const FIRST_SCAN_SEX_COHORT_CHART: &str = "first_scans_sex_cohort.png";
pub const FIRST_SCAN_AGE_CHART: &str = "first_scans_age.png";

/// Wrap a backend or drawing error as a plot error
pub(crate) fn plot_err(e: impl std::fmt::Display) -> BmdError {
    BmdError::PlotError(e.to_string())
}

const X_DESC: &str = "Exam period";
const Y_DESC: &str = "T-Score";

fn cohort_labels() -> Vec<String> {
    Cohort::ALL.iter().map(|c| c.label().to_string()).collect()
}

fn cohort_code(cohort: Cohort) -> usize {
    Cohort::ALL.iter().position(|c| *c == cohort).unwrap_or(0)
}

/// Render every chart into `config.output_dir`, returning the written paths
pub fn render_all(binned: &BinnedTable, config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
    let start = Instant::now();
    let dir = &config.output_dir;
    std::fs::create_dir_all(dir).map_err(|e| BmdError::io_with_path(dir, e))?;
    log_operation_start("Rendering charts into", dir.display());

    let mut written = Vec::with_capacity(6);

    let period_charts = [
        (PERIOD_CHART, "T-Score by exam period", Grouping::AgeGroup, Grouping::All),
        (PERIOD_SEX_CHART, "T-Score by exam period and sex", Grouping::AgeGroup, Grouping::Sex),
        (PERIOD_AGE_CHART, "T-Score by exam period and age group", Grouping::Sex, Grouping::AgeGroup),
    ];
    for (file, title, hue, facet) in period_charts {
        let path = dir.join(file);
        period_chart(&path, title, binned, hue, facet, config)?;
        written.push(path);
    }

    let path = dir.join(TRAJECTORY_CHART);
    trajectory_chart(&path, binned)?;
    written.push(path);

    let first = binned.first_scans();
    let path = dir.join(FIRST_SCAN_SEX_COHORT_CHART);
    first_scan_sex_cohort_chart(&path, &first)?;
    written.push(path);

    let path = dir.join(FIRST_SCAN_AGE_CHART);
    first_scan_age_chart(&path, &first)?;
    written.push(path);

    log_operation_complete("rendered", dir.display(), written.len(), "charts", Some(start.elapsed()));
    Ok(written)
}

fn period_chart(
    path: &Path,
    title: &str,
    binned: &BinnedTable,
    hue: Grouping,
    facet: Grouping,
    config: &AnalysisConfig,
) -> Result<()> {
    let estimates = point_estimates(
        binned,
        Grouping::HalfDecade,
        hue,
        facet,
        config.bootstrap_samples,
        config.bootstrap_seed,
    );
    let x_labels = Grouping::HalfDecade.levels(binned);
    let hue_labels = hue.levels(binned);
    let facet_labels = facet.levels(binned);
    let colors = match hue {
        Grouping::AgeGroup => palette::reds_reversed(hue_labels.len()),
        _ => (0..hue_labels.len()).map(palette::categorical).collect(),
    };
    let spec = PointPlotSpec {
        title,
        x_desc: X_DESC,
        y_desc: Y_DESC,
        x_labels: &x_labels,
        hue_labels: &hue_labels,
        facet_labels: &facet_labels,
        colors: &colors,
    };
    render_point_plot(path, &spec, &estimates)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn trajectory_chart(path: &Path, binned: &BinnedTable) -> Result<()> {
    let lines: Vec<TrajectoryLine> = binned
        .table()
        .trajectories()
        .into_iter()
        .map(|t| TrajectoryLine {
            points: t.visits.iter().map(|v| (v.decimal_year(), v.tscore)).collect(),
            group: cohort_code(t.cohort),
        })
        .collect();
    let colors: Vec<_> = (0..Cohort::ALL.len()).map(palette::categorical).collect();
    render_trajectories(
        path,
        "Individual T-Score trajectories",
        &cohort_labels(),
        &colors,
        0.1,
        &lines,
    )?;
    log::info!("Wrote {} ({} subjects)", path.display(), lines.len());
    Ok(())
}

fn first_scan_sex_cohort_chart(path: &Path, first: &BinnedTable) -> Result<()> {
    let sex_labels: Vec<String> = [Sex::Male, Sex::Female, Sex::Unknown]
        .iter()
        .map(|s| s.label().to_string())
        .collect();
    let points: Vec<ScatterPoint> = first
        .table()
        .iter()
        .map(|v| ScatterPoint {
            x: v.decimal_year(),
            y: v.tscore,
            color: cohort_code(v.cohort),
            marker: match v.sex {
                Sex::Male => 0,
                Sex::Female => 1,
                Sex::Unknown => 2,
            },
        })
        .collect();
    let colors: Vec<_> = (0..Cohort::ALL.len()).map(palette::categorical).collect();
    let labels = cohort_labels();
    let spec = ScatterSpec {
        title: "First scan by cohort and sex",
        x_desc: "Exam date",
        y_desc: Y_DESC,
        color_labels: &labels,
        marker_labels: &sex_labels,
        colors: &colors,
        alpha: 0.6,
    };
    render_scatter(path, &spec, &points)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

fn first_scan_age_chart(path: &Path, first: &BinnedTable) -> Result<()> {
    let labels = first.age_bins().labels().to_vec();
    // Scans outside every age group are not drawn
    let points: Vec<ScatterPoint> = first
        .rows()
        .filter_map(|row| {
            row.age_group.map(|a| ScatterPoint {
                x: row.visit.decimal_year(),
                y: row.visit.tscore,
                color: a,
                marker: 0,
            })
        })
        .collect();
    let colors = palette::reds_reversed(labels.len());
    let single_marker = [String::new()];
    let spec = ScatterSpec {
        title: "First scan by age group",
        x_desc: "Exam date",
        y_desc: Y_DESC,
        color_labels: &labels,
        marker_labels: &single_marker,
        colors: &colors,
        alpha: 0.5,
    };
    render_scatter(path, &spec, &points)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}
