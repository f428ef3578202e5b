use bmd_trends::plot::{
    FIRST_SCAN_AGE_CHART, FIRST_SCAN_SEX_COHORT_CHART, PERIOD_AGE_CHART, PERIOD_CHART,
    PERIOD_SEX_CHART, TRAJECTORY_CHART,
};
use bmd_trends::report::REPORT_FILE;
use bmd_trends::{AnalysisConfig, run};
use tempfile::tempdir;

use crate::utils::write_sample_cohorts;

#[test]
fn test_run_without_charts() {
    let dir = tempdir().unwrap();
    let config = write_sample_cohorts(dir.path());
    let report = run(&config).unwrap();

    assert_eq!(report.visits, 124);
    assert_eq!(report.subjects, 44);
    assert_eq!(report.cohorts.iter().map(|c| c.visits).sum::<usize>(), 124);
    assert_eq!(report.missing_age_group, 2);
    assert_eq!(report.missing_period, 1);
    assert!(report.charts.is_empty());

    assert_eq!(report.mean_matrix.row_labels.len(), 5);
    assert_eq!(report.crosstab.total() + 3, report.visits);
    assert_eq!(report.age_period_model.n_obs, 123);
    assert_eq!(
        report.sex_interaction_anova.rows.last().map(|r| r.term.as_str()),
        Some("Residual")
    );
    // Nothing written unless asked for
    assert!(!config.output_dir.join(REPORT_FILE).exists());
}

#[test]
fn test_run_writes_json_report() {
    let dir = tempdir().unwrap();
    let config = AnalysisConfig {
        write_report: true,
        ..write_sample_cohorts(dir.path())
    };
    run(&config).unwrap();

    let text = std::fs::read_to_string(config.output_dir.join(REPORT_FILE)).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["visits"], 124);
    assert_eq!(json["mean_matrix"]["row_labels"][0], "(30, 50]");
    assert_eq!(json["crosstab"]["counts"].as_array().unwrap().len(), 5);
    assert_eq!(json["age_period_model"]["coefficients"][0]["name"], "Intercept");
    assert!(json["sex_interaction_anova"]["rows"].is_array());
}

#[test]
fn test_run_reports_missing_source() {
    let dir = tempdir().unwrap();
    let mut config = write_sample_cohorts(dir.path());
    config.offspring.path = dir.path().join("missing.csv");
    let err = run(&config).unwrap_err();
    assert!(err.to_string().contains("missing.csv"));
}

#[test]
fn test_run_renders_all_charts() {
    let dir = tempdir().unwrap();
    let config = AnalysisConfig {
        render_plots: true,
        bootstrap_samples: 20,
        ..write_sample_cohorts(dir.path())
    };
    let report = run(&config).unwrap();

    let expected = [
        PERIOD_CHART,
        PERIOD_SEX_CHART,
        PERIOD_AGE_CHART,
        TRAJECTORY_CHART,
        FIRST_SCAN_SEX_COHORT_CHART,
        FIRST_SCAN_AGE_CHART,
    ];
    assert_eq!(report.charts.len(), expected.len());
    for name in expected {
        let path = config.output_dir.join(name);
        assert!(report.charts.contains(&path), "{name} not reported");
        let size = std::fs::metadata(&path).unwrap().len();
        assert!(size > 0, "{name} is empty");
    }
}
