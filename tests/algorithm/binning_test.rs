use bmd_trends::{AnalysisConfig, BinnedTable, IntervalBins, VisitTable};

use crate::utils::{sample_binned, sample_table};

fn default_age_bins() -> IntervalBins {
    IntervalBins::new(&AnalysisConfig::default().age_breaks).unwrap()
}

#[test]
fn test_ages_outside_range_fall_in_missing_bin() {
    let bins = default_age_bins();
    for age in [-5.0, 0.0, 18.0, 29.99, 30.0, 101.01, 120.0, f64::NAN, f64::INFINITY] {
        assert_eq!(bins.assign(age), None, "age {age} should be unbinned");
    }
    for age in [30.5, 45.0, 64.0, 79.9, 100.0, 101.0] {
        assert!(bins.assign(age).is_some(), "age {age} should be binned");
    }
}

#[test]
fn test_bin_edges_are_right_closed() {
    let bins = default_age_bins();
    assert_eq!(bins.label(bins.assign(50.0).unwrap()), "(30, 50]");
    assert_eq!(bins.label(bins.assign(50.000_1).unwrap()), "(50, 60]");
    assert_eq!(bins.label(bins.assign(80.0).unwrap()), "(70, 80]");
    assert_eq!(bins.label(bins.assign(101.0).unwrap()), "(80, 101]");
    assert_eq!(bins.interval(0), (30.0, 50.0));
}

#[test]
fn test_default_half_decades() {
    let bins = IntervalBins::new(&AnalysisConfig::default().year_breaks).unwrap();
    assert_eq!(bins.len(), 5);
    assert_eq!(bins.label(0), "(1985, 1990]");
    assert_eq!(bins.label(4), "(2005, 2010]");
    assert_eq!(bins.assign(1985.0), None);
    assert_eq!(bins.assign(1990.0), Some(0));
    assert_eq!(bins.assign(1991.0), Some(1));
}

#[test]
fn test_binned_table_assigns_every_row() {
    let table = sample_table();
    let binned = sample_binned();
    assert_eq!(binned.len(), table.len());

    for (row, visit) in binned.rows().zip(table.iter()) {
        assert_eq!(row.visit.subject_id, visit.subject_id);
        assert_eq!(row.visit.exam_date, visit.exam_date);
        assert_eq!(row.age_group, binned.age_bins().assign(visit.age));
        assert_eq!(
            row.half_dec,
            binned.time_bins().assign(f64::from(visit.exam_year()))
        );
    }

    // One visit below 30, one above 101, one before 1986
    assert_eq!(binned.age_groups().iter().filter(|b| b.is_none()).count(), 2);
    assert_eq!(binned.half_decs().iter().filter(|b| b.is_none()).count(), 1);
}

#[test]
fn test_first_scans_keep_their_bins() {
    let binned = sample_binned();
    let first = binned.first_scans();
    assert_eq!(first.len(), binned.table().subject_count());
    for row in first.rows() {
        assert_eq!(row.age_group, first.age_bins().assign(row.visit.age));
    }
}

#[test]
fn test_bad_breakpoints_are_rejected() {
    let config = AnalysisConfig {
        age_breaks: vec![50.0, 30.0],
        ..AnalysisConfig::default()
    };
    assert!(BinnedTable::from_config(VisitTable::default(), &config).is_err());
}
