use bmd_trends::{BmdError, Cohort, Sex, VisitTable};

use crate::utils::{sample_table, visit};

fn small_table() -> VisitTable {
    VisitTable::new(vec![
        visit("7", Sex::Male, (1995, 5, 1), 61.0, -1.0, Cohort::Original),
        visit("3", Sex::Female, (1990, 1, 1), 55.0, -0.5, Cohort::Original),
        visit("7", Sex::Male, (1989, 2, 1), 55.0, -0.2, Cohort::Original),
        visit("3", Sex::Female, (1990, 1, 1), 55.0, -0.7, Cohort::Original),
        visit("9", Sex::Unknown, (2001, 8, 9), 40.0, 0.3, Cohort::Offspring),
    ])
}

#[test]
fn test_first_scans_pick_earliest_visit() {
    let table = small_table();
    let first = table.first_scans();
    let picked: Vec<(&str, f64)> = first
        .iter()
        .map(|v| (v.subject_id.as_str(), v.tscore))
        .collect();
    // Order of first appearance; the date tie for "3" keeps the earlier row
    assert_eq!(picked, vec![("7", -0.2), ("3", -0.5), ("9", 0.3)]);
    assert_eq!(table.first_scan_indices(), vec![2, 1, 4]);
}

#[test]
fn test_trajectories_are_grouped_and_date_ordered() {
    let table = small_table();
    let trajectories = table.trajectories();
    let ids: Vec<&str> = trajectories.iter().map(|t| t.subject_id).collect();
    assert_eq!(ids, vec!["3", "7", "9"]);

    let seven = &trajectories[1];
    assert_eq!(seven.cohort, Cohort::Original);
    assert_eq!(seven.visits.len(), 2);
    assert!(seven.visits[0].exam_date < seven.visits[1].exam_date);
    assert_eq!(trajectories[2].cohort, Cohort::Offspring);
}

#[test]
fn test_subject_listing_and_counts() {
    let table = small_table();
    assert_eq!(table.subjects(), vec!["7", "3", "9"]);
    assert_eq!(table.subject_count(), 3);
    assert_eq!(
        table.cohort_counts(),
        vec![(Cohort::Original, 4), (Cohort::Offspring, 1)]
    );
}

#[test]
fn test_concat_keeps_order_and_rejects_shared_subjects() {
    let original = VisitTable::new(vec![visit("1", Sex::Male, (1990, 1, 1), 60.0, -1.0, Cohort::Original)]);
    let offspring = VisitTable::new(vec![visit("2", Sex::Female, (1991, 1, 1), 40.0, 0.0, Cohort::Offspring)]);
    let merged = original.clone().concat(offspring).unwrap();
    assert_eq!(merged.len(), 2);
    assert_eq!(merged.visits()[0].cohort, Cohort::Original);
    assert_eq!(merged.visits()[1].cohort, Cohort::Offspring);

    let clash = VisitTable::new(vec![visit("1", Sex::Male, (1999, 1, 1), 35.0, 0.0, Cohort::Offspring)]);
    let err = original.concat(clash).unwrap_err();
    assert!(matches!(err, BmdError::DataError(_)));
    assert!(err.to_string().contains('1'));
}

#[test]
fn test_head_prints_requested_rows() {
    let head = sample_table().head(5);
    // Header plus five rows
    assert_eq!(head.lines().count(), 6);
    assert!(head.contains("tscore"));
    assert!(head.contains("1000"));
}
