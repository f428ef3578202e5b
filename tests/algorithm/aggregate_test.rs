use bmd_trends::{BinnedTable, Cohort, IntervalBins, MeanMatrix, Sex, VisitTable, crosstab, group_means};

use crate::utils::{sample_binned, visit};

#[test]
fn test_group_means_match_direct_computation() {
    let binned = sample_binned();
    let means = group_means(&binned);
    assert_eq!(means.len(), binned.age_bins().len() * binned.time_bins().len());

    for cell in &means {
        let scores: Vec<f64> = binned
            .table()
            .iter()
            .filter(|v| binned.age_bins().assign(v.age) == Some(cell.age_group))
            .filter(|v| binned.time_bins().assign(f64::from(v.exam_year())) == Some(cell.half_dec))
            .map(|v| v.tscore)
            .filter(|t| !t.is_nan())
            .collect();
        assert_eq!(cell.n, scores.len());
        match cell.mean {
            Some(mean) => {
                let expected = scores.iter().sum::<f64>() / scores.len() as f64;
                assert!((mean - expected).abs() < 1e-12);
            }
            None => assert!(scores.is_empty()),
        }
    }
}

#[test]
fn test_group_means_are_ordered_by_period_then_age() {
    let means = group_means(&sample_binned());
    let keys: Vec<(usize, usize)> = means.iter().map(|m| (m.half_dec, m.age_group)).collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
}

#[test]
fn test_mean_matrix_pivots_group_means() {
    let binned = sample_binned();
    let means = group_means(&binned);
    let matrix = MeanMatrix::pivot(&binned, &means);

    assert_eq!(matrix.row_labels, binned.age_bins().labels());
    assert_eq!(matrix.col_labels, binned.time_bins().labels());
    for cell in &means {
        assert_eq!(matrix.get(cell.age_group, cell.half_dec), cell.mean);
    }
    let printed = matrix.to_string();
    assert!(printed.contains("(30, 50]"));
    assert!(printed.contains("(2005, 2010]"));
}

#[test]
fn test_crosstab_counts_missing_scores_but_means_skip_them() {
    let visits = vec![
        visit("1", Sex::Male, (1992, 1, 1), 40.0, -1.0, Cohort::Original),
        visit("2", Sex::Male, (1992, 1, 1), 41.0, f64::NAN, Cohort::Original),
        visit("3", Sex::Female, (1992, 1, 1), 42.0, -2.0, Cohort::Offspring),
        visit("4", Sex::Female, (1992, 1, 1), 20.0, -2.0, Cohort::Offspring),
    ];
    let binned = BinnedTable::new(
        VisitTable::new(visits),
        IntervalBins::new(&[30.0, 50.0, 60.0]).unwrap(),
        IntervalBins::new(&[1985.0, 1990.0, 1995.0]).unwrap(),
    );

    let table = crosstab(&binned);
    assert_eq!(table.get(0, 1), 3);
    assert_eq!(table.total(), 3);
    // Empty categories are kept
    assert_eq!(table.rows(), vec![vec![0, 3], vec![0, 0]]);

    let means = group_means(&binned);
    let cell = means.iter().find(|m| m.age_group == 0 && m.half_dec == 1).unwrap();
    assert_eq!(cell.n, 2);
    assert!((cell.mean.unwrap() - -1.5).abs() < 1e-12);
    assert!(means.iter().filter(|m| m.n == 0).all(|m| m.mean.is_none()));
}

#[test]
fn test_crosstab_excludes_missing_bins() {
    let binned = sample_binned();
    let table = crosstab(&binned);
    let binned_rows = binned
        .rows()
        .filter(|r| r.age_group.is_some() && r.half_dec.is_some())
        .count();
    assert_eq!(table.total(), binned_rows);
    assert!(table.total() < binned.len());
}
