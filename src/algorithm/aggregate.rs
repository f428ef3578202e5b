//! Mean T-score and visit counts per age group and exam period.

use std::fmt;

use ndarray::Array2;
use serde::{Serialize, Serializer};

use crate::algorithm::binning::BinnedTable;

/// Mean score of one (exam period, age group) cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub half_dec: usize,
    pub age_group: usize,
    /// `None` when the cell has no non-missing scores
    pub mean: Option<f64>,
    /// Number of non-missing scores behind the mean
    pub n: usize,
}

/// Mean score for every combination of exam period and age group
///
/// Rows come out ordered by exam period, then age group. Rows in a missing
/// bin are left out, as are NaN scores.
#[must_use]
pub fn group_means(binned: &BinnedTable) -> Vec<GroupMean> {
    let n_time = binned.time_bins().len();
    let n_age = binned.age_bins().len();
    let mut sums = Array2::<f64>::zeros((n_time, n_age));
    let mut counts = Array2::<usize>::zeros((n_time, n_age));

    for row in binned.rows() {
        if let (Some(t), Some(a)) = (row.half_dec, row.age_group) {
            if !row.visit.tscore.is_nan() {
                sums[[t, a]] += row.visit.tscore;
                counts[[t, a]] += 1;
            }
        }
    }

    let mut means = Vec::with_capacity(n_time * n_age);
    for t in 0..n_time {
        for a in 0..n_age {
            let n = counts[[t, a]];
            means.push(GroupMean {
                half_dec: t,
                age_group: a,
                mean: (n > 0).then(|| sums[[t, a]] / n as f64),
                n,
            });
        }
    }
    means
}

/// Age groups (rows) by exam periods (columns) matrix of mean scores
#[derive(Debug, Clone, Serialize)]
pub struct MeanMatrix {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    /// NaN marks an empty cell; serialised as `null`
    #[serde(serialize_with = "serialize_means")]
    pub values: Array2<f64>,
}

impl MeanMatrix {
    /// Pivot the long group means into a matrix
    #[must_use]
    pub fn pivot(binned: &BinnedTable, means: &[GroupMean]) -> Self {
        let mut values = Array2::from_elem(
            (binned.age_bins().len(), binned.time_bins().len()),
            f64::NAN,
        );
        for cell in means {
            if let Some(mean) = cell.mean {
                values[[cell.age_group, cell.half_dec]] = mean;
            }
        }
        Self {
            row_labels: binned.age_bins().labels().to_vec(),
            col_labels: binned.time_bins().labels().to_vec(),
            values,
        }
    }

    /// Mean of one cell, `None` when empty
    #[must_use]
    pub fn get(&self, age_group: usize, half_dec: usize) -> Option<f64> {
        let v = self.values[[age_group, half_dec]];
        (!v.is_nan()).then_some(v)
    }

    /// Rows as nested options, for serialisation
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<Option<f64>>> {
        self.values
            .rows()
            .into_iter()
            .map(|r| r.iter().map(|v| (!v.is_nan()).then_some(*v)).collect())
            .collect()
    }
}

/// Visit counts per age group (rows) and exam period (columns)
#[derive(Debug, Clone, Serialize)]
pub struct CrossTab {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    #[serde(serialize_with = "serialize_counts")]
    pub counts: Array2<usize>,
}

impl CrossTab {
    #[must_use]
    pub fn get(&self, age_group: usize, half_dec: usize) -> usize {
        self.counts[[age_group, half_dec]]
    }

    /// Visits counted in the table (i.e. with both bins present)
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.sum()
    }

    #[must_use]
    pub fn rows(&self) -> Vec<Vec<usize>> {
        self.counts.rows().into_iter().map(|r| r.to_vec()).collect()
    }
}

/// Count visits per age group and exam period
///
/// Every visit with both bins present is counted, whether or not its score
/// is missing.
#[must_use]
pub fn crosstab(binned: &BinnedTable) -> CrossTab {
    let mut counts = Array2::<usize>::zeros((binned.age_bins().len(), binned.time_bins().len()));
    for row in binned.rows() {
        if let (Some(a), Some(t)) = (row.age_group, row.half_dec) {
            counts[[a, t]] += 1;
        }
    }
    CrossTab {
        row_labels: binned.age_bins().labels().to_vec(),
        col_labels: binned.time_bins().labels().to_vec(),
        counts,
    }
}

fn serialize_means<S: Serializer>(values: &Array2<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    let rows: Vec<Vec<Option<f64>>> = values
        .rows()
        .into_iter()
        .map(|r| r.iter().map(|v| (!v.is_nan()).then_some(*v)).collect())
        .collect();
    rows.serialize(serializer)
}

fn serialize_counts<S: Serializer>(counts: &Array2<usize>, serializer: S) -> Result<S::Ok, S::Error> {
    let rows: Vec<Vec<usize>> = counts.rows().into_iter().map(|r| r.to_vec()).collect();
    rows.serialize(serializer)
}

fn write_header(f: &mut fmt::Formatter<'_>, corner: &str, cols: &[String], width: usize) -> fmt::Result {
    write!(f, "{corner:<12}")?;
    for col in cols {
        write!(f, " {col:>width$}")?;
    }
    writeln!(f)
}

impl fmt::Display for MeanMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.col_labels.iter().map(String::len).max().unwrap_or(8).max(8);
        write_header(f, "age_groups", &self.col_labels, width)?;
        for (label, row) in self.row_labels.iter().zip(self.values.rows()) {
            write!(f, "{label:<12}")?;
            for v in row {
                if v.is_nan() {
                    write!(f, " {:>width$}", "NaN")?;
                } else {
                    write!(f, " {v:>width$.6}")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for CrossTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.col_labels.iter().map(String::len).max().unwrap_or(8).max(8);
        write_header(f, "age_groups", &self.col_labels, width)?;
        for (label, row) in self.row_labels.iter().zip(self.counts.rows()) {
            write!(f, "{label:<12}")?;
            for v in row {
                write!(f, " {v:>width$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
