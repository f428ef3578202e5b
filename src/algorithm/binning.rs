//! Interval binning of ages and exam years.
//!
//! Intervals are right-closed, `(e0, e1], (e1, e2], ...`, matching the
//! convention of the published tables. Anything at or below the first edge,
//! above the last edge, or NaN lands in no bin.

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::error::{BmdError, Result};
use crate::models::{SubjectVisit, VisitTable};

/// Label used for the missing bin when bins are turned into strings
pub const MISSING_LABEL: &str = "nan";

/// Ordered, right-closed intervals over fixed breakpoints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalBins {
    edges: Vec<f64>,
    labels: Vec<String>,
}

fn format_edge(edge: f64) -> String {
    if edge.fract() == 0.0 {
        format!("{edge:.0}")
    } else {
        edge.to_string()
    }
}

impl IntervalBins {
    /// Build bins from strictly increasing, finite breakpoints
    pub fn new(edges: &[f64]) -> Result<Self> {
        if edges.len() < 2 {
            return Err(BmdError::DataError(format!(
                "at least two breakpoints are needed, got {}",
                edges.len()
            )));
        }
        if edges.iter().any(|e| !e.is_finite()) || edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(BmdError::DataError(format!(
                "breakpoints must be finite and strictly increasing: {edges:?}"
            )));
        }
        let labels = edges
            .windows(2)
            .map(|w| format!("({}, {}]", format_edge(w[0]), format_edge(w[1])))
            .collect();
        Ok(Self {
            edges: edges.to_vec(),
            labels,
        })
    }

    /// Number of intervals
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn label(&self, bin: usize) -> &str {
        &self.labels[bin]
    }

    /// Label of an assignment, with [`MISSING_LABEL`] for the missing bin
    #[must_use]
    pub fn label_or_missing(&self, bin: Option<usize>) -> &str {
        bin.map_or(MISSING_LABEL, |b| self.label(b))
    }

    /// Bounds `(lower, upper]` of an interval
    #[must_use]
    pub fn interval(&self, bin: usize) -> (f64, f64) {
        (self.edges[bin], self.edges[bin + 1])
    }

    /// Bin index of `value`, or `None` for the missing bin
    #[must_use]
    pub fn assign(&self, value: f64) -> Option<usize> {
        let first = self.edges[0];
        let last = self.edges[self.edges.len() - 1];
        if value.is_nan() || value <= first || value > last {
            return None;
        }
        // First edge >= value closes the interval holding it
        let closing = self.edges.partition_point(|e| *e < value);
        Some(closing - 1)
    }
}

/// The merged visits plus their age-group and half-decade bins
#[derive(Debug, Clone)]
pub struct BinnedTable {
    table: VisitTable,
    age_bins: IntervalBins,
    time_bins: IntervalBins,
    age_group: Vec<Option<usize>>,
    half_dec: Vec<Option<usize>>,
}

/// One visit with its derived categories
#[derive(Debug, Clone, Copy)]
pub struct BinnedRow<'a> {
    pub visit: &'a SubjectVisit,
    pub age_group: Option<usize>,
    pub half_dec: Option<usize>,
}

impl BinnedTable {
    /// Derive both bins for every visit
    #[must_use]
    pub fn new(table: VisitTable, age_bins: IntervalBins, time_bins: IntervalBins) -> Self {
        let age_group: Vec<_> = table.iter().map(|v| age_bins.assign(v.age)).collect();
        let half_dec: Vec<_> = table
            .iter()
            .map(|v| time_bins.assign(f64::from(v.exam_year())))
            .collect();

        let missing_age = age_group.iter().filter(|b| b.is_none()).count();
        let missing_time = half_dec.iter().filter(|b| b.is_none()).count();
        if missing_age > 0 {
            log::warn!(
                "{missing_age} visits fall outside the age groups {:?}",
                age_bins.edges()
            );
        }
        if missing_time > 0 {
            log::warn!(
                "{missing_time} visits fall outside the exam periods {:?}",
                time_bins.edges()
            );
        }

        Self {
            table,
            age_bins,
            time_bins,
            age_group,
            half_dec,
        }
    }

    /// Bin with the breakpoints from the configuration
    pub fn from_config(table: VisitTable, config: &AnalysisConfig) -> Result<Self> {
        Ok(Self::new(
            table,
            IntervalBins::new(&config.age_breaks)?,
            IntervalBins::new(&config.year_breaks)?,
        ))
    }

    #[must_use]
    pub fn table(&self) -> &VisitTable {
        &self.table
    }

    #[must_use]
    pub fn age_bins(&self) -> &IntervalBins {
        &self.age_bins
    }

    #[must_use]
    pub fn time_bins(&self) -> &IntervalBins {
        &self.time_bins
    }

    #[must_use]
    pub fn age_groups(&self) -> &[Option<usize>] {
        &self.age_group
    }

    #[must_use]
    pub fn half_decs(&self) -> &[Option<usize>] {
        &self.half_dec
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = BinnedRow<'_>> + '_ {
        self.table
            .iter()
            .zip(self.age_group.iter().zip(&self.half_dec))
            .map(|(visit, (age_group, half_dec))| BinnedRow {
                visit,
                age_group: *age_group,
                half_dec: *half_dec,
            })
    }

    /// Each subject's earliest scan, keeping the bins already derived
    #[must_use]
    pub fn first_scans(&self) -> Self {
        let indices = self.table.first_scan_indices();
        Self {
            table: VisitTable::new(
                indices
                    .iter()
                    .map(|&i| self.table.visits()[i].clone())
                    .collect(),
            ),
            age_bins: self.age_bins.clone(),
            time_bins: self.time_bins.clone(),
            age_group: indices.iter().map(|&i| self.age_group[i]).collect(),
            half_dec: indices.iter().map(|&i| self.half_dec[i]).collect(),
        }
    }
}
