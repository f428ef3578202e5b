//! In-memory table of subject visits
//!
//! The table keeps source order (original cohort rows first, then
//! offspring) so that row-oriented outputs match the merged spreadsheets.

use std::fmt::Write as _;

use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::error::{BmdError, Result};
use crate::models::types::Cohort;
use crate::models::visit::SubjectVisit;

/// A subject's visits in date order
#[derive(Debug, Clone)]
pub struct Trajectory<'a> {
    pub subject_id: &'a str,
    pub cohort: Cohort,
    pub visits: Vec<&'a SubjectVisit>,
}

/// Immutable, ordered collection of visits
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitTable {
    visits: Vec<SubjectVisit>,
}

impl VisitTable {
    #[must_use]
    pub fn new(visits: Vec<SubjectVisit>) -> Self {
        Self { visits }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubjectVisit> {
        self.visits.iter()
    }

    #[must_use]
    pub fn visits(&self) -> &[SubjectVisit] {
        &self.visits
    }

    /// Append `other` after `self`, checking that no subject changes cohort
    pub fn concat(self, other: Self) -> Result<Self> {
        let mut visits = self.visits;
        visits.extend(other.visits);
        let table = Self { visits };
        table.check_cohort_membership()?;
        Ok(table)
    }

    /// A subject identifier must map to exactly one cohort
    pub fn check_cohort_membership(&self) -> Result<()> {
        let mut membership: FxHashMap<&str, Cohort> = FxHashMap::default();
        for visit in &self.visits {
            let cohort = *membership
                .entry(visit.subject_id.as_str())
                .or_insert(visit.cohort);
            if cohort != visit.cohort {
                return Err(BmdError::DataError(format!(
                    "subject '{}' appears in both the {} and {} cohorts",
                    visit.subject_id, cohort, visit.cohort
                )));
            }
        }
        Ok(())
    }

    /// Distinct subject identifiers in order of first appearance
    #[must_use]
    pub fn subjects(&self) -> Vec<&str> {
        self.visits.iter().map(|v| v.subject_id.as_str()).unique().collect()
    }

    /// Number of distinct subjects
    #[must_use]
    pub fn subject_count(&self) -> usize {
        self.visits.iter().map(|v| v.subject_id.as_str()).unique().count()
    }

    /// Number of rows per cohort, in cohort order
    #[must_use]
    pub fn cohort_counts(&self) -> Vec<(Cohort, usize)> {
        Cohort::ALL
            .iter()
            .map(|c| (*c, self.visits.iter().filter(|v| v.cohort == *c).count()))
            .collect()
    }

    /// Row index of each subject's earliest scan
    ///
    /// Subjects are listed in order of first appearance; on a date tie the
    /// earlier row wins.
    #[must_use]
    pub fn first_scan_indices(&self) -> Vec<usize> {
        let mut earliest: FxHashMap<&str, usize> = FxHashMap::default();
        let mut order = Vec::new();
        for (idx, visit) in self.visits.iter().enumerate() {
            match earliest.get_mut(visit.subject_id.as_str()) {
                Some(best) => {
                    if visit.exam_date < self.visits[*best].exam_date {
                        *best = idx;
                    }
                }
                None => {
                    earliest.insert(visit.subject_id.as_str(), idx);
                    order.push(visit.subject_id.as_str());
                }
            }
        }
        order.into_iter().map(|id| earliest[id]).collect()
    }

    /// Table holding only each subject's earliest scan
    #[must_use]
    pub fn first_scans(&self) -> Self {
        Self::new(
            self.first_scan_indices()
                .into_iter()
                .map(|idx| self.visits[idx].clone())
                .collect(),
        )
    }

    /// Per-subject visit sequences, ordered by date within each subject
    #[must_use]
    pub fn trajectories(&self) -> Vec<Trajectory<'_>> {
        self.visits
            .iter()
            .map(|v| (v.subject_id.as_str(), v))
            .into_group_map()
            .into_iter()
            .sorted_by(|a, b| a.0.cmp(b.0))
            .map(|(subject_id, mut visits)| {
                visits.sort_by_key(|v| v.exam_date);
                Trajectory {
                    subject_id,
                    cohort: visits[0].cohort,
                    visits,
                }
            })
            .collect()
    }

    /// Render the first `n` rows as a text table
    #[must_use]
    pub fn head(&self, n: usize) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{:>6} {:>10} {:>7} {:>11} {:>5} {:>6} {:>13} {:>7} {:>10}",
            "", "newid", "sex", "scdt", "exam", "age", "year_of_birth", "tscore", "cohort"
        );
        for (idx, v) in self.visits.iter().take(n).enumerate() {
            let _ = writeln!(
                out,
                "{:>6} {:>10} {:>7} {:>11} {:>5} {:>6.1} {:>13} {:>7.2} {:>10}",
                idx,
                v.subject_id,
                v.sex.label(),
                v.exam_date.format("%Y-%m-%d").to_string(),
                v.exam.map_or_else(|| "NA".to_string(), |e| e.to_string()),
                v.age,
                v.year_of_birth
                    .map_or_else(|| "NA".to_string(), |y| y.to_string()),
                v.tscore,
                v.cohort.label()
            );
        }
        out
    }
}

impl<'a> IntoIterator for &'a VisitTable {
    type Item = &'a SubjectVisit;
    type IntoIter = std::slice::Iter<'a, SubjectVisit>;

    fn into_iter(self) -> Self::IntoIter {
        self.visits.iter()
    }
}

impl FromIterator<SubjectVisit> for VisitTable {
    fn from_iter<I: IntoIterator<Item = SubjectVisit>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
