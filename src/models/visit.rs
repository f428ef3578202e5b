//! Subject-visit record

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::types::{Cohort, Sex};

/// One bone density scan of one subject
///
/// Records are never mutated after loading; derived categories live next
/// to the table (see [`crate::algorithm::binning::BinnedTable`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectVisit {
    pub subject_id: String,
    pub sex: Sex,
    pub exam_date: NaiveDate,
    /// Framingham exam number; may be missing in the export
    pub exam: Option<i64>,
    /// Age at the scan; NaN when missing
    pub age: f64,
    pub year_of_birth: Option<i64>,
    /// T-score; NaN when missing
    pub tscore: f64,
    pub cohort: Cohort,
}

impl SubjectVisit {
    #[must_use]
    pub fn exam_year(&self) -> i32 {
        self.exam_date.year()
    }

    /// Exam date as a fractional year, for continuous time axes
    #[must_use]
    pub fn decimal_year(&self) -> f64 {
        let year = self.exam_date.year();
        let days_in_year = if self.exam_date.leap_year() { 366.0 } else { 365.0 };
        f64::from(year) + f64::from(self.exam_date.ordinal0()) / days_in_year
    }
}
