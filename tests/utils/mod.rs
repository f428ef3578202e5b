use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use bmd_trends::{AnalysisConfig, BinnedTable, Cohort, CohortSource, Sex, SubjectVisit, VisitTable};
use chrono::{Datelike, NaiveDate};

/// Column header of a cohort export, with the id column name first
#[must_use]
pub fn header(id_column: &str) -> String {
    format!("{id_column},SEX,scdt,Exam,age,year_of_birth,TScore")
}

/// Build a single visit
#[must_use]
pub fn visit(
    id: &str,
    sex: Sex,
    date: (i32, u32, u32),
    age: f64,
    tscore: f64,
    cohort: Cohort,
) -> SubjectVisit {
    let exam_date = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
    SubjectVisit {
        subject_id: id.to_string(),
        sex,
        exam_date,
        exam: Some(1),
        age,
        year_of_birth: Some(i64::from(exam_date.year()) - age.floor() as i64),
        tscore,
        cohort,
    }
}

/// Deterministic two-cohort table: 40 subjects with three visits each,
/// plus a handful of visits outside the default age and period bins
#[must_use]
pub fn sample_visits() -> Vec<SubjectVisit> {
    let mut visits = Vec::new();
    for subject in 0..40_usize {
        let cohort = if subject < 20 {
            Cohort::Original
        } else {
            Cohort::Offspring
        };
        let sex = match subject % 7 {
            6 => Sex::Unknown,
            k if k % 2 == 0 => Sex::Male,
            _ => Sex::Female,
        };
        let base_age = match cohort {
            Cohort::Original => 60.0 + (subject % 20) as f64 * 1.5,
            Cohort::Offspring => 32.0 + (subject % 20) as f64 * 2.0,
        };
        let id = match cohort {
            Cohort::Original => format!("{}", 1000 + subject),
            Cohort::Offspring => format!("{}", 5000 + subject),
        };
        for visit_no in 0..3_usize {
            let year = 1986 + ((subject * 3 + visit_no * 7) % 24) as i32;
            let age = base_age + visit_no as f64 * 4.0;
            let noise = ((subject * 13 + visit_no * 7) % 10) as f64 / 10.0 - 0.45;
            let female_shift = if sex == Sex::Female { -0.4 } else { 0.0 };
            let tscore = -0.03 * (age - 30.0) + 0.02 * f64::from(year - 1985) + female_shift + noise;
            let month = 1 + (subject % 12) as u32;
            visits.push(visit(&id, sex, (year, month, 15), age, tscore, cohort));
        }
    }

    // Outside the age groups, outside the periods, and a missing score
    visits.push(visit("1100", Sex::Male, (1995, 3, 1), 25.0, 0.5, Cohort::Original));
    visits.push(visit("1101", Sex::Female, (1996, 3, 1), 101.5, -3.0, Cohort::Original));
    visits.push(visit("5100", Sex::Female, (1984, 6, 1), 45.0, 0.1, Cohort::Offspring));
    visits.push(visit("5101", Sex::Male, (2000, 6, 1), 55.0, f64::NAN, Cohort::Offspring));
    visits
}

#[must_use]
pub fn sample_table() -> VisitTable {
    VisitTable::new(sample_visits())
}

/// The sample table binned with the default breakpoints
#[must_use]
pub fn sample_binned() -> BinnedTable {
    BinnedTable::from_config(sample_table(), &AnalysisConfig::default()).unwrap()
}

fn csv_field(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Render visits as a cohort CSV export
#[must_use]
pub fn cohort_csv(id_column: &str, visits: &[SubjectVisit]) -> String {
    let mut out = header(id_column);
    out.push('\n');
    for v in visits {
        let sex = match v.sex {
            Sex::Male => "1",
            Sex::Female => "2",
            Sex::Unknown => "",
        };
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{}",
            v.subject_id,
            sex,
            v.exam_date.format("%Y-%m-%d"),
            v.exam.map_or_else(String::new, |e| e.to_string()),
            csv_field(v.age),
            v.year_of_birth.map_or_else(String::new, |y| y.to_string()),
            csv_field(v.tscore),
        );
    }
    out
}

/// Write a file into `dir` and return its path
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Write the sample cohorts as CSV exports into `dir` and return a
/// configuration pointing at them, with chart rendering disabled
pub fn write_sample_cohorts(dir: &Path) -> AnalysisConfig {
    let visits = sample_visits();
    let (original, offspring): (Vec<_>, Vec<_>) = visits
        .into_iter()
        .partition(|v| v.cohort == Cohort::Original);

    let original_path = write_file(dir, "cohortBMD_newID2.csv", &cohort_csv("newid", &original));
    let offspring_path = write_file(dir, "offspringBMD_newID2.csv", &cohort_csv("newID", &offspring));

    AnalysisConfig {
        original: CohortSource::new(original_path, "newid"),
        offspring: CohortSource::new(offspring_path, "newID"),
        output_dir: dir.join("out"),
        render_plots: false,
        bootstrap_samples: 50,
        ..AnalysisConfig::default()
    }
}
