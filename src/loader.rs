//! Loading and merging the two cohort sources.
//!
//! Each source is read, its column names lowercased, the fixed column
//! subset extracted into [`SubjectVisit`] records tagged with the cohort,
//! and the two tables concatenated (original rows first).

use std::time::Instant;

use arrow::record_batch::RecordBatch;

use crate::config::{AnalysisConfig, CohortSource};
use crate::error::{BmdError, Result};
use crate::models::{Cohort, Sex, SubjectVisit, VisitTable};
use crate::reader::read_table;
use crate::schema::{
    AGE, DateFormatConfig, EXAM, EXAM_DATE, SEX, SourceColumns, TSCORE, YEAR_OF_BIRTH,
    normalize_column_names,
};
use crate::utils::arrow::{extract_dates, extract_f64, extract_i64, extract_strings, get_column};
use crate::utils::{log_operation_complete, log_operation_start};

/// Load one cohort source into visit records
pub fn load_cohort(
    source: &CohortSource,
    cohort: Cohort,
    config: &AnalysisConfig,
) -> Result<VisitTable> {
    let start = Instant::now();
    log_operation_start(&format!("Loading {cohort} cohort from"), source.path.display());

    let columns = SourceColumns::new(&source.id_column);
    let dates = DateFormatConfig::from(config);
    let label = format!("{cohort} cohort ({})", source.path.display());

    let mut visits = Vec::new();
    let mut row_offset = 0;
    for batch in read_table(&source.path)? {
        let batch = normalize_column_names(&batch)?;
        columns.validate(&batch.schema(), &label)?;
        visits.extend(batch_to_visits(&batch, &columns, cohort, &dates, &label, row_offset)?);
        row_offset += batch.num_rows();
    }

    log_operation_complete("loaded", &label, visits.len(), "visits", Some(start.elapsed()));
    Ok(VisitTable::new(visits))
}

/// Convert one normalised batch into visits
///
/// `row_offset` is the number of rows in earlier batches, so error messages
/// point at the row of the source file.
pub fn batch_to_visits(
    batch: &RecordBatch,
    columns: &SourceColumns,
    cohort: Cohort,
    dates: &DateFormatConfig,
    source: &str,
    row_offset: usize,
) -> Result<Vec<SubjectVisit>> {
    let ids = extract_strings(get_column(batch, &columns.subject_id, source)?, &columns.subject_id)?;
    let sexes = extract_i64(get_column(batch, SEX, source)?, SEX)?;
    let exam_dates = extract_dates(get_column(batch, EXAM_DATE, source)?, EXAM_DATE, dates)?;
    let exams = extract_i64(get_column(batch, EXAM, source)?, EXAM)?;
    let ages = extract_f64(get_column(batch, AGE, source)?, AGE)?;
    let births = extract_i64(get_column(batch, YEAR_OF_BIRTH, source)?, YEAR_OF_BIRTH)?;
    let scores = extract_f64(get_column(batch, TSCORE, source)?, TSCORE)?;

    (0..batch.num_rows())
        .map(|row| {
            let line = row_offset + row + 1;
            let subject_id = ids[row].clone().ok_or_else(|| {
                BmdError::DataError(format!("{source}: row {line} has no subject identifier"))
            })?;
            let exam_date = exam_dates[row].ok_or_else(|| {
                BmdError::DataError(format!(
                    "{source}: row {line} (subject {subject_id}) has a missing or malformed exam date"
                ))
            })?;
            Ok(SubjectVisit {
                subject_id,
                sex: Sex::from(sexes[row]),
                exam_date,
                exam: exams[row],
                age: ages[row],
                year_of_birth: births[row],
                tscore: scores[row],
                cohort,
            })
        })
        .collect()
}

/// Concatenate the original and offspring tables
///
/// # Errors
/// Fails when a subject identifier occurs in both cohorts.
pub fn merge(original: VisitTable, offspring: VisitTable) -> Result<VisitTable> {
    let expected = original.len() + offspring.len();
    let merged = original.concat(offspring)?;
    debug_assert_eq!(merged.len(), expected);
    log::info!(
        "Merged cohorts into {} visits from {} subjects",
        merged.len(),
        merged.subject_count()
    );
    Ok(merged)
}

/// Load both configured sources and merge them
pub fn load_cohorts(config: &AnalysisConfig) -> Result<VisitTable> {
    let (original, offspring) = rayon::join(
        || load_cohort(&config.original, Cohort::Original, config),
        || load_cohort(&config.offspring, Cohort::Offspring, config),
    );
    merge(original?, offspring?)
}
