//! Source column layout and name normalisation.
//!
//! Both cohort spreadsheets carry the same seven columns, but with
//! inconsistent capitalisation (`newid` vs `newID`). All matching is done
//! on lowercased names.

pub mod date_utils;

use std::sync::Arc;

use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use rustc_hash::FxHashSet;

use crate::error::{BmdError, Result};

pub use date_utils::{DateFormatConfig, detect_date_format, parse_date_string};

/// Sex code column
pub const SEX: &str = "sex";
/// Scan (exam) date column
pub const EXAM_DATE: &str = "scdt";
/// Exam index column
pub const EXAM: &str = "exam";
/// Age at exam column
pub const AGE: &str = "age";
/// Year of birth column
pub const YEAR_OF_BIRTH: &str = "year_of_birth";
/// Measured T-score column
pub const TSCORE: &str = "tscore";

/// The lowercased columns every cohort source must provide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceColumns {
    pub subject_id: String,
}

impl SourceColumns {
    #[must_use]
    pub fn new(id_column: &str) -> Self {
        Self {
            subject_id: id_column.to_lowercase(),
        }
    }

    /// Every required column, identifier first
    #[must_use]
    pub fn required(&self) -> Vec<&str> {
        vec![
            self.subject_id.as_str(),
            SEX,
            EXAM_DATE,
            EXAM,
            AGE,
            YEAR_OF_BIRTH,
            TSCORE,
        ]
    }

    /// Check that `schema` (already normalised) carries every required column
    pub fn validate(&self, schema: &Schema, source: &str) -> Result<()> {
        for column in self.required() {
            if schema.index_of(column).is_err() {
                return Err(BmdError::missing_column(column, source));
            }
        }
        Ok(())
    }
}

/// Lowercase every column name in a batch
///
/// Two columns that only differ by case would become ambiguous, so that is
/// reported as a schema error.
pub fn normalize_column_names(batch: &RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut seen = FxHashSet::default();
    let fields: Vec<Field> = schema
        .fields()
        .iter()
        .map(|f| {
            let name = f.name().to_lowercase();
            if !seen.insert(name.clone()) {
                return Err(BmdError::SchemaError(format!(
                    "column '{}' collides with another column after lowercasing",
                    f.name()
                )));
            }
            Ok(f.as_ref().clone().with_name(name))
        })
        .collect::<Result<_>>()?;

    let normalized = Schema::new_with_metadata(fields, schema.metadata().clone());
    Ok(RecordBatch::try_new(
        Arc::new(normalized),
        batch.columns().to_vec(),
    )?)
}
