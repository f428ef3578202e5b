//! Column extraction utilities for Arrow record batches
//!
//! Spreadsheet exports are loosely typed: the same column can arrive as
//! integers in one file and floats or text in another. Each extractor casts
//! the column to one canonical Arrow type and reads it out as plain values.

use arrow::array::{Array, ArrayRef, Date32Array, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;

use crate::error::{BmdError, Result};
use crate::schema::date_utils::{DateFormatConfig, from_spreadsheet_serial, parse_date_string};
use crate::utils::logging::log_warning;

/// Get a column from a record batch by (already normalised) name
///
/// # Errors
/// Returns a schema error naming the column and source if it is absent
pub fn get_column<'a>(batch: &'a RecordBatch, column_name: &str, source: &str) -> Result<&'a ArrayRef> {
    let idx = batch
        .schema()
        .index_of(column_name)
        .map_err(|_| BmdError::missing_column(column_name, source))?;
    Ok(batch.column(idx))
}

/// Downcast an array, reporting the column on failure
fn downcast<'a, A: Array + 'static>(array: &'a ArrayRef, column_name: &str) -> Result<&'a A> {
    array.as_any().downcast_ref::<A>().ok_or_else(|| {
        BmdError::SchemaError(format!(
            "column '{column_name}' has unexpected type {:?}",
            array.data_type()
        ))
    })
}

/// Cast to `target`, turning Arrow's message into a schema error about the column
fn cast_column(array: &ArrayRef, target: &DataType, column_name: &str) -> Result<ArrayRef> {
    cast(array, target).map_err(|e| {
        BmdError::SchemaError(format!(
            "column '{column_name}' cannot be read as {target:?}: {e}"
        ))
    })
}

/// Extract a numeric column as `f64`; nulls become NaN
pub fn extract_f64(array: &ArrayRef, column_name: &str) -> Result<Vec<f64>> {
    let casted = cast_column(array, &DataType::Float64, column_name)?;
    let values = downcast::<Float64Array>(&casted, column_name)?;
    Ok(values
        .iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

/// Extract an integer column; floats are truncated, nulls stay `None`
pub fn extract_i64(array: &ArrayRef, column_name: &str) -> Result<Vec<Option<i64>>> {
    let casted = cast_column(array, &DataType::Int64, column_name)?;
    let values = downcast::<Int64Array>(&casted, column_name)?;
    Ok(values.iter().collect())
}

/// Extract a column as strings; integral floats lose their trailing `.0`
pub fn extract_strings(array: &ArrayRef, column_name: &str) -> Result<Vec<Option<String>>> {
    if matches!(array.data_type(), DataType::Float32 | DataType::Float64) {
        // Identifiers stored as spreadsheet numbers ("1234.0") should match "1234"
        let floats = extract_f64(array, column_name)?;
        return Ok(floats
            .into_iter()
            .map(|v| {
                if v.is_nan() {
                    None
                } else if v.fract() == 0.0 {
                    Some(format!("{v:.0}"))
                } else {
                    Some(v.to_string())
                }
            })
            .collect());
    }

    let casted = cast_column(array, &DataType::Utf8, column_name)?;
    let values = downcast::<StringArray>(&casted, column_name)?;
    Ok(values
        .iter()
        .map(|v| v.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string))
        .collect())
}

/// Extract a date column
///
/// Text is parsed with the configured formats, numbers are read as
/// spreadsheet serial days, and temporal types are cast to `Date32`.
/// Unparseable values become `None` and are logged.
pub fn extract_dates(
    array: &ArrayRef,
    column_name: &str,
    config: &DateFormatConfig,
) -> Result<Vec<Option<NaiveDate>>> {
    match array.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
            let casted = cast_column(array, &DataType::Utf8, column_name)?;
            let values = downcast::<StringArray>(&casted, column_name)?;
            let dates: Vec<Option<NaiveDate>> = values
                .iter()
                .map(|v| v.and_then(|s| parse_date_string(s, config)))
                .collect();
            let unparsed = values
                .iter()
                .zip(&dates)
                .filter(|(raw, parsed)| raw.is_some_and(|s| !s.trim().is_empty()) && parsed.is_none())
                .count();
            if unparsed > 0 {
                log_warning(
                    &format!("{unparsed} values could not be parsed as dates in column"),
                    Some(&column_name),
                );
            }
            Ok(dates)
        }
        t if t.is_numeric() => Ok(extract_f64(array, column_name)?
            .into_iter()
            .map(from_spreadsheet_serial)
            .collect()),
        _ => {
            let casted = cast_column(array, &DataType::Date32, column_name)?;
            let values = downcast::<Date32Array>(&casted, column_name)?;
            Ok((0..values.len())
                .map(|i| {
                    if values.is_null(i) {
                        None
                    } else {
                        values.value_as_date(i)
                    }
                })
                .collect())
        }
    }
}
