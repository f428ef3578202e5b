//! Reading cohort exports into Arrow record batches.
//!
//! The cohort spreadsheets are consumed as CSV or Parquet exports. CSV
//! schemas are inferred from the data, so the loader downstream must cope
//! with whatever numeric or temporal type each column ends up with.

use std::fs::File;
use std::io::{Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::{BmdError, Result};
use crate::utils::{log_operation_complete, log_operation_start};

/// Default batch size for reading
pub const DEFAULT_BATCH_SIZE: usize = 8192;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Tsv,
    Parquet,
}

impl SourceFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Ok(Self::Csv),
            Some("tsv" | "tab") => Ok(Self::Tsv),
            Some("parquet" | "pq") => Ok(Self::Parquet),
            Some("xlsx" | "xls") => Err(BmdError::SchemaError(format!(
                "{}: export the spreadsheet to CSV or Parquet first",
                path.display()
            ))),
            _ => Err(BmdError::SchemaError(format!(
                "{}: unrecognised file extension",
                path.display()
            ))),
        }
    }
}

/// Read a whole export into record batches
///
/// # Errors
/// Returns an IO error naming the path if the file cannot be opened, and
/// Arrow/Parquet errors for malformed content.
pub fn read_table(path: &Path) -> Result<Vec<RecordBatch>> {
    let start = Instant::now();
    log_operation_start("Reading", path.display());

    let format = SourceFormat::from_path(path)?;
    let file = File::open(path).map_err(|e| BmdError::io_with_path(path, e))?;

    let batches = match format {
        SourceFormat::Csv => read_delimited(file, b',')?,
        SourceFormat::Tsv => read_delimited(file, b'\t')?,
        SourceFormat::Parquet => read_parquet(file)?,
    };

    let rows = batches.iter().map(RecordBatch::num_rows).sum();
    log_operation_complete("read", path.display(), rows, "rows", Some(start.elapsed()));
    Ok(batches)
}

fn read_delimited(mut file: File, delimiter: u8) -> Result<Vec<RecordBatch>> {
    let format = Format::default()
        .with_header(true)
        .with_delimiter(delimiter);
    let (schema, _) = format.infer_schema(&mut file, None)?;
    file.seek(SeekFrom::Start(0))?;

    let reader = ReaderBuilder::new(Arc::new(schema))
        .with_format(format)
        .with_batch_size(DEFAULT_BATCH_SIZE)
        .build(file)?;

    Ok(reader.collect::<std::result::Result<Vec<_>, _>>()?)
}

fn read_parquet(file: File) -> Result<Vec<RecordBatch>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?
        .with_batch_size(DEFAULT_BATCH_SIZE)
        .build()?;

    Ok(reader.collect::<std::result::Result<Vec<_>, _>>()?)
}
