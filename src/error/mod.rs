//! Error handling for the BMD trend analysis.

use std::io;
use std::path::Path;

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for loading, modelling and charting cohort data
#[derive(Debug, thiserror::Error)]
pub enum BmdError {
    /// Error opening or reading a file
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    ParquetError(#[from] ParquetError),
    /// Error processing Arrow arrays (CSV decoding, casts)
    #[error("Arrow error: {0}")]
    ArrowError(#[from] ArrowError),
    /// A source is missing a required column or has an unusable type
    #[error("Schema error: {0}")]
    SchemaError(String),
    /// A value could not be interpreted, or the merged data violates an invariant
    #[error("Data error: {0}")]
    DataError(String),
    /// Formula parsing or model fitting failed
    #[error("Model error: {0}")]
    ModelError(String),
    /// Chart rendering failed
    #[error("Plot error: {0}")]
    PlotError(String),
    /// The configuration file could not be parsed
    #[error("Config error: {0}")]
    ConfigError(#[from] serde_json::Error),
}

impl BmdError {
    /// Build an IO error that names the file it concerns
    pub fn io_with_path(path: &Path, error: io::Error) -> Self {
        Self::IoError(io::Error::new(
            error.kind(),
            format!("{}: {error}", path.display()),
        ))
    }

    /// Shorthand for a missing column in a named source
    pub fn missing_column(column: &str, source: &str) -> Self {
        Self::SchemaError(format!("column '{column}' not found in {source}"))
    }
}

/// Result type for BMD analysis operations
pub type Result<T> = std::result::Result<T, BmdError>;
