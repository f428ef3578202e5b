//! Arrow helpers for pulling typed columns out of record batches

pub mod extractors;

pub use extractors::{extract_dates, extract_f64, extract_i64, extract_strings, get_column};
