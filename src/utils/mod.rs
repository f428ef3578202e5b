//! Shared helpers: logging and Arrow column extraction

pub mod arrow;
pub mod logging;

pub use logging::{log_operation_complete, log_operation_start, log_warning};
