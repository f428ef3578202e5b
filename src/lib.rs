//! Bone mineral density trends across the original and offspring cohorts.
//!
//! Loads two cohort exports, merges them, bins visits by age group and
//! exam period, aggregates the T-score, fits categorical linear models and
//! renders descriptive charts.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod plot;
pub mod reader;
pub mod report;
pub mod schema;
pub mod utils;

// Core types
pub use config::{AnalysisConfig, CohortSource};
pub use error::{BmdError, Result};
pub use models::{Cohort, Sex, SubjectVisit, VisitTable};

// Pipeline stages
pub use algorithm::{BinnedTable, CrossTab, IntervalBins, MeanMatrix, crosstab, group_means};
pub use algorithm::regression::{AnovaTable, Formula, MissingBin, ModelFrame, OlsFit, anova, fit_formula};
pub use loader::{load_cohort, load_cohorts, merge};
pub use reader::read_table;
pub use report::{AnalysisReport, run};

// Arrow types
pub use arrow::record_batch::RecordBatch;
