//! Analysis algorithms: binning, aggregation and regression

pub mod aggregate;
pub mod binning;
pub mod regression;

pub use aggregate::{CrossTab, GroupMean, MeanMatrix, crosstab, group_means};
pub use binning::{BinnedRow, BinnedTable, IntervalBins, MISSING_LABEL};
