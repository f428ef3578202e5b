//! Linear models of the T-score on categorical predictors
//!
//! A formula is parsed into terms, expanded into a treatment-coded design
//! matrix over a [`ModelFrame`], fitted by least squares, and optionally
//! decomposed into a sequential ANOVA table.

pub mod anova;
pub mod formula;
pub mod frame;
pub mod ols;

use std::time::Instant;

pub use anova::{AnovaRow, AnovaTable, anova};
pub use formula::{Formula, Term};
pub use frame::{DesignMatrix, Factor, MissingBin, ModelFrame};
pub use ols::{Coefficient, OlsFit};

use crate::error::Result;
use crate::utils::{log_operation_complete, log_operation_start};

/// Main-effects model of age group and exam period
pub const AGE_PERIOD_MODEL: &str = "tscore ~ age_groups + half_decs";
/// Age group and exam period, each interacting with sex
pub const SEX_INTERACTION_MODEL: &str = "tscore ~ age_groups*sex + half_decs*sex";

/// Parse `formula`, build its design over `frame` and fit it
pub fn fit_formula(frame: &ModelFrame, formula: &str) -> Result<OlsFit> {
    let start = Instant::now();
    log_operation_start("Fitting", formula);
    let parsed = Formula::parse(formula)?;
    let design = frame.design(&parsed)?;
    let fit = OlsFit::fit(&design, &parsed.to_string())?;
    log_operation_complete("fitted", formula, design.nrows(), "observations", Some(start.elapsed()));
    Ok(fit)
}
