//! Sequential (type I) analysis of variance for a fitted model.

use std::fmt;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use crate::algorithm::regression::ols::OlsFit;
use crate::error::{BmdError, Result};

/// One row of the ANOVA table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnovaRow {
    pub term: String,
    pub df: usize,
    pub sum_sq: f64,
    pub mean_sq: f64,
    /// NaN on the residual row and for terms with no estimable columns
    pub f_value: f64,
    pub p_value: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnovaTable {
    pub formula: String,
    /// Model terms in formula order, then "Residual"
    pub rows: Vec<AnovaRow>,
}

/// Type I ANOVA: each term's sum of squares is the reduction in residual
/// sum of squares when it is added after the terms before it
pub fn anova(fit: &OlsFit) -> Result<AnovaTable> {
    let df_resid = fit.df_resid as f64;
    let mut rows = Vec::with_capacity(fit.term_names.len());

    for (term_idx, term) in fit.term_names.iter().enumerate().skip(1) {
        let (df, sum_sq) = fit
            .effects
            .iter()
            .filter(|(t, _)| *t == term_idx)
            .fold((0usize, 0.0), |(df, ss), (_, e2)| (df + 1, ss + e2));

        let (mean_sq, f_value, p_value) = if df == 0 {
            (f64::NAN, f64::NAN, f64::NAN)
        } else {
            let mean_sq = sum_sq / df as f64;
            let f_value = mean_sq / fit.sigma2;
            let dist = FisherSnedecor::new(df as f64, df_resid)
                .map_err(|e| BmdError::ModelError(e.to_string()))?;
            (mean_sq, f_value, dist.sf(f_value))
        };

        rows.push(AnovaRow {
            term: term.clone(),
            df,
            sum_sq,
            mean_sq,
            f_value,
            p_value,
        });
    }

    rows.push(AnovaRow {
        term: "Residual".to_string(),
        df: fit.df_resid,
        sum_sq: fit.rss,
        mean_sq: fit.sigma2,
        f_value: f64::NAN,
        p_value: f64::NAN,
    });

    Ok(AnovaTable {
        formula: fit.formula.clone(),
        rows,
    })
}

impl AnovaTable {
    #[must_use]
    pub fn row(&self, term: &str) -> Option<&AnovaRow> {
        self.rows.iter().find(|r| r.term == term)
    }
}

impl fmt::Display for AnovaTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.rows.iter().map(|r| r.term.len()).max().unwrap_or(8).max(8);
        writeln!(f, "ANOVA (type I): {}", self.formula)?;
        writeln!(
            f,
            "{:<width$} {:>8} {:>14} {:>12} {:>12} {:>12}",
            "", "df", "sum_sq", "mean_sq", "F", "PR(>F)"
        )?;
        for row in &self.rows {
            let f_value = if row.f_value.is_nan() { "NaN".to_string() } else { format!("{:.4}", row.f_value) };
            let p_value = if row.p_value.is_nan() { "NaN".to_string() } else { format!("{:.4e}", row.p_value) };
            writeln!(
                f,
                "{:<width$} {:>8.1} {:>14.4} {:>12.4} {:>12} {:>12}",
                row.term, row.df as f64, row.sum_sq, row.mean_sq, f_value, p_value
            )?;
        }
        Ok(())
    }
}
