//! Ordinary least squares via a column-ordered QR decomposition.
//!
//! Columns are orthogonalised left to right with modified Gram-Schmidt
//! (one re-orthogonalisation pass). A column whose remaining norm is
//! negligible next to its original norm is linear in the columns before
//! it; it is marked aliased and gets no estimate. Because the decomposition
//! follows column order, the projections of the response onto the
//! orthonormal columns (the "effects") are exactly the sequential sums of
//! squares used by the type I ANOVA.

use std::fmt;

use ndarray::{Array1, Array2, ArrayView1};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

use crate::algorithm::regression::frame::DesignMatrix;
use crate::error::{BmdError, Result};

/// Relative norm below which a column counts as linearly dependent
pub const ALIAS_TOLERANCE: f64 = 1e-7;

/// Estimate for one design column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coefficient {
    pub name: String,
    /// `None` when the column is aliased
    pub estimate: Option<f64>,
    pub std_error: Option<f64>,
    pub t_value: Option<f64>,
    pub p_value: Option<f64>,
    pub ci_lower: Option<f64>,
    pub ci_upper: Option<f64>,
}

/// A fitted linear model
#[derive(Debug, Clone, Serialize)]
pub struct OlsFit {
    pub formula: String,
    pub n_obs: usize,
    pub rank: usize,
    pub df_model: usize,
    pub df_resid: usize,
    pub coefficients: Vec<Coefficient>,
    pub r_squared: f64,
    pub adj_r_squared: f64,
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub rss: f64,
    /// Residual variance estimate
    pub sigma2: f64,
    pub term_names: Vec<String>,
    /// Term index and squared effect of every non-aliased column, in order
    #[serde(skip)]
    pub effects: Vec<(usize, f64)>,
    #[serde(skip)]
    pub residuals: Array1<f64>,
}

/// Column-ordered QR with aliased columns removed
struct Decomposition {
    q: Vec<Array1<f64>>,
    r: Array2<f64>,
    kept: Vec<usize>,
}

fn decompose(x: &Array2<f64>) -> Decomposition {
    let mut q: Vec<Array1<f64>> = Vec::new();
    let mut r_columns: Vec<Vec<f64>> = Vec::new();
    let mut kept = Vec::new();

    for (j, column) in x.columns().into_iter().enumerate() {
        let mut v = column.to_owned();
        let original_norm = v.dot(&v).sqrt();
        let mut coeffs = vec![0.0; q.len()];
        for _ in 0..2 {
            for (i, qi) in q.iter().enumerate() {
                let proj = qi.dot(&v);
                coeffs[i] += proj;
                v.scaled_add(-proj, qi);
            }
        }
        let norm = v.dot(&v).sqrt();
        if original_norm == 0.0 || norm <= ALIAS_TOLERANCE * original_norm {
            continue;
        }
        v /= norm;
        q.push(v);
        coeffs.push(norm);
        r_columns.push(coeffs);
        kept.push(j);
    }

    let k = q.len();
    let mut r = Array2::<f64>::zeros((k, k));
    for (c, coeffs) in r_columns.iter().enumerate() {
        for (i, value) in coeffs.iter().enumerate() {
            r[[i, c]] = *value;
        }
    }
    Decomposition { q, r, kept }
}

/// Solve `R b = rhs` for upper-triangular `R`
fn back_substitute(r: &Array2<f64>, rhs: ArrayView1<'_, f64>) -> Array1<f64> {
    let k = r.nrows();
    let mut b = Array1::<f64>::zeros(k);
    for i in (0..k).rev() {
        let mut acc = rhs[i];
        for j in (i + 1)..k {
            acc -= r[[i, j]] * b[j];
        }
        b[i] = acc / r[[i, i]];
    }
    b
}

fn model_error(e: impl fmt::Display) -> BmdError {
    BmdError::ModelError(e.to_string())
}

impl OlsFit {
    /// Fit the model described by `design`
    ///
    /// # Errors
    /// Fails when there are no residual degrees of freedom left.
    pub fn fit(design: &DesignMatrix, formula: &str) -> Result<Self> {
        let n = design.nrows();
        let Decomposition { q, r, kept } = decompose(&design.x);
        let rank = kept.len();
        if rank == 0 {
            return Err(BmdError::ModelError(format!("{formula}: design matrix is all zeros")));
        }
        if n <= rank {
            return Err(BmdError::ModelError(format!(
                "{formula}: {n} observations cannot support {rank} parameters"
            )));
        }
        let df_resid = n - rank;
        let has_intercept = kept.first() == Some(&0) && design.column_terms.first() == Some(&0);

        let y = &design.y;
        let effects: Array1<f64> = q.iter().map(|qi| qi.dot(y)).collect();
        let mut fitted = Array1::<f64>::zeros(n);
        for (qi, e) in q.iter().zip(effects.iter()) {
            fitted.scaled_add(*e, qi);
        }
        let residuals = y - &fitted;
        let rss = residuals.dot(&residuals);
        let sigma2 = rss / df_resid as f64;

        let beta = back_substitute(&r, effects.view());

        // (R'R)^-1 = R^-1 R^-T
        let mut r_inv = Array2::<f64>::zeros((rank, rank));
        for c in 0..rank {
            let mut unit = Array1::<f64>::zeros(rank);
            unit[c] = 1.0;
            r_inv.column_mut(c).assign(&back_substitute(&r, unit.view()));
        }
        let cov_unscaled = r_inv.dot(&r_inv.t());

        let t_dist = StudentsT::new(0.0, 1.0, df_resid as f64).map_err(model_error)?;
        let t_crit = t_dist.inverse_cdf(0.975);

        let mut coefficients: Vec<Coefficient> = design
            .column_names
            .iter()
            .map(|name| Coefficient {
                name: name.clone(),
                estimate: None,
                std_error: None,
                t_value: None,
                p_value: None,
                ci_lower: None,
                ci_upper: None,
            })
            .collect();
        for (k, &column) in kept.iter().enumerate() {
            let estimate = beta[k];
            let se = (sigma2 * cov_unscaled[[k, k]]).sqrt();
            let t = estimate / se;
            let coef = &mut coefficients[column];
            coef.estimate = Some(estimate);
            coef.std_error = Some(se);
            coef.t_value = Some(t);
            coef.p_value = Some(2.0 * t_dist.sf(t.abs()));
            coef.ci_lower = Some(estimate - t_crit * se);
            coef.ci_upper = Some(estimate + t_crit * se);
        }

        let tss = if has_intercept {
            let mean = y.mean().unwrap_or(0.0);
            y.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
        } else {
            y.dot(y)
        };
        let df_model = if has_intercept { rank - 1 } else { rank };
        let r_squared = if tss > 0.0 { 1.0 - rss / tss } else { f64::NAN };
        let adj_r_squared = if has_intercept {
            1.0 - (1.0 - r_squared) * (n - 1) as f64 / df_resid as f64
        } else {
            1.0 - (1.0 - r_squared) * n as f64 / df_resid as f64
        };
        let (f_statistic, f_p_value) = if df_model > 0 {
            let f = ((tss - rss) / df_model as f64) / sigma2;
            let dist = FisherSnedecor::new(df_model as f64, df_resid as f64).map_err(model_error)?;
            (f, dist.sf(f))
        } else {
            (f64::NAN, f64::NAN)
        };

        let aliased = design.ncols() - rank;
        if aliased > 0 {
            log::warn!("{formula}: {aliased} aliased design columns have no estimate");
        }

        Ok(Self {
            formula: formula.to_string(),
            n_obs: n,
            rank,
            df_model,
            df_resid,
            coefficients,
            r_squared,
            adj_r_squared,
            f_statistic,
            f_p_value,
            rss,
            sigma2,
            term_names: design.term_names.clone(),
            effects: kept
                .iter()
                .zip(effects.iter())
                .map(|(&column, e)| (design.column_terms[column], e * e))
                .collect(),
            residuals,
        })
    }

    /// Coefficient by design column name
    #[must_use]
    pub fn coefficient(&self, name: &str) -> Option<&Coefficient> {
        self.coefficients.iter().find(|c| c.name == name)
    }

    /// Names of the columns that could not be estimated
    #[must_use]
    pub fn aliased(&self) -> Vec<&str> {
        self.coefficients
            .iter()
            .filter(|c| c.estimate.is_none())
            .map(|c| c.name.as_str())
            .collect()
    }
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.precision$}"))
}

impl fmt::Display for OlsFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .coefficients
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(9)
            .max(9);
        let rule = "=".repeat(width + 62);

        writeln!(f, "OLS Regression Results: {}", self.formula)?;
        writeln!(f, "{rule}")?;
        writeln!(f, "{:<22}{:>10}    {:<22}{:>10.3}", "No. Observations:", self.n_obs, "R-squared:", self.r_squared)?;
        writeln!(f, "{:<22}{:>10}    {:<22}{:>10.3}", "Df Residuals:", self.df_resid, "Adj. R-squared:", self.adj_r_squared)?;
        writeln!(f, "{:<22}{:>10}    {:<22}{:>10.2}", "Df Model:", self.df_model, "F-statistic:", self.f_statistic)?;
        writeln!(f, "{:<22}{:>10.4}    {:<22}{:>10.3e}", "Residual variance:", self.sigma2, "Prob (F-statistic):", self.f_p_value)?;
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{:<width$} {:>10} {:>10} {:>8} {:>8} {:>10} {:>10}",
            "", "coef", "std err", "t", "P>|t|", "[0.025", "0.975]"
        )?;
        writeln!(f, "{}", "-".repeat(width + 62))?;
        for c in &self.coefficients {
            writeln!(
                f,
                "{:<width$} {:>10} {:>10} {:>8} {:>8} {:>10} {:>10}",
                c.name,
                fmt_opt(c.estimate, 4),
                fmt_opt(c.std_error, 3),
                fmt_opt(c.t_value, 3),
                fmt_opt(c.p_value, 3),
                fmt_opt(c.ci_lower, 3),
                fmt_opt(c.ci_upper, 3),
            )?;
        }
        writeln!(f, "{rule}")
    }
}
