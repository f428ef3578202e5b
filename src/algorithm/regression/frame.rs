//! Model frames and treatment-coded design matrices.

use ndarray::{Array1, Array2};

use crate::algorithm::binning::{BinnedTable, IntervalBins};
use crate::algorithm::regression::formula::{Formula, Term};
use crate::error::{BmdError, Result};
use crate::models::{Cohort, Sex};

/// Response variable name
pub const RESPONSE: &str = "tscore";
/// Factor names available to formulas
pub const AGE_GROUPS: &str = "age_groups";
pub const HALF_DECS: &str = "half_decs";
pub const SEX: &str = "sex";
pub const COHORT: &str = "cohort";

/// How the missing bin enters a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingBin {
    /// Bins are used as plain strings: the missing bin becomes the level
    /// `"nan"`, and levels are sorted lexically. No row is dropped.
    AsLevel,
    /// Bins keep their natural order and every defined category is a level;
    /// rows with a missing value in any factor the model uses are dropped.
    Drop,
}

/// A categorical variable: level names plus one code per row
#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    pub name: String,
    pub levels: Vec<String>,
    pub codes: Vec<Option<usize>>,
}

impl Factor {
    /// Build a factor from row labels, with lexically sorted observed levels
    #[must_use]
    pub fn lexical(name: &str, labels: &[&str]) -> Self {
        let mut levels: Vec<String> = labels.iter().map(|s| (*s).to_string()).collect();
        levels.sort();
        levels.dedup();
        let codes = labels
            .iter()
            .map(|l| levels.binary_search_by(|lv| lv.as_str().cmp(*l)).ok())
            .collect();
        Self {
            name: name.to_string(),
            levels,
            codes,
        }
    }

    /// Build a factor whose levels are the categories of `bins`, in bin order
    #[must_use]
    pub fn from_bins(name: &str, bins: &IntervalBins, codes: &[Option<usize>]) -> Self {
        Self {
            name: name.to_string(),
            levels: bins.labels().to_vec(),
            codes: codes.to_vec(),
        }
    }

    #[must_use]
    pub fn baseline(&self) -> Option<&str> {
        self.levels.first().map(String::as_str)
    }
}

/// Response plus the categorical predictors of each visit
#[derive(Debug, Clone)]
pub struct ModelFrame {
    pub response: Vec<f64>,
    pub factors: Vec<Factor>,
    pub policy: MissingBin,
}

/// Numeric matrices ready for fitting
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    pub column_names: Vec<String>,
    /// Term index of each column; 0 is the intercept
    pub column_terms: Vec<usize>,
    /// "Intercept" followed by the formula's terms
    pub term_names: Vec<String>,
    /// Rows of the frame that were dropped for missing values
    pub dropped_rows: usize,
}

impl ModelFrame {
    /// Build the frame for `age_groups`, `half_decs`, `sex` and `cohort`
    #[must_use]
    pub fn from_binned(binned: &BinnedTable, policy: MissingBin) -> Self {
        let table = binned.table();
        let response = table.iter().map(|v| v.tscore).collect();

        let factors = match policy {
            MissingBin::AsLevel => {
                let age: Vec<&str> = binned
                    .age_groups()
                    .iter()
                    .map(|b| binned.age_bins().label_or_missing(*b))
                    .collect();
                let time: Vec<&str> = binned
                    .half_decs()
                    .iter()
                    .map(|b| binned.time_bins().label_or_missing(*b))
                    .collect();
                let sex: Vec<&str> = table.iter().map(|v| v.sex.label()).collect();
                let cohort: Vec<&str> = table.iter().map(|v| v.cohort.label()).collect();
                vec![
                    Factor::lexical(AGE_GROUPS, &age),
                    Factor::lexical(HALF_DECS, &time),
                    Factor::lexical(SEX, &sex),
                    Factor::lexical(COHORT, &cohort),
                ]
            }
            MissingBin::Drop => vec![
                Factor::from_bins(AGE_GROUPS, binned.age_bins(), binned.age_groups()),
                Factor::from_bins(HALF_DECS, binned.time_bins(), binned.half_decs()),
                Factor {
                    name: SEX.to_string(),
                    levels: vec![Sex::Male.label().to_string(), Sex::Female.label().to_string()],
                    codes: table
                        .iter()
                        .map(|v| match v.sex {
                            Sex::Male => Some(0),
                            Sex::Female => Some(1),
                            Sex::Unknown => None,
                        })
                        .collect(),
                },
                Factor {
                    name: COHORT.to_string(),
                    levels: Cohort::ALL.iter().map(|c| c.label().to_string()).collect(),
                    codes: table
                        .iter()
                        .map(|v| Cohort::ALL.iter().position(|c| *c == v.cohort))
                        .collect(),
                },
            ],
        };

        Self {
            response,
            factors,
            policy,
        }
    }

    /// Look up a factor by name
    pub fn factor(&self, name: &str) -> Result<&Factor> {
        self.factors.iter().find(|f| f.name == name).ok_or_else(|| {
            let known: Vec<&str> = self.factors.iter().map(|f| f.name.as_str()).collect();
            BmdError::ModelError(format!(
                "unknown variable '{name}'; available factors: {}",
                known.join(", ")
            ))
        })
    }

    /// Treatment-coded design matrix for `formula`
    ///
    /// Each factor's first level is the baseline and gets no column.
    /// Interaction columns are products of the coded columns of their
    /// factors, with the first factor varying fastest.
    pub fn design(&self, formula: &Formula) -> Result<DesignMatrix> {
        if formula.response != RESPONSE {
            return Err(BmdError::ModelError(format!(
                "unknown response '{}'; only '{RESPONSE}' can be modelled",
                formula.response
            )));
        }

        let used: Vec<&Factor> = formula
            .factors()
            .into_iter()
            .map(|name| self.factor(name))
            .collect::<Result<_>>()?;

        // Rows with a missing response, or a missing code in a used factor
        let rows: Vec<usize> = (0..self.response.len())
            .filter(|&i| !self.response[i].is_nan())
            .filter(|&i| used.iter().all(|f| f.codes[i].is_some()))
            .collect();
        let dropped_rows = self.response.len() - rows.len();
        if dropped_rows > 0 {
            log::debug!("{dropped_rows} rows dropped for missing values in {formula}");
        }
        if rows.is_empty() {
            return Err(BmdError::ModelError(format!(
                "no complete rows to fit {formula}"
            )));
        }

        let mut column_names = vec!["Intercept".to_string()];
        let mut column_terms = vec![0];
        let mut columns: Vec<Vec<f64>> = vec![vec![1.0; rows.len()]];
        let mut term_names = vec!["Intercept".to_string()];

        for (term_idx, term) in formula.terms.iter().enumerate() {
            term_names.push(term.to_string());
            for (name, values) in self.term_columns(term, &rows)? {
                column_names.push(name);
                column_terms.push(term_idx + 1);
                columns.push(values);
            }
        }

        let n = rows.len();
        let p = columns.len();
        let x = Array2::from_shape_fn((n, p), |(i, j)| columns[j][i]);
        let y = rows.iter().map(|&i| self.response[i]).collect();

        Ok(DesignMatrix {
            x,
            y,
            column_names,
            column_terms,
            term_names,
            dropped_rows,
        })
    }

    fn term_columns(&self, term: &Term, rows: &[usize]) -> Result<Vec<(String, Vec<f64>)>> {
        let mut columns: Vec<(String, Vec<f64>)> = vec![(String::new(), vec![1.0; rows.len()])];
        for factor_name in term.factors() {
            let factor = self.factor(factor_name)?;
            let mut next = Vec::new();
            // Outer loop over this factor's levels keeps earlier factors varying fastest
            for (level_idx, level) in factor.levels.iter().enumerate().skip(1) {
                for (prefix, values) in &columns {
                    let name = if prefix.is_empty() {
                        format!("{}[T.{level}]", factor.name)
                    } else {
                        format!("{prefix}:{}[T.{level}]", factor.name)
                    };
                    let coded = rows
                        .iter()
                        .zip(values)
                        .map(|(&row, v)| {
                            if factor.codes[row] == Some(level_idx) { *v } else { 0.0 }
                        })
                        .collect();
                    next.push((name, coded));
                }
            }
            columns = next;
        }
        Ok(columns)
    }
}

impl DesignMatrix {
    #[must_use]
    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    #[must_use]
    pub fn ncols(&self) -> usize {
        self.x.ncols()
    }
}
