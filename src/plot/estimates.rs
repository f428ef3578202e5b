//! Point estimates behind the point plots.
//!
//! For every (facet, hue, x) cell the mean score is reported together with
//! a percentile bootstrap 95% confidence interval. Everything here is pure
//! so the numbers can be checked without rendering anything.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::algorithm::binning::{BinnedRow, BinnedTable};
use crate::models::Sex;

/// A categorical grouping of visits used for x, hue or facets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// Everything in one group
    All,
    AgeGroup,
    HalfDecade,
    /// Male and Female only; unknown sex is left out
    Sex,
}

impl Grouping {
    /// Level labels in display order
    #[must_use]
    pub fn levels(self, binned: &BinnedTable) -> Vec<String> {
        match self {
            Self::All => vec![String::new()],
            Self::AgeGroup => binned.age_bins().labels().to_vec(),
            Self::HalfDecade => binned.time_bins().labels().to_vec(),
            Self::Sex => vec![Sex::Male.label().to_string(), Sex::Female.label().to_string()],
        }
    }

    /// Level of a row, `None` when the row has no level in this grouping
    #[must_use]
    pub fn code(self, row: &BinnedRow<'_>) -> Option<usize> {
        match self {
            Self::All => Some(0),
            Self::AgeGroup => row.age_group,
            Self::HalfDecade => row.half_dec,
            Self::Sex => match row.visit.sex {
                Sex::Male => Some(0),
                Sex::Female => Some(1),
                Sex::Unknown => None,
            },
        }
    }
}

/// Mean and bootstrap interval for one cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointEstimate {
    pub facet: usize,
    pub hue: usize,
    pub x: usize,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
    pub n: usize,
}

/// Percentile bootstrap interval of the mean
///
/// Returns `(mean, mean)` for a single value.
pub fn bootstrap_ci<R: Rng>(values: &[f64], samples: usize, rng: &mut R) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }
    if n == 1 || samples == 0 {
        let mean = values.iter().sum::<f64>() / n as f64;
        return (mean, mean);
    }

    let mut means: Vec<f64> = (0..samples)
        .map(|_| (0..n).map(|_| values[rng.random_range(0..n)]).sum::<f64>() / n as f64)
        .collect();
    means.sort_by(f64::total_cmp);

    let quantile = |q: f64| {
        // Linear interpolation between order statistics
        let pos = q * (samples - 1) as f64;
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        means[lo] + (means[hi] - means[lo]) * (pos - lo as f64)
    };
    (quantile(0.025), quantile(0.975))
}

/// Mean and bootstrap CI of the score per (facet, hue, x) cell
///
/// Cells are returned ordered by facet, hue, then x; empty cells are omitted.
#[must_use]
pub fn point_estimates(
    binned: &BinnedTable,
    x: Grouping,
    hue: Grouping,
    facet: Grouping,
    samples: usize,
    seed: u64,
) -> Vec<PointEstimate> {
    let mut cells: FxHashMap<(usize, usize, usize), Vec<f64>> = FxHashMap::default();
    for row in binned.rows() {
        if row.visit.tscore.is_nan() {
            continue;
        }
        if let (Some(f), Some(h), Some(xv)) = (facet.code(&row), hue.code(&row), x.code(&row)) {
            cells.entry((f, h, xv)).or_default().push(row.visit.tscore);
        }
    }

    let mut keys: Vec<_> = cells.keys().copied().collect();
    keys.sort_unstable();

    let mut rng = StdRng::seed_from_u64(seed);
    keys.into_iter()
        .map(|key| {
            let values = &cells[&key];
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            let (lower, upper) = bootstrap_ci(values, samples, &mut rng);
            PointEstimate {
                facet: key.0,
                hue: key.1,
                x: key.2,
                mean,
                lower,
                upper,
                n: values.len(),
            }
        })
        .collect()
}
