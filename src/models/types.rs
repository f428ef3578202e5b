//! Common domain type definitions
//!
//! Small enums shared by the visit model, the model frame and the charts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sex of a subject, decoded from the spreadsheet code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sex {
    /// Code 1
    Male,
    /// Code 2
    Female,
    /// Any other code, or missing
    Unknown,
}

impl Sex {
    /// Label used in tables, charts and model columns
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<Option<i64>> for Sex {
    fn from(code: Option<i64>) -> Self {
        match code {
            Some(1) => Self::Male,
            Some(2) => Self::Female,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The two Framingham populations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cohort {
    Original,
    Offspring,
}

impl Cohort {
    /// Both cohorts, in load order
    pub const ALL: [Self; 2] = [Self::Original, Self::Offspring];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Offspring => "offspring",
        }
    }
}

impl fmt::Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
