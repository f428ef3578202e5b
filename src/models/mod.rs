//! Domain models for the cohort scans

pub mod collection;
pub mod types;
pub mod visit;

pub use collection::{Trajectory, VisitTable};
pub use types::{Cohort, Sex};
pub use visit::SubjectVisit;
