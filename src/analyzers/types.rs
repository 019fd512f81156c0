//! Output mappings produced by one pipeline run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analyzers::assessment::Assessment;

/// Course code → instructor names, best first.
pub type RankingResult = BTreeMap<String, Vec<String>>;

/// Course code → time-commitment summary.
pub type TimeResult = BTreeMap<String, TimeSummary>;

/// Course code → grading summary.
pub type GradeResult = BTreeMap<String, GradeSummary>;

/// Department → naturally sorted course numbers.
pub type CatalogIndex = BTreeMap<String, Vec<String>>;

/// Per (course, instructor) sums across terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseAggregate {
    pub evals: u64,
    pub weighted_evals: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSummary {
    /// Average study hours per week, rounded to two decimals.
    pub expected: f64,
    #[serde(flatten)]
    pub assessment: Assessment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeSummary {
    /// Letter for the rounded average grade students actually received.
    pub expected_letter_grade: String,
    pub gpa_expected: f64,
    pub gpa_actual: f64,
    #[serde(flatten)]
    pub assessment: Assessment,
}
