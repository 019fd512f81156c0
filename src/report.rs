//! Serving-side lookups over the published mappings.
//!
//! A course is reported only when every mapping has an entry for it; otherwise the lookup
//! is [`Lookup::NoData`], which callers render as an empty state rather than an error.

use serde::Serialize;
use std::fmt::Write;

use crate::analyzers::types::{GradeSummary, TimeSummary};
use crate::output::OutputSet;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseReport {
    pub code: String,
    pub ranking: Vec<String>,
    pub time: TimeSummary,
    pub grade: GradeSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Lookup {
    Found(CourseReport),
    NoData { code: String },
}

/// `"ECE 35"` → `"ece/35"`.
pub fn course_slug(code: &str) -> String {
    code.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("/")
}

/// `("ece", "35")` → `"ECE 35"`.
pub fn code_from_path(dept: &str, number: &str) -> String {
    format!("{} {}", dept.trim(), number.trim()).to_uppercase()
}

/// Every course with a ranking, in key order, paired with its slug.
pub fn course_list(outputs: &OutputSet) -> Vec<(String, String)> {
    outputs
        .ranking
        .keys()
        .map(|code| (code.clone(), course_slug(code)))
        .collect()
}

pub fn lookup(outputs: &OutputSet, code: &str) -> Lookup {
    let code = code.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase();

    match (
        outputs.ranking.get(&code),
        outputs.time.get(&code),
        outputs.grade.get(&code),
    ) {
        (Some(ranking), Some(time), Some(grade)) => Lookup::Found(CourseReport {
            code,
            ranking: ranking.clone(),
            time: time.clone(),
            grade: grade.clone(),
        }),
        _ => Lookup::NoData { code },
    }
}

/// Plain-text rendering of a lookup.
pub fn render(lookup: &Lookup) -> String {
    let mut output = String::new();

    match lookup {
        Lookup::NoData { code } => {
            let _ = writeln!(output, "# {code}");
            let _ = writeln!(output, "No evaluation data is available for {code}.");
        }
        Lookup::Found(report) => {
            let _ = writeln!(output, "# {}", report.code);
            let _ = writeln!(output);
            let _ = writeln!(output, "## Instructors");
            for (rank, name) in report.ranking.iter().enumerate() {
                let _ = writeln!(output, "{}. {}", rank + 1, name);
            }

            let _ = writeln!(output);
            let _ = writeln!(output, "## Time");
            let _ = writeln!(
                output,
                "{} hours per week [{}]",
                report.time.expected, report.time.assessment.color
            );
            let _ = writeln!(output, "{}", report.time.assessment.statement);

            let _ = writeln!(output);
            let _ = writeln!(output, "## Grade");
            let _ = writeln!(
                output,
                "Expected grade {} [{}]",
                report.grade.expected_letter_grade, report.grade.assessment.color
            );
            let _ = writeln!(output, "{}", report.grade.assessment.statement);
        }
    }

    output
}
