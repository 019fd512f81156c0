use std::collections::BTreeMap;
use tracing::error;

use crate::analyzers::assessment::{Assessment, Category, Statements};
use crate::analyzers::types::{GradeResult, GradeSummary};
use crate::analyzers::utility::{mean, round2};
use crate::cleaner::CleanRecord;
use crate::error::GradeError;

pub const GRADE_STATEMENTS: Statements = Statements {
    warn: "Students tend to get lower grades than they expect for this course.",
    neutral: "Students tend to get the grade they expect for this course.",
    relax: "Students tend to get higher grades than they expect for this course.",
};

/// Distance between actual and expected GPA beyond which a course is called out.
pub const GRADE_THRESHOLD: f64 = 0.4;

/// Converts a GPA (0.0–4.0) into a letter grade.
///
/// | Range   | Grade |
/// |---------|-------|
/// | >= 4.0  | A     |
/// | >= 3.7  | A-    |
/// | >= 3.3  | B+    |
/// | >= 3.0  | B     |
/// | >= 2.7  | B-    |
/// | >= 2.3  | C+    |
/// | >= 2.0  | C     |
/// | >= 1.7  | C-    |
/// | >= 1.0  | D     |
///
/// # Errors
///
/// Anything below 1.0 has no letter and yields [`GradeError::OutOfRangeGpa`].
pub fn letter_grade(gpa: f64) -> Result<&'static str, GradeError> {
    match gpa {
        g if g >= 4.0 => Ok("A"),
        g if g >= 3.7 => Ok("A-"),
        g if g >= 3.3 => Ok("B+"),
        g if g >= 3.0 => Ok("B"),
        g if g >= 2.7 => Ok("B-"),
        g if g >= 2.3 => Ok("C+"),
        g if g >= 2.0 => Ok("C"),
        g if g >= 1.7 => Ok("C-"),
        g if g >= 1.0 => Ok("D"),
        _ => Err(GradeError::OutOfRangeGpa { gpa }),
    }
}

/// Above the threshold students do better than they expect; below its negation, worse.
/// Exactly ±0.4 is neutral.
pub fn classify_grade(deviation: f64) -> Category {
    if deviation > GRADE_THRESHOLD {
        Category::Relax
    } else if deviation < -GRADE_THRESHOLD {
        Category::Warn
    } else {
        Category::Neutral
    }
}

/// A course left out of [`GradeResult`] because its average has no letter grade.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseGradeError {
    pub course: String,
    pub error: GradeError,
}

#[derive(Debug, Clone, Default)]
pub struct GradeAssessment {
    pub grades: GradeResult,
    pub errors: Vec<CourseGradeError>,
}

/// Per-course expected vs received GPA.
///
/// The letter shown for a course comes from the rounded *received* average, so readers see
/// what students actually got rather than what they hoped for.
pub fn assess_grades(records: &[CleanRecord]) -> GradeAssessment {
    let mut gpas: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for r in records {
        let entry = gpas.entry(r.course.as_str()).or_default();
        entry.0.push(r.gpa_expected);
        entry.1.push(r.gpa_actual);
    }

    let mut out = GradeAssessment::default();

    for (course, (expected, actual)) in gpas {
        let gpa_expected = round2(mean(&expected));
        let gpa_actual = round2(mean(&actual));
        let deviation = round2(gpa_actual - gpa_expected);

        let letter = match letter_grade(gpa_actual) {
            Ok(letter) => letter,
            Err(e) => {
                error!(course, gpa = gpa_actual, error = %e, "Course average has no letter grade");
                out.errors.push(CourseGradeError {
                    course: course.to_string(),
                    error: e,
                });
                continue;
            }
        };

        out.grades.insert(
            course.to_string(),
            GradeSummary {
                expected_letter_grade: letter.to_string(),
                gpa_expected,
                gpa_actual,
                assessment: Assessment::new(
                    classify_grade(deviation),
                    &GRADE_STATEMENTS,
                    deviation,
                ),
            },
        );
    }

    out
}
