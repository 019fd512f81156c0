//! Typed errors for field parsing and grade conversion.

use thiserror::Error;

/// A single raw field failed type coercion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("{field}: expected a percentage like \"87.3 %\", got {value:?}")]
    Percentage { field: &'static str, value: String },

    #[error("{field}: percentage {value} is outside 0..=100")]
    PercentageRange { field: &'static str, value: f64 },

    #[error("{field}: expected a grade like \"A- (3.55)\", got {value:?}")]
    Grade { field: &'static str, value: String },

    #[error("{field}: GPA {value} is outside 0.0..=4.0")]
    GpaRange { field: &'static str, value: f64 },

    #[error("{field}: expected a non-negative number, got {value:?}")]
    Number { field: &'static str, value: String },

    #[error("course: expected \"DEPT NUM - Title\", got {value:?}")]
    Course { value: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradeError {
    #[error("GPA {gpa} is below the lowest letter-grade threshold (1.0)")]
    OutOfRangeGpa { gpa: f64 },
}
