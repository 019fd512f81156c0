//! Record cleaning: raw scraped rows in, typed and validated records out.
//!
//! A row that fails any check is dropped on its own with a [`DropReason`]; one bad row
//! never aborts the run.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

use crate::config::TermWindow;
use crate::error::FieldError;
use crate::parser::{
    RawRecord, RawTable, parse_count, parse_course_code, parse_gpa, parse_hours, parse_percentage,
};

/// A validated survey row. Every field is populated and `evals > 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanRecord {
    pub instructor: String,
    pub course: String,
    pub term: String,
    pub evals: u32,
    pub recommend_class: f64,
    pub recommend_instructor: f64,
    pub class_weighted_evals: u32,
    pub instructor_weighted_evals: u32,
    pub study_hours: f64,
    pub gpa_expected: f64,
    pub gpa_actual: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    MissingField(&'static str),
    ZeroEvals,
    Malformed(FieldError),
    /// The row never decoded into fields.
    Unreadable(String),
}

impl DropReason {
    /// Stable label used for counting drops in the run summary.
    pub fn label(&self) -> &'static str {
        match self {
            DropReason::MissingField(_) => "missing_field",
            DropReason::ZeroEvals => "zero_evals",
            DropReason::Malformed(_) => "malformed",
            DropReason::Unreadable(_) => "unreadable",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::MissingField(field) => write!(f, "missing {field}"),
            DropReason::ZeroEvals => write!(f, "no evaluations made"),
            DropReason::Malformed(e) => write!(f, "{e}"),
            DropReason::Unreadable(message) => write!(f, "unreadable row: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRecord {
    /// Zero-based position in the raw input.
    pub row: usize,
    pub reason: DropReason,
}

/// Counts reported for one cleaning pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanStats {
    pub input_rows: usize,
    pub outside_window: usize,
    pub kept: usize,
    pub dropped: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Default)]
pub struct CleanOutcome {
    pub records: Vec<CleanRecord>,
    pub dropped: Vec<DroppedRecord>,
    pub stats: CleanStats,
}

/// `round(evals × rate)`, half away from zero. Never exceeds `evals` for a rate in `[0, 1]`.
pub fn weighted_evals(evals: u32, rate: f64) -> u32 {
    ((evals as f64 * rate).round() as u32).min(evals)
}

/// Cleans every raw row admitted by `window`.
pub fn clean(raw: &[RawRecord], window: &TermWindow) -> CleanOutcome {
    let mut outcome = CleanOutcome::default();
    outcome.stats.input_rows = raw.len();

    for (row, record) in raw.iter().enumerate() {
        let admitted = record
            .term
            .as_deref()
            .is_some_and(|term| window.admits(term));
        if !admitted {
            outcome.stats.outside_window += 1;
            continue;
        }

        match clean_record(record) {
            Ok(clean) => outcome.records.push(clean),
            Err(reason) => {
                debug!(row, reason = %reason, "Dropping record");
                *outcome
                    .stats
                    .dropped
                    .entry(reason.label().to_string())
                    .or_default() += 1;
                outcome.dropped.push(DroppedRecord { row, reason });
            }
        }
    }

    outcome.stats.kept = outcome.records.len();

    info!(
        input_rows = outcome.stats.input_rows,
        outside_window = outcome.stats.outside_window,
        kept = outcome.stats.kept,
        dropped = outcome.dropped.len(),
        "Cleaning complete"
    );

    outcome
}

/// Cleans a decoded table. Rows that never decoded count as `unreadable` drops, and every
/// [`DroppedRecord::row`] refers to the row's position in the original input.
pub fn clean_table(table: &RawTable, window: &TermWindow) -> CleanOutcome {
    let mut outcome = clean(&table.rows, window);

    for dropped in &mut outcome.dropped {
        dropped.row = table.position(dropped.row);
    }

    for row in &table.unreadable {
        outcome.stats.input_rows += 1;
        *outcome
            .stats
            .dropped
            .entry(DropReason::Unreadable(String::new()).label().to_string())
            .or_default() += 1;
        outcome.dropped.push(DroppedRecord {
            row: row.position,
            reason: DropReason::Unreadable(row.message.clone()),
        });
    }
    outcome.dropped.sort_by_key(|d| d.row);

    outcome
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, DropReason> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DropReason::MissingField(field)),
    }
}

/// Validates a single admitted row.
pub fn clean_record(raw: &RawRecord) -> Result<CleanRecord, DropReason> {
    let instructor = required(&raw.instructor, "instructor")?;
    let course = required(&raw.course, "course")?;
    let term = required(&raw.term, "term")?;
    let evals = required(&raw.evals, "evals")?;
    let recommend_class = required(&raw.recommend_class, "recommend_class")?;
    let recommend_instructor = required(&raw.recommend_instructor, "recommend_instructor")?;
    let study_hours = required(&raw.study_hours, "study_hours")?;
    let grade_expected = required(&raw.grade_expected, "grade_expected")?;
    let grade_actual = required(&raw.grade_actual, "grade_actual")?;

    let evals = parse_count("evals", evals).map_err(DropReason::Malformed)?;
    if evals == 0 {
        return Err(DropReason::ZeroEvals);
    }

    let parsed = (|| -> Result<CleanRecord, FieldError> {
        let course = parse_course_code(course)?;
        let recommend_class = parse_percentage("recommend_class", recommend_class)?;
        let recommend_instructor = parse_percentage("recommend_instructor", recommend_instructor)?;

        Ok(CleanRecord {
            instructor: instructor.to_string(),
            course,
            term: term.to_uppercase(),
            evals,
            recommend_class,
            recommend_instructor,
            class_weighted_evals: weighted_evals(evals, recommend_class),
            instructor_weighted_evals: weighted_evals(evals, recommend_instructor),
            study_hours: parse_hours("study_hours", study_hours)?,
            gpa_expected: parse_gpa("grade_expected", grade_expected)?,
            gpa_actual: parse_gpa("grade_actual", grade_actual)?,
        })
    })();

    parsed.map_err(DropReason::Malformed)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn raw(instructor: &str, course: &str, term: &str, evals: &str) -> RawRecord {
        RawRecord {
            instructor: Some(instructor.to_string()),
            course: Some(course.to_string()),
            term: Some(term.to_string()),
            evals: Some(evals.to_string()),
            recommend_class: Some("80.0 %".to_string()),
            recommend_instructor: Some("90.0 %".to_string()),
            study_hours: Some("6.5".to_string()),
            grade_expected: Some("B+ (3.40)".to_string()),
            grade_actual: Some("B (3.10)".to_string()),
        }
    }

    fn window() -> TermWindow {
        TermWindow::new(["FA16", "WI17"])
    }

    #[test]
    fn test_clean_record_types_every_field() {
        let record = clean_record(&raw("Doe, Jane", "ECE 35 - Analog Design", "fa16", "40")).unwrap();

        assert_eq!(record.course, "ECE 35");
        assert_eq!(record.term, "FA16");
        assert_eq!(record.evals, 40);
        assert_eq!(record.recommend_class, 0.8);
        assert_eq!(record.recommend_instructor, 0.9);
        assert_eq!(record.class_weighted_evals, 32);
        assert_eq!(record.instructor_weighted_evals, 36);
        assert_eq!(record.study_hours, 6.5);
        assert_eq!(record.gpa_expected, 3.4);
        assert_eq!(record.gpa_actual, 3.1);
    }

    #[test]
    fn test_weighted_evals_rounds_half_away_from_zero() {
        assert_eq!(weighted_evals(3, 0.5), 2);
        assert_eq!(weighted_evals(5, 0.5), 3);
        assert_eq!(weighted_evals(10, 0.04), 0);
        assert_eq!(weighted_evals(100, 0.6), 60);
    }

    #[test]
    fn test_weighted_evals_stays_within_bounds() {
        for evals in [1u32, 2, 3, 7, 19, 250, 1000] {
            for permille in 0..=1000 {
                let rate = permille as f64 / 1000.0;
                let w = weighted_evals(evals, rate);
                assert!(w <= evals, "{evals} × {rate} gave {w}");
            }
        }
    }

    #[test]
    fn test_clean_filters_terms_before_validating() {
        let mut bad = raw("A", "ECE 35 - X", "SP15", "10");
        bad.recommend_class = Some("garbage".to_string());
        let rows = vec![bad, raw("B", "ECE 35 - X", "WI17", "10")];

        let outcome = clean(&rows, &window());

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.stats.outside_window, 1);
        assert!(outcome.dropped.is_empty());
    }

    #[test]
    fn test_clean_drops_missing_zero_and_malformed_rows() {
        let mut missing = raw("A", "ECE 35 - X", "FA16", "10");
        missing.study_hours = None;
        let mut blank = raw("B", "ECE 35 - X", "FA16", "10");
        blank.grade_actual = Some("   ".to_string());
        let zero = raw("C", "ECE 35 - X", "FA16", "0");
        let mut malformed = raw("D", "ECE 35 - X", "FA16", "10");
        malformed.recommend_instructor = Some("ninety %".to_string());
        let good = raw("E", "ECE 35 - X", "FA16", "10");

        let outcome = clean(&[missing, blank, zero, malformed, good], &window());

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].instructor, "E");
        assert_eq!(outcome.dropped.len(), 4);
        assert_eq!(outcome.dropped[0].row, 0);
        assert_eq!(
            outcome.dropped[0].reason,
            DropReason::MissingField("study_hours")
        );
        assert_eq!(
            outcome.dropped[1].reason,
            DropReason::MissingField("grade_actual")
        );
        assert_eq!(outcome.dropped[2].reason, DropReason::ZeroEvals);
        assert!(matches!(
            outcome.dropped[3].reason,
            DropReason::Malformed(FieldError::Percentage { field: "recommend_instructor", .. })
        ));
        assert_eq!(outcome.stats.dropped.get("missing_field"), Some(&2));
        assert_eq!(outcome.stats.dropped.get("zero_evals"), Some(&1));
        assert_eq!(outcome.stats.dropped.get("malformed"), Some(&1));
    }

    #[test]
    fn test_clean_table_counts_unreadable_rows_and_keeps_the_rest() {
        let mut csv = b"Instructor,Course,Term,Evals Made,Rcmnd Class,Rcmnd Instr,Study Hrs/wk,Avg Grade Expected,Avg Grade Received\n".to_vec();
        csv.extend_from_slice(b"Bad\xff,ECE 35 - X,FA16,10,80 %,90 %,6.5,B+ (3.40),B (3.10)\n");
        csv.extend_from_slice(b"Good,ECE 35 - X,FA16,10,80 %,90 %,6.5,B+ (3.40),B (3.10)\n");
        csv.extend_from_slice(b"Zero,ECE 35 - X,FA16,0,80 %,90 %,6.5,B+ (3.40),B (3.10)\n");
        let table = crate::parser::parse_raw_csv(&csv).unwrap();

        let outcome = clean_table(&table, &window());

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].instructor, "Good");
        assert_eq!(outcome.stats.input_rows, 3);
        assert_eq!(outcome.stats.dropped.get("unreadable"), Some(&1));
        assert_eq!(outcome.stats.dropped.get("zero_evals"), Some(&1));
        assert_eq!(outcome.dropped[0].row, 0);
        assert!(matches!(outcome.dropped[0].reason, DropReason::Unreadable(_)));
        assert_eq!(outcome.dropped[1].row, 2);
        assert_eq!(outcome.dropped[1].reason, DropReason::ZeroEvals);
    }

    #[test]
    fn test_clean_treats_missing_term_as_outside_window() {
        let mut no_term = raw("A", "ECE 35 - X", "FA16", "10");
        no_term.term = None;

        let outcome = clean(&[no_term], &window());

        assert!(outcome.records.is_empty());
        assert_eq!(outcome.stats.outside_window, 1);
    }
}
