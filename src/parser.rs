//! CSV reader for scraped evaluation rows and parsers for their composite text fields.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::error::FieldError;

/// One scraped row, exactly as the upstream table presents it.
///
/// Column names are the scraper's headers; any other columns in the file are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Instructor")]
    pub instructor: Option<String>,
    #[serde(rename = "Course")]
    pub course: Option<String>,
    #[serde(rename = "Term")]
    pub term: Option<String>,
    #[serde(rename = "Evals Made")]
    pub evals: Option<String>,
    #[serde(rename = "Rcmnd Class")]
    pub recommend_class: Option<String>,
    #[serde(rename = "Rcmnd Instr")]
    pub recommend_instructor: Option<String>,
    #[serde(rename = "Study Hrs/wk")]
    pub study_hours: Option<String>,
    #[serde(rename = "Avg Grade Expected")]
    pub grade_expected: Option<String>,
    #[serde(rename = "Avg Grade Received")]
    pub grade_actual: Option<String>,
}

/// Column names the upstream scraper promises to emit.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "Instructor",
    "Course",
    "Term",
    "Evals Made",
    "Rcmnd Class",
    "Rcmnd Instr",
    "Study Hrs/wk",
    "Avg Grade Expected",
    "Avg Grade Received",
];

/// A data row that could not be decoded at all, e.g. a field that is not UTF-8.
#[derive(Debug, Clone, PartialEq)]
pub struct UnreadableRow {
    /// Zero-based position among the data rows of the input.
    pub position: usize,
    pub message: String,
}

/// Every data row of one input, decoded or not.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub rows: Vec<RawRecord>,
    pub unreadable: Vec<UnreadableRow>,
    positions: Vec<usize>,
}

impl RawTable {
    /// Input position of `rows[index]`.
    pub fn position(&self, index: usize) -> usize {
        self.positions.get(index).copied().unwrap_or(index)
    }

    pub fn total_rows(&self) -> usize {
        self.rows.len() + self.unreadable.len()
    }
}

impl From<Vec<RawRecord>> for RawTable {
    fn from(rows: Vec<RawRecord>) -> Self {
        Self {
            positions: (0..rows.len()).collect(),
            rows,
            unreadable: Vec::new(),
        }
    }
}

/// Decodes CSV bytes into raw rows.
///
/// A row that fails to decode is kept aside in [`RawTable::unreadable`]; the rest still load.
///
/// # Errors
///
/// Returns an error if the header row is unreadable or lacks any of [`REQUIRED_COLUMNS`].
pub fn parse_raw_csv(bytes: &[u8]) -> Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = rdr.headers().context("CSV header row is unreadable")?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    anyhow::ensure!(
        missing.is_empty(),
        "CSV header is missing required columns: {}",
        missing.join(", ")
    );
    let byte_headers = rdr.byte_headers()?.clone();

    let mut table = RawTable::default();
    for (position, result) in rdr.byte_records().enumerate() {
        let decoded = result
            .map_err(|e| e.to_string())
            .and_then(|record| {
                record
                    .deserialize::<RawRecord>(Some(&byte_headers))
                    .map_err(|e| e.to_string())
            });

        match decoded {
            Ok(record) => {
                table.rows.push(record);
                table.positions.push(position);
            }
            Err(message) => {
                warn!(position, error = %message, "Unreadable CSV row");
                table.unreadable.push(UnreadableRow { position, message });
            }
        }
    }

    Ok(table)
}

/// `"87.3 %"` → `0.873`.
pub fn parse_percentage(field: &'static str, text: &str) -> Result<f64, FieldError> {
    let residual = text.trim().trim_end_matches('%').trim_end();
    let pct: f64 = residual.parse().map_err(|_| FieldError::Percentage {
        field,
        value: text.to_string(),
    })?;

    if !(0.0..=100.0).contains(&pct) {
        return Err(FieldError::PercentageRange { field, value: pct });
    }

    Ok(pct / 100.0)
}

/// Extracts the numeric GPA from `"<letter> (<gpa>)"`. The letter is not trusted.
pub fn parse_gpa(field: &'static str, text: &str) -> Result<f64, FieldError> {
    let malformed = || FieldError::Grade {
        field,
        value: text.to_string(),
    };

    let (_, tail) = text.rsplit_once('(').ok_or_else(malformed)?;
    let number = tail.trim().strip_suffix(')').ok_or_else(malformed)?.trim();
    let gpa: f64 = number.parse().map_err(|_| malformed())?;

    if !(0.0..=4.0).contains(&gpa) {
        return Err(FieldError::GpaRange { field, value: gpa });
    }

    Ok(gpa)
}

/// `"cse 8a - Intro to Programming"` → `"CSE 8A"`.
pub fn parse_course_code(text: &str) -> Result<String, FieldError> {
    let prefix = text.split(" - ").next().unwrap_or_default();
    let tokens: Vec<&str> = prefix.split_whitespace().collect();

    match tokens.as_slice() {
        [dept, number] => Ok(format!(
            "{} {}",
            dept.to_uppercase(),
            number.to_uppercase()
        )),
        _ => Err(FieldError::Course {
            value: text.to_string(),
        }),
    }
}

/// Response counts sometimes arrive as `"45.0"`; integral floats are accepted.
pub fn parse_count(field: &'static str, text: &str) -> Result<u32, FieldError> {
    let text = text.trim();
    if let Ok(n) = text.parse::<u32>() {
        return Ok(n);
    }

    match text.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => {
            Ok(v as u32)
        }
        _ => Err(FieldError::Number {
            field,
            value: text.to_string(),
        }),
    }
}

pub fn parse_hours(field: &'static str, text: &str) -> Result<f64, FieldError> {
    match text.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(FieldError::Number {
            field,
            value: text.to_string(),
        }),
    }
}
