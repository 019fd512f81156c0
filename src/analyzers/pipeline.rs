//! One pipeline run: clean the raw rows once, then derive every output mapping from them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::analyzers::catalog::index_catalog;
use crate::analyzers::grade::{CourseGradeError, assess_grades};
use crate::analyzers::ranking::rank_instructors;
use crate::analyzers::time::assess_time;
use crate::analyzers::types::{CatalogIndex, GradeResult, RankingResult, TimeResult};
use crate::cleaner::{CleanStats, DroppedRecord, clean_table};
use crate::config::TermWindow;
use crate::parser::RawTable;

/// Counts describing a run, written next to the mappings as `summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub terms: Vec<String>,
    pub cleaning: CleanStats,
    pub ranked_courses: usize,
    pub timed_courses: usize,
    pub graded_courses: usize,
    pub departments: usize,
    pub grade_errors: Vec<String>,
}

/// The four output mappings of a run plus what was discarded on the way.
///
/// Built once from raw input; read-only afterwards.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub ranking: RankingResult,
    pub time: TimeResult,
    pub grade: GradeResult,
    pub catalog: CatalogIndex,
    pub dropped: Vec<DroppedRecord>,
    pub grade_errors: Vec<CourseGradeError>,
    pub clean_stats: CleanStats,
}

impl PipelineRun {
    #[tracing::instrument(skip_all, fields(rows = raw.total_rows(), terms = window.len()))]
    pub fn build(raw: &RawTable, window: &TermWindow) -> Self {
        let cleaned = clean_table(raw, window);
        let records = &cleaned.records;

        let ranking = rank_instructors(records);
        let time = assess_time(records);
        let grades = assess_grades(records);
        let catalog = index_catalog(records);

        info!(
            ranked = ranking.len(),
            timed = time.len(),
            graded = grades.grades.len(),
            grade_errors = grades.errors.len(),
            departments = catalog.len(),
            "Pipeline run complete"
        );

        Self {
            ranking,
            time,
            grade: grades.grades,
            catalog,
            dropped: cleaned.dropped,
            grade_errors: grades.errors,
            clean_stats: cleaned.stats,
        }
    }

    pub fn summary(&self, window: &TermWindow) -> RunSummary {
        RunSummary {
            generated_at: Utc::now(),
            terms: window.iter().map(str::to_string).collect(),
            cleaning: self.clean_stats.clone(),
            ranked_courses: self.ranking.len(),
            timed_courses: self.time.len(),
            graded_courses: self.grade.len(),
            departments: self.catalog.len(),
            grade_errors: self
                .grade_errors
                .iter()
                .map(|e| format!("{}: {}", e.course, e.error))
                .collect(),
        }
    }
}
