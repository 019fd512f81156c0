//! Instructor ranking by the lower bound of a Wilson score interval.
//!
//! Sorting by raw recommendation rate lets an instructor with 3/3 positive responses
//! outrank one with 180/200. The Wilson lower bound shrinks toward zero for small samples,
//! so sparse evidence ranks below strong evidence.

use std::collections::BTreeMap;

use crate::analyzers::types::{CourseAggregate, RankingResult};
use crate::cleaner::CleanRecord;

/// Two-sided 95% normal quantile.
pub const Z_95: f64 = 1.959963984540054;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WilsonInterval {
    pub lower: f64,
    pub upper: f64,
}

/// Wilson score interval for `successes` out of `trials` at normal quantile `z`.
///
/// Returns `None` when `trials == 0`; there is no interval without observations.
pub fn wilson_interval(successes: u64, trials: u64, z: f64) -> Option<WilsonInterval> {
    if trials == 0 {
        return None;
    }

    let n = trials as f64;
    let p = successes.min(trials) as f64 / n;
    let z2 = z * z;

    let denom = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denom;
    let margin = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denom;

    Some(WilsonInterval {
        lower: (center - margin).max(0.0),
        upper: (center + margin).min(1.0),
    })
}

#[derive(Debug, Clone)]
struct RankedInstructor {
    instructor: String,
    lower: f64,
}

/// Orders instructors within each course by descending Wilson lower bound.
///
/// Exactly equal lower bounds fall back to instructor name, ascending.
pub fn rank_instructors(records: &[CleanRecord]) -> RankingResult {
    let mut groups: BTreeMap<(&str, &str), CourseAggregate> = BTreeMap::new();

    for r in records {
        let entry = groups
            .entry((r.course.as_str(), r.instructor.as_str()))
            .or_default();
        entry.evals += u64::from(r.evals);
        entry.weighted_evals += u64::from(r.instructor_weighted_evals);
    }

    let mut by_course: BTreeMap<String, Vec<RankedInstructor>> = BTreeMap::new();

    for ((course, instructor), agg) in groups {
        let Some(interval) = wilson_interval(agg.weighted_evals, agg.evals, Z_95) else {
            continue;
        };
        by_course
            .entry(course.to_string())
            .or_default()
            .push(RankedInstructor {
                instructor: instructor.to_string(),
                lower: interval.lower,
            });
    }

    by_course
        .into_iter()
        .map(|(course, mut ranked)| {
            ranked.sort_by(|a, b| {
                b.lower
                    .total_cmp(&a.lower)
                    .then_with(|| a.instructor.cmp(&b.instructor))
            });
            let names = ranked.into_iter().map(|r| r.instructor).collect();
            (course, names)
        })
        .collect()
}
