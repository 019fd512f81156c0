use std::collections::BTreeMap;

use crate::analyzers::assessment::{Assessment, Category, Statements};
use crate::analyzers::types::{TimeResult, TimeSummary};
use crate::analyzers::utility::{mean, round2, sample_stddev};
use crate::cleaner::CleanRecord;

pub const TIME_STATEMENTS: Statements = Statements {
    warn: "This course will take more time outside of class than average.",
    neutral: "This course will take an average amount of time outside of class.",
    relax: "This course might take less time outside of class than average.",
};

/// Places a course's deviation from the global mean against the global standard deviation.
///
/// Above `sd` is a warning, strictly inside `(-sd, sd)` is neutral, and everything else,
/// including `deviation == sd` and `deviation == -sd`, lands on relax.
pub fn classify_time(deviation: f64, sd: f64) -> Category {
    if deviation > sd {
        Category::Warn
    } else if deviation.abs() < sd {
        Category::Neutral
    } else {
        Category::Relax
    }
}

/// Per-course average weekly study hours, compared against all courses.
pub fn assess_time(records: &[CleanRecord]) -> TimeResult {
    let mut hours: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in records {
        hours.entry(r.course.as_str()).or_default().push(r.study_hours);
    }

    let averages: BTreeMap<&str, f64> = hours
        .into_iter()
        .map(|(course, series)| (course, round2(mean(&series))))
        .collect();

    let series: Vec<f64> = averages.values().copied().collect();
    let global_mean = mean(&series);
    let global_sd = sample_stddev(&series, global_mean);

    averages
        .into_iter()
        .map(|(course, expected)| {
            let deviation = expected - global_mean;
            let category = match global_sd {
                Some(sd) => classify_time(deviation, sd),
                None => Category::Neutral,
            };
            let summary = TimeSummary {
                expected,
                assessment: Assessment::new(category, &TIME_STATEMENTS, deviation),
            };
            (course.to_string(), summary)
        })
        .collect()
}
