//! JSON persistence for pipeline outputs.
//!
//! Each mapping lands in its own file under an output directory; the serving side reads
//! them back with [`load_outputs`].

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::pipeline::{PipelineRun, RunSummary};
use crate::analyzers::types::{CatalogIndex, GradeResult, RankingResult, TimeResult};

pub const RANKING_FILE: &str = "ranking.json";
pub const TIME_FILE: &str = "time.json";
pub const GRADE_FILE: &str = "grade.json";
pub const CATALOG_FILE: &str = "catalog.json";
pub const SUMMARY_FILE: &str = "summary.json";

/// The four mappings as read back from disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputSet {
    pub ranking: RankingResult,
    pub time: TimeResult,
    pub grade: GradeResult,
    pub catalog: CatalogIndex,
}

impl From<&PipelineRun> for OutputSet {
    fn from(run: &PipelineRun) -> Self {
        Self {
            ranking: run.ranking.clone(),
            time: run.time.clone(),
            grade: run.grade.clone(),
            catalog: run.catalog.clone(),
        }
    }
}

/// Prints a value as pretty-printed JSON followed by a newline.
pub fn print_json(out: &mut impl Write, value: &impl Serialize) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn write_json(dir: &Path, file: &str, value: &impl Serialize) -> Result<()> {
    let path = dir.join(file);
    let mut body = serde_json::to_vec_pretty(value)?;
    body.push(b'\n');
    fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
    debug!(path = %path.display(), "Wrote JSON");
    Ok(())
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let path = dir.join(file);
    let content =
        fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

/// Writes the four mappings and the run summary into `dir`, creating it if needed.
pub fn write_outputs(dir: impl AsRef<Path>, run: &PipelineRun, summary: &RunSummary) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    write_json(dir, RANKING_FILE, &run.ranking)?;
    write_json(dir, TIME_FILE, &run.time)?;
    write_json(dir, GRADE_FILE, &run.grade)?;
    write_json(dir, CATALOG_FILE, &run.catalog)?;
    write_json(dir, SUMMARY_FILE, summary)?;

    info!(dir = %dir.display(), "Outputs written");
    Ok(())
}

/// Reads the four mappings back from `dir`.
pub fn load_outputs(dir: impl AsRef<Path>) -> Result<OutputSet> {
    let dir = dir.as_ref();
    Ok(OutputSet {
        ranking: read_json(dir, RANKING_FILE)?,
        time: read_json(dir, TIME_FILE)?,
        grade: read_json(dir, GRADE_FILE)?,
        catalog: read_json(dir, CATALOG_FILE)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::tests::raw;
    use crate::config::TermWindow;
    use crate::parser::RawTable;

    fn sample_run() -> (PipelineRun, TermWindow) {
        let window = TermWindow::new(["FA16"]);
        let rows = vec![
            raw("Doe, Jane", "ECE 35 - Analog", "FA16", "30"),
            raw("Roe, Rick", "CSE 11 - Intro", "FA16", "12"),
        ];
        (PipelineRun::build(&RawTable::from(rows), &window), window)
    }

    #[test]
    fn test_print_json_writes_parseable_json() {
        let (run, _) = sample_run();
        let mut out = Vec::new();

        print_json(&mut out, &run.catalog).unwrap();

        assert!(out.ends_with(b"\n"));
        let parsed: CatalogIndex = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed, run.catalog);
    }

    #[test]
    fn test_write_then_load_gives_back_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let (run, window) = sample_run();

        write_outputs(dir.path(), &run, &run.summary(&window)).unwrap();
        let loaded = load_outputs(dir.path()).unwrap();

        assert_eq!(loaded, OutputSet::from(&run));
        assert!(dir.path().join(SUMMARY_FILE).exists());
    }

    #[test]
    fn test_load_outputs_missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_outputs(dir.path().join("absent")).is_err());
    }
}
