use cape_rater::analyzers::assessment::Category;
use cape_rater::analyzers::pipeline::PipelineRun;
use cape_rater::config::TermWindow;
use cape_rater::output::{
    CATALOG_FILE, GRADE_FILE, OutputSet, RANKING_FILE, TIME_FILE, load_outputs, write_outputs,
};
use cape_rater::parser::parse_raw_csv;
use cape_rater::report::{Lookup, code_from_path, lookup};

fn sample_run() -> (PipelineRun, TermWindow) {
    let bytes = include_bytes!("fixtures/cape_sample.csv");
    let raw = parse_raw_csv(bytes).expect("Failed to parse fixture");
    let window = TermWindow::new(["FA16", "WI17", "SP17"]);
    (PipelineRun::build(&raw, &window), window)
}

#[test]
fn test_full_pipeline() {
    let (run, _) = sample_run();

    assert_eq!(run.clean_stats.input_rows, 12);
    assert_eq!(run.clean_stats.outside_window, 1);
    assert_eq!(run.clean_stats.kept, 8);
    assert_eq!(run.clean_stats.dropped.get("missing_field"), Some(&2));
    assert_eq!(run.clean_stats.dropped.get("malformed"), Some(&1));

    assert_eq!(run.ranking["CSE 11"], vec!["Ord, Rita", "Pike, Ned"]);
    assert!(!run.ranking.contains_key("ECE 45"));

    assert_eq!(run.time["CSE 11"].expected, 12.33);
    assert_eq!(run.time["CSE 11"].assessment.category, Category::Warn);
    assert_eq!(run.time["CSE 2"].assessment.category, Category::Relax);
    assert_eq!(run.time["MATH 20C"].assessment.category, Category::Neutral);

    assert_eq!(run.grade["CSE 11"].expected_letter_grade, "B");
    assert_eq!(run.grade["CSE 11"].assessment.category, Category::Warn);
    assert_eq!(run.grade["CSE 2"].expected_letter_grade, "A-");
    assert_eq!(run.grade["CSE 2"].assessment.category, Category::Relax);
    assert_eq!(run.grade["ECE 35"].expected_letter_grade, "C+");
    assert!(run.grade_errors.is_empty());

    assert_eq!(run.catalog["CSE"], vec!["2", "8A", "11"]);
    assert_eq!(run.catalog["MATH"], vec!["20C"]);
    assert_eq!(run.catalog.len(), 3);
}

#[test]
fn test_unreadable_row_is_dropped_not_fatal() {
    let mut csv = include_bytes!("fixtures/cape_sample.csv").to_vec();
    csv.extend_from_slice(
        b"12,\"Gar\xffbled, Al\",CSE 2 - Intro,FA16,40,20,90.0 %,90.0 %,5.00,A (4.00),A- (3.80)\n",
    );
    let raw = parse_raw_csv(&csv).expect("one bad row must not fail the table");
    let window = TermWindow::new(["FA16", "WI17", "SP17"]);

    let run = PipelineRun::build(&raw, &window);

    assert_eq!(run.clean_stats.input_rows, 13);
    assert_eq!(run.clean_stats.kept, 8);
    assert_eq!(run.clean_stats.dropped.get("unreadable"), Some(&1));
    assert_eq!(run.dropped.last().map(|d| d.row), Some(12));
    assert_eq!(run.ranking["CSE 11"], vec!["Ord, Rita", "Pike, Ned"]);
}

#[test]
fn test_large_sample_outranks_small_perfect_sample() {
    let (run, _) = sample_run();

    assert_eq!(run.ranking["MATH 20C"], vec!["Many, Good", "Few, Perfect"]);
}

#[test]
fn test_rerun_is_byte_identical() {
    let (first, window) = sample_run();
    let (second, _) = sample_run();

    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    write_outputs(a.path(), &first, &first.summary(&window)).unwrap();
    write_outputs(b.path(), &second, &second.summary(&window)).unwrap();

    for file in [RANKING_FILE, TIME_FILE, GRADE_FILE, CATALOG_FILE] {
        let left = std::fs::read(a.path().join(file)).unwrap();
        let right = std::fs::read(b.path().join(file)).unwrap();
        assert_eq!(left, right, "{file} differs between runs");
    }
}

#[test]
fn test_serving_lookups_from_disk() {
    let (run, window) = sample_run();
    let dir = tempfile::tempdir().unwrap();
    write_outputs(dir.path(), &run, &run.summary(&window)).unwrap();

    let outputs = load_outputs(dir.path()).unwrap();
    assert_eq!(outputs, OutputSet::from(&run));

    match lookup(&outputs, &code_from_path("math", "20c")) {
        Lookup::Found(report) => {
            assert_eq!(report.ranking, vec!["Many, Good", "Few, Perfect"]);
            assert_eq!(report.time.expected, 8.5);
            assert_eq!(report.grade.expected_letter_grade, "B");
        }
        other => panic!("expected MATH 20C to be found, got {other:?}"),
    }

    assert_eq!(
        lookup(&outputs, &code_from_path("ece", "45")),
        Lookup::NoData {
            code: "ECE 45".to_string()
        }
    );
}
