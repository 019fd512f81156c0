//! CLI entry point for the CAPE rater.
//!
//! Builds the per-course ranking, time, grade and catalog mappings from a raw evaluation
//! table, and answers course lookups against a built output directory.

use anyhow::{Context, Result};
use cape_rater::analyzers::pipeline::PipelineRun;
use cape_rater::analyzers::writetos3::publish_run;
use cape_rater::config::TermWindow;
use cape_rater::fetch::{BasicClient, load_source};
use cape_rater::output::{load_outputs, print_json, write_outputs};
use cape_rater::parser::parse_raw_csv;
use cape_rater::report::{code_from_path, course_list, lookup, render};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "cape_rater")]
#[command(about = "Ranks instructors and rates courses from CAPE evaluations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline over a raw evaluation table and write the mappings
    Build {
        /// Path to a CSV export or a URL serving one
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Directory to write ranking/time/grade/catalog JSON into
        #[arg(short, long, default_value = "data")]
        out_dir: PathBuf,

        /// JSON file listing admissible terms
        #[arg(long, env = "CAPE_TERMS_FILE")]
        terms_file: Option<PathBuf>,

        /// Admissible term, repeatable; overrides --terms-file
        #[arg(short, long = "term", value_name = "TERM")]
        terms: Vec<String>,

        /// Optional: S3 bucket to publish the mappings to
        #[arg(long)]
        s3_bucket: Option<String>,

        /// Key prefix inside the S3 bucket
        #[arg(long, default_value = "")]
        s3_prefix: String,

        /// Fail the run when a course average has no letter grade
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Print the report for one course, e.g. `lookup ece 35`
    Lookup {
        dept: String,
        number: String,

        /// Directory produced by `build`
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// Print the report as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List every department and course with its URL slug
    Courses {
        /// Directory produced by `build`
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// Print the catalog and course slugs as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/cape_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("cape_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            source,
            out_dir,
            terms_file,
            terms,
            s3_bucket,
            s3_prefix,
            strict,
        } => {
            let window = resolve_window(terms, terms_file.as_deref())?;
            build(&source, &out_dir, &window, s3_bucket, &s3_prefix, strict).await?;
        }
        Commands::Lookup {
            dept,
            number,
            data_dir,
            json,
        } => {
            let outputs = load_outputs(&data_dir)?;
            let code = code_from_path(&dept, &number);
            let report = lookup(&outputs, &code);
            if json {
                print_json(&mut std::io::stdout().lock(), &report)?;
            } else {
                print!("{}", render(&report));
            }
        }
        Commands::Courses { data_dir, json } => {
            let outputs = load_outputs(&data_dir)?;
            if json {
                let courses: Vec<_> = course_list(&outputs)
                    .into_iter()
                    .map(|(code, slug)| serde_json::json!({ "code": code, "slug": slug }))
                    .collect();
                let listing = serde_json::json!({ "catalog": outputs.catalog, "courses": courses });
                print_json(&mut std::io::stdout().lock(), &listing)?;
                return Ok(());
            }
            for (dept, numbers) in &outputs.catalog {
                println!("{dept}: {}", numbers.join(", "));
            }
            println!();
            for (code, slug) in course_list(&outputs) {
                println!("{code}\t/{slug}");
            }
        }
    }

    Ok(())
}

/// Explicit `--term` flags win over a terms file; with neither, the built-in window applies.
fn resolve_window(terms: Vec<String>, terms_file: Option<&Path>) -> Result<TermWindow> {
    let window = if !terms.is_empty() {
        TermWindow::new(terms)
    } else if let Some(path) = terms_file {
        TermWindow::load(path)?
    } else {
        warn!("No term window configured, using the built-in FA15–S317 window");
        TermWindow::default_window()
    };

    anyhow::ensure!(!window.is_empty(), "term window is empty");
    info!(terms = ?window.iter().collect::<Vec<_>>(), "Term window");
    Ok(window)
}

/// Loads the raw table, runs the pipeline, writes the outputs and optionally publishes them.
#[tracing::instrument(skip(out_dir, window, s3_bucket), fields(out_dir = %out_dir.display()))]
async fn build(
    source: &str,
    out_dir: &Path,
    window: &TermWindow,
    s3_bucket: Option<String>,
    s3_prefix: &str,
    strict: bool,
) -> Result<()> {
    let client = BasicClient::new()?;
    let bytes = load_source(&client, source).await?;
    let raw = parse_raw_csv(&bytes).context("parsing raw evaluation table")?;
    info!(
        rows = raw.total_rows(),
        unreadable = raw.unreadable.len(),
        "Raw rows parsed"
    );

    let run = PipelineRun::build(&raw, window);

    if strict && !run.grade_errors.is_empty() {
        anyhow::bail!(
            "{} course(s) have an average GPA with no letter grade",
            run.grade_errors.len()
        );
    }

    let summary = run.summary(window);
    write_outputs(out_dir, &run, &summary)?;

    if let Some(bucket) = s3_bucket {
        let config = aws_config::load_from_env().await;
        let s3 = aws_sdk_s3::Client::new(&config);
        publish_run(&s3, &bucket, s3_prefix, &run).await?;
    }

    info!(
        ranked = summary.ranked_courses,
        dropped = run.dropped.len(),
        "Build finished"
    );
    Ok(())
}
