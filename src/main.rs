//! CLI entry point for the stream rater tool.
//!
//! Classifies per-stream measurement CSVs, ranks streams by data quality,
//! and writes stream-level and interval-level summary reports.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;
use regex::Regex;
use stream_rater::config::{DEFAULT_FILE_PATTERN, RunConfig};
use stream_rater::notify::LogNotifier;
use stream_rater::pipeline;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "stream_rater")]
#[command(about = "A tool to classify and summarize per-stream measurement CSVs", long_about = None)]
struct Cli {
    /// Directory containing the per-stream CSV files
    #[arg(value_name = "INPUT_DIR")]
    input_dir: PathBuf,

    /// Directory to write the summary CSVs to
    #[arg(short, long, default_value = "Output")]
    output_dir: PathBuf,

    /// Filename pattern; capture group 1 is the stream id
    #[arg(short, long, default_value = DEFAULT_FILE_PATTERN)]
    pattern: String,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/stream_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("stream_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let mut config = RunConfig::new(cli.input_dir, &cli.output_dir);
    config.file_pattern = Regex::new(&cli.pattern)?;

    info!("Process started");
    let start = std::time::Instant::now();

    let outcome = pipeline::run(&config, &LogNotifier)?;

    info!(
        streams = outcome.streams_processed,
        valid = outcome.streams_valid,
        halted = outcome.halted,
        duration_secs = start.elapsed().as_secs_f64(),
        "Process ended"
    );

    Ok(())
}
