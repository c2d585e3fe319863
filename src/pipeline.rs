//! Batch orchestration: discover, classify, aggregate, rank, write.

use anyhow::Result;
use tracing::info;

use crate::aggregator::aggregate;
use crate::classifier::classify;
use crate::config::RunConfig;
use crate::discover::discover_streams;
use crate::loader;
use crate::notify::{Notifier, Severity};
use crate::output::{write_intervals, write_summary};
use crate::report::ReportAccumulator;

/// What the run did, for logging and tests.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub streams_processed: usize,
    pub streams_valid: usize,
    pub halted: bool,
}

/// Runs one batch over `config.input_dir`.
///
/// Per-stream failures are absorbed into the stream summary and never
/// interrupt the loop; only a bad input directory or an empty file list
/// halts the run, after notifying.
#[tracing::instrument(skip_all, fields(input_dir = %config.input_dir.display()))]
pub fn run(config: &RunConfig, notifier: &dyn Notifier) -> Result<BatchOutcome> {
    let files = match discover_streams(&config.input_dir, &config.file_pattern) {
        Ok(files) => files,
        Err(err) => {
            notifier.notify(Severity::Critical, &err.to_string());
            return Ok(BatchOutcome {
                halted: true,
                ..Default::default()
            });
        }
    };

    if files.is_empty() {
        notifier.notify(Severity::Warning, "No files found");
        return Ok(BatchOutcome {
            halted: true,
            ..Default::default()
        });
    }

    let mut report = ReportAccumulator::new();
    let mut streams_valid = 0;

    for (stream_id, path) in &files {
        let stream_id = *stream_id;
        info!(stream_id, "Start processing stream");

        let mut stream = loader::load(stream_id, path);
        report.push_summary(classify(&mut stream));

        if !stream.is_valid() {
            info!(
                stream_id,
                "Stream is invalid, skipping interval-level calculations"
            );
            continue;
        }
        streams_valid += 1;

        for def in &config.groupings {
            info!(stream_id, grouping = %def.name, "Computing interval-level data");
            report.push_intervals(def, aggregate(&stream, def));
        }

        info!(stream_id, "Finished processing stream");
    }

    report.assign_ranks();

    info!(path = %config.stream_output_path.display(), "Writing stream summary");
    write_summary(&config.stream_output_path, report.summaries())?;

    for (name, table) in report.interval_tables() {
        info!(grouping = %name, path = %table.output_path.display(), "Writing interval summary");
        write_intervals(table)?;
    }

    Ok(BatchOutcome {
        streams_processed: files.len(),
        streams_valid,
        halted: false,
    })
}
