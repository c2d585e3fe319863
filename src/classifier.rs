//! Stream-level quality classification.

use serde::Serialize;
use tracing::debug;

use crate::stream::{Stream, StreamState};

pub const EMPTY_FILE_MESSAGE: &str = "Empty file - Structure is correct but has no data";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StreamStatus {
    Processed,
    Warning,
    Error,
}

/// One row of the stream-level summary report.
///
/// Column names are fixed for downstream compatibility; the quality fields
/// stay empty for Error and Warning rows.
#[derive(Debug, Serialize)]
pub struct StreamSummary {
    pub stream_id: u32,
    pub status: StreamStatus,
    pub message: Option<String>,
    pub rank: Option<u32>,
    #[serde(rename = "% of 0 and NaN")]
    pub pct_zero_and_nan: Option<f64>,
    #[serde(rename = "% of 0")]
    pub pct_zero: Option<f64>,
    #[serde(rename = "% of NaN")]
    pub pct_nan: Option<f64>,
    #[serde(rename = "count of 0 and NaN")]
    pub count_zero_and_nan: Option<u64>,
    #[serde(rename = "count of 0's")]
    pub count_zero: Option<u64>,
    #[serde(rename = "count of NaN")]
    pub count_nan: Option<u64>,
    pub ignore: bool,
}

impl StreamSummary {
    /// Row for a stream that never reaches quality computation.
    fn skipped(stream_id: u32, status: StreamStatus, message: String) -> Self {
        Self {
            stream_id,
            status,
            message: Some(message),
            rank: None,
            pct_zero_and_nan: None,
            pct_zero: None,
            pct_nan: None,
            count_zero_and_nan: None,
            count_zero: None,
            count_nan: None,
            ignore: true,
        }
    }
}

/// Computes the stream's quality counts and decides whether its data is
/// usable, advancing the stream's state to `Valid` or `Ignored`.
///
/// A stream is ignored when every record's value is one of {0, NaN, 1}.
/// Value 1 feeds only that decision; the reported counts and percentages
/// track 0 and NaN alone.
pub fn classify(stream: &mut Stream) -> StreamSummary {
    if let StreamState::Failed(err) = &stream.state {
        return StreamSummary::skipped(stream.stream_id, StreamStatus::Error, err.to_string());
    }

    let total = stream.total_intervals();
    if total == 0 {
        stream.state = StreamState::Ignored;
        return StreamSummary::skipped(
            stream.stream_id,
            StreamStatus::Warning,
            EMPTY_FILE_MESSAGE.to_string(),
        );
    }

    let mut count_zero = 0u64;
    let mut count_nan = 0u64;
    let mut count_one = 0u64;
    for record in &stream.records {
        if record.value.is_nan() {
            count_nan += 1;
        } else if record.value == 0.0 {
            count_zero += 1;
        } else if record.value == 1.0 {
            count_one += 1;
        }
    }

    let ignore = count_zero + count_nan + count_one == total as u64;
    stream.state = if ignore {
        StreamState::Ignored
    } else {
        StreamState::Valid
    };

    debug!(
        stream_id = stream.stream_id,
        count_zero, count_nan, count_one, ignore, "Stream classified"
    );

    let total = total as f64;
    StreamSummary {
        stream_id: stream.stream_id,
        status: StreamStatus::Processed,
        message: None,
        rank: None,
        pct_zero_and_nan: Some(round4((count_zero + count_nan) as f64 / total)),
        pct_zero: Some(round4(count_zero as f64 / total)),
        pct_nan: Some(round4(count_nan as f64 / total)),
        count_zero_and_nan: Some(count_zero + count_nan),
        count_zero: Some(count_zero),
        count_nan: Some(count_nan),
        ignore,
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
