use chrono::NaiveDateTime;

use crate::loader::IntakeError;

/// One measurement row from a stream's CSV file.
///
/// `value` and `anomaly` may be NaN when the source field was empty.
#[derive(Debug, Clone)]
pub struct Record {
    pub timestamp: i64,
    pub dttm_utc: NaiveDateTime,
    pub value: f64,
    pub estimated: i64,
    pub anomaly: f64,
}

/// Validity lifecycle of a stream.
///
/// A stream moves `Loaded -> Valid | Ignored` exactly once, when classified.
/// `Failed` is terminal: intake failed and no records were retained.
#[derive(Debug)]
pub enum StreamState {
    Failed(IntakeError),
    Loaded,
    Valid,
    Ignored,
}

/// The unit of processing: one input file's time series, identified by the
/// numeric id parsed from its filename.
#[derive(Debug)]
pub struct Stream {
    pub stream_id: u32,
    pub records: Vec<Record>,
    pub state: StreamState,
}

impl Stream {
    pub fn loaded(stream_id: u32, records: Vec<Record>) -> Self {
        Self {
            stream_id,
            records,
            state: StreamState::Loaded,
        }
    }

    pub fn failed(stream_id: u32, error: IntakeError) -> Self {
        Self {
            stream_id,
            records: Vec::new(),
            state: StreamState::Failed(error),
        }
    }

    pub fn total_intervals(&self) -> usize {
        self.records.len()
    }

    /// Only classified, informative streams take part in interval reports.
    pub fn is_valid(&self) -> bool {
        matches!(self.state, StreamState::Valid)
    }

    pub fn intake_error(&self) -> Option<&IntakeError> {
        match &self.state {
            StreamState::Failed(err) => Some(err),
            _ => None,
        }
    }
}
