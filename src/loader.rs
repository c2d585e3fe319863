//! CSV intake for per-stream measurement files.
//!
//! Enforces the fixed column schema and converts rows into typed [`Record`]s.
//! Intake failures are captured as [`IntakeError`] on the returned stream
//! rather than aborting the batch.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;

use crate::stream::{Record, Stream};

/// Columns that must be present in every input file. Any other column in the
/// source is dropped on read.
pub const REQUIRED_COLUMNS: [&str; 5] = ["timestamp", "dttm_utc", "value", "estimated", "anomaly"];

/// A per-stream intake failure. The stream is reported with status Error and
/// excluded from interval aggregation; the batch continues.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Missing required column(s): {0}")]
    MissingColumns(String),

    #[error("Malformed record: {0}")]
    Malformed(#[from] csv::Error),

    #[error("Invalid dttm_utc value: {0}")]
    Datetime(String),

    #[error("Timestamp out of range: {0}")]
    Timestamp(i64),
}

/// Row shape as it appears in the file; `dttm_utc` stays raw text until the
/// sibling `timestamp` is available as a fallback.
#[derive(Debug, Deserialize)]
struct RawRecord {
    timestamp: i64,
    dttm_utc: String,
    #[serde(deserialize_with = "nan_when_empty")]
    value: f64,
    estimated: i64,
    #[serde(deserialize_with = "nan_when_empty")]
    anomaly: f64,
}

fn nan_when_empty<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.unwrap_or(f64::NAN))
}

/// Loads one stream's file, capturing any intake failure on the stream itself.
pub fn load(stream_id: u32, path: &Path) -> Stream {
    match read_records_from_path(path) {
        Ok(records) => {
            debug!(stream_id, records = records.len(), "Stream loaded");
            Stream::loaded(stream_id, records)
        }
        Err(err) => {
            debug!(stream_id, error = %err, "Stream intake failed");
            Stream::failed(stream_id, err)
        }
    }
}

fn read_records_from_path(path: &Path) -> Result<Vec<Record>, IntakeError> {
    let file = File::open(path).map_err(|source| IntakeError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    read_records(file)
}

/// Parses CSV rows from `reader` into [`Record`]s.
///
/// # Errors
///
/// Returns an error when a required column is absent or a value cannot be
/// coerced to its column type.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<Record>, IntakeError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(IntakeError::MissingColumns(missing.join(", ")));
    }

    let mut records = Vec::new();
    for row in csv_reader.deserialize::<RawRecord>() {
        let raw = row?;
        let dttm_utc = parse_dttm(&raw.dttm_utc, raw.timestamp)?;
        records.push(Record {
            timestamp: raw.timestamp,
            dttm_utc,
            value: raw.value,
            estimated: raw.estimated,
            anomaly: raw.anomaly,
        });
    }

    Ok(records)
}

/// An empty `dttm_utc` field is derived from the epoch-seconds timestamp.
fn parse_dttm(raw: &str, epoch_secs: i64) -> Result<NaiveDateTime, IntakeError> {
    if raw.is_empty() {
        return DateTime::from_timestamp(epoch_secs, 0)
            .map(|dt| dt.naive_utc())
            .ok_or(IntakeError::Timestamp(epoch_secs));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|_| IntakeError::Datetime(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const HEADER: &str = "timestamp,dttm_utc,value,estimated,anomaly\n";

    #[test]
    fn test_read_records_parses_typed_rows() {
        let data = format!(
            "{HEADER}\
             1325376000,2012-01-01 00:00:00,7.2386,0,0.0\n\
             1325376300,2012-01-01 00:05:00,6.6226,1,0.5\n"
        );
        let records = read_records(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, 1325376000);
        assert_eq!(records[0].dttm_utc.year(), 2012);
        assert_eq!(records[0].value, 7.2386);
        assert_eq!(records[1].estimated, 1);
        assert_eq!(records[1].anomaly, 0.5);
    }

    #[test]
    fn test_empty_value_field_becomes_nan() {
        let data = format!("{HEADER}1325376000,2012-01-01 00:00:00,,0,\n");
        let records = read_records(data.as_bytes()).unwrap();

        assert!(records[0].value.is_nan());
        assert!(records[0].anomaly.is_nan());
    }

    #[test]
    fn test_nan_literal_parses_to_nan() {
        let data = format!("{HEADER}1325376000,2012-01-01 00:00:00,NaN,0,0.0\n");
        let records = read_records(data.as_bytes()).unwrap();

        assert!(records[0].value.is_nan());
    }

    #[test]
    fn test_missing_column_is_intake_error() {
        let data = "timestamp,dttm_utc,estimated,anomaly\n1325376000,2012-01-01 00:00:00,0,0.0\n";
        let err = read_records(data.as_bytes()).unwrap_err();

        match err {
            IntakeError::MissingColumns(columns) => assert_eq!(columns, "value"),
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_value_is_intake_error() {
        let data = format!("{HEADER}1325376000,2012-01-01 00:00:00,7.0,not_a_number,0.0\n");
        let err = read_records(data.as_bytes()).unwrap_err();

        assert!(matches!(err, IntakeError::Malformed(_)));
    }

    #[test]
    fn test_extra_columns_are_dropped() {
        let data = "timestamp,dttm_utc,value,estimated,anomaly,site\n\
                    1325376000,2012-01-01 00:00:00,7.0,0,0.0,boston\n";
        let records = read_records(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, 7.0);
    }

    #[test]
    fn test_header_only_file_yields_zero_records() {
        let records = read_records(HEADER.as_bytes()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_dttm_accepts_t_separator() {
        let data = format!("{HEADER}1325376000,2012-01-01T06:00:00,7.0,0,0.0\n");
        let records = read_records(data.as_bytes()).unwrap();

        assert_eq!(records[0].dttm_utc.hour(), 6);
    }

    #[test]
    fn test_empty_dttm_is_derived_from_timestamp() {
        // 1325376000 == 2012-01-01 00:00:00 UTC
        let data = format!("{HEADER}1325376000,,7.0,0,0.0\n");
        let records = read_records(data.as_bytes()).unwrap();

        assert_eq!(records[0].dttm_utc.year(), 2012);
        assert_eq!(records[0].dttm_utc.month(), 1);
        assert_eq!(records[0].dttm_utc.day(), 1);
        assert_eq!(records[0].dttm_utc.hour(), 0);
    }

    #[test]
    fn test_unparseable_dttm_is_intake_error() {
        let data = format!("{HEADER}1325376000,01/01/2012,7.0,0,0.0\n");
        let err = read_records(data.as_bytes()).unwrap_err();

        assert!(matches!(err, IntakeError::Datetime(_)));
    }

    #[test]
    fn test_load_missing_file_fails_stream() {
        let stream = load(42, Path::new("/nonexistent/42.csv"));

        assert!(!stream.is_valid());
        assert!(matches!(
            stream.intake_error(),
            Some(IntakeError::FileRead { .. })
        ));
    }
}
