//! Time-bucketed aggregation over a valid stream's records.
//!
//! Grouping definitions are data: each names an interval kind, a list of
//! calculations, and an output destination. Adding a grouping or calculation
//! never touches the bucketing algorithm itself.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use thiserror::Error;

use crate::stream::Stream;

/// Raised when a grouping definition names a calculation that does not exist.
/// A programming/configuration error, not a data error.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown calc type: {0} (expected one of max, min, mean, median)")]
pub struct UnknownCalcType(pub String);

/// The closed set of supported per-bucket reductions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcType {
    Max,
    Min,
    Mean,
    Median,
}

impl CalcType {
    /// Reduces a bucket's values, skipping NaN entries. Returns `None` when
    /// no non-NaN values remain.
    pub fn reduce(&self, values: &[f64]) -> Option<f64> {
        let mut kept: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if kept.is_empty() {
            return None;
        }

        Some(match self {
            CalcType::Max => kept.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            CalcType::Min => kept.iter().copied().fold(f64::INFINITY, f64::min),
            CalcType::Mean => kept.iter().sum::<f64>() / kept.len() as f64,
            CalcType::Median => {
                kept.sort_by(f64::total_cmp);
                let mid = kept.len() / 2;
                if kept.len() % 2 == 0 {
                    (kept[mid - 1] + kept[mid]) / 2.0
                } else {
                    kept[mid]
                }
            }
        })
    }
}

impl FromStr for CalcType {
    type Err = UnknownCalcType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "max" => Ok(CalcType::Max),
            "min" => Ok(CalcType::Min),
            "mean" => Ok(CalcType::Mean),
            "median" => Ok(CalcType::Median),
            other => Err(UnknownCalcType(other.to_string())),
        }
    }
}

/// One named output column and the reduction that fills it.
#[derive(Debug, Clone)]
pub struct Calculation {
    pub column_name: String,
    pub calc_type: CalcType,
}

/// Bucket-key derivation from `dttm_utc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalKind {
    Daily,
    Hourly,
}

impl IntervalKind {
    /// Names of the column(s) that constitute the grouping key.
    pub fn key_columns(&self) -> &'static [&'static str] {
        match self {
            IntervalKind::Daily => &["day_interval"],
            IntervalKind::Hourly => &["day_interval", "hour_interval"],
        }
    }

    pub fn bucket_key(&self, dttm_utc: NaiveDateTime) -> BucketKey {
        match self {
            IntervalKind::Daily => BucketKey {
                date: dttm_utc.date(),
                hour: None,
            },
            IntervalKind::Hourly => BucketKey {
                date: dttm_utc.date(),
                hour: Some(dttm_utc.hour()),
            },
        }
    }
}

/// A bucket identity, ordered by date then hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BucketKey {
    pub date: NaiveDate,
    pub hour: Option<u32>,
}

impl BucketKey {
    /// Key fields rendered in output-column order.
    pub fn column_values(&self) -> Vec<String> {
        let mut fields = vec![self.date.to_string()];
        if let Some(hour) = self.hour {
            fields.push(hour.to_string());
        }
        fields
    }
}

/// A named grouping configuration: bucket-key derivation, calculation list,
/// and the output file the accumulated rows end up in.
#[derive(Debug, Clone)]
pub struct GroupingDef {
    pub name: String,
    pub kind: IntervalKind,
    pub calcs: Vec<Calculation>,
    pub output_path: PathBuf,
}

/// One output row: the stream id, the bucket key, and one value per
/// configured calculation (same order as the grouping's calc list).
#[derive(Debug)]
pub struct IntervalRow {
    pub stream_id: u32,
    pub key: BucketKey,
    pub values: Vec<f64>,
}

/// Buckets the stream's records by the grouping's key and applies every
/// configured calculation per bucket.
///
/// Rows come out in ascending key order, one per distinct key present in the
/// records. A bucket whose values are all NaN is omitted.
pub fn aggregate(stream: &Stream, def: &GroupingDef) -> Vec<IntervalRow> {
    let mut buckets: BTreeMap<BucketKey, Vec<f64>> = BTreeMap::new();
    for record in &stream.records {
        buckets
            .entry(def.kind.bucket_key(record.dttm_utc))
            .or_default()
            .push(record.value);
    }

    let mut rows = Vec::with_capacity(buckets.len());
    for (key, values) in buckets {
        // every calc shares the same NaN filter, so either all stats exist
        // or the bucket had no usable values
        let stats: Option<Vec<f64>> = def
            .calcs
            .iter()
            .map(|calc| calc.calc_type.reduce(&values))
            .collect();
        if let Some(values) = stats {
            rows.push(IntervalRow {
                stream_id: stream.stream_id,
                key,
                values,
            });
        }
    }

    rows
}
