//! Append-only accumulation of per-stream results and final ranking.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use crate::aggregator::{GroupingDef, IntervalRow};
use crate::classifier::StreamSummary;

/// Accumulated interval rows for one grouping type, plus everything needed
/// to write them out.
#[derive(Debug)]
pub struct IntervalTable {
    pub key_columns: &'static [&'static str],
    pub calc_columns: Vec<String>,
    pub output_path: PathBuf,
    pub rows: Vec<IntervalRow>,
}

/// Collects every stream's summary row and interval rows across the batch.
/// Interval tables are created lazily, one per grouping-type name.
#[derive(Debug, Default)]
pub struct ReportAccumulator {
    summaries: Vec<StreamSummary>,
    intervals: BTreeMap<String, IntervalTable>,
}

impl ReportAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_summary(&mut self, row: StreamSummary) {
        self.summaries.push(row);
    }

    pub fn push_intervals(&mut self, def: &GroupingDef, rows: Vec<IntervalRow>) {
        let table = self
            .intervals
            .entry(def.name.clone())
            .or_insert_with(|| IntervalTable {
                key_columns: def.kind.key_columns(),
                calc_columns: def.calcs.iter().map(|c| c.column_name.clone()).collect(),
                output_path: def.output_path.clone(),
                rows: Vec::new(),
            });
        table.rows.extend(rows);
    }

    /// Dense-ranks the non-ignored summary rows on `count of 0 and NaN`,
    /// descending: ties share a rank and the next distinct count gets the
    /// immediately following integer. Ignored rows keep `rank = None` and
    /// never consume a rank slot.
    pub fn assign_ranks(&mut self) {
        let mut counts: Vec<u64> = self
            .summaries
            .iter()
            .filter(|s| !s.ignore)
            .filter_map(|s| s.count_zero_and_nan)
            .collect();
        counts.sort_unstable_by(|a, b| b.cmp(a));
        counts.dedup();

        for summary in &mut self.summaries {
            if summary.ignore {
                continue;
            }
            summary.rank = summary.count_zero_and_nan.and_then(|count| {
                counts
                    .iter()
                    .position(|&c| c == count)
                    .map(|idx| idx as u32 + 1)
            });
        }

        debug!(
            ranked = self.summaries.iter().filter(|s| s.rank.is_some()).count(),
            distinct_counts = counts.len(),
            "Dense rank assigned"
        );
    }

    pub fn summaries(&self) -> &[StreamSummary] {
        &self.summaries
    }

    pub fn interval_tables(&self) -> impl Iterator<Item = (&String, &IntervalTable)> {
        self.intervals.iter()
    }
}
