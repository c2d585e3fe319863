//! Output formatting and persistence for batch reports.
//!
//! Supports pretty-printing, JSON serialization, and CSV writing.

use anyhow::Result;
use tracing::{debug, info};

use crate::classifier::StreamSummary;
use crate::report::IntervalTable;
use std::fs;
use std::path::Path;

/// Logs summary rows using Rust's debug pretty-print format.
pub fn print_pretty(rows: &[StreamSummary]) {
    debug!("{:#?}", rows);
}

/// Logs summary rows as pretty-printed JSON.
pub fn print_json(rows: &[StreamSummary]) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

/// Writes the stream-level summary table as CSV.
///
/// The header carries the legacy column names expected downstream;
/// Error/Warning rows leave their quality fields empty.
pub fn write_summary(path: &Path, rows: &[StreamSummary]) -> Result<()> {
    ensure_parent(path)?;
    debug!(path = %path.display(), rows = rows.len(), "Writing stream summary CSV");

    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes one grouping type's accumulated interval rows as CSV, to the
/// output path retained by the table.
pub fn write_intervals(table: &IntervalTable) -> Result<()> {
    ensure_parent(&table.output_path)?;
    debug!(
        path = %table.output_path.display(),
        rows = table.rows.len(),
        "Writing interval summary CSV"
    );

    let mut writer = csv::Writer::from_path(&table.output_path)?;

    let mut header = vec!["stream_id"];
    header.extend(table.key_columns);
    header.extend(table.calc_columns.iter().map(String::as_str));
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut fields = vec![row.stream_id.to_string()];
        fields.extend(row.key.column_values());
        fields.extend(row.values.iter().map(|v| v.to_string()));
        writer.write_record(&fields)?;
    }
    writer.flush()?;

    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
