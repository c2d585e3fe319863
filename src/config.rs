//! Run configuration, passed explicitly through the pipeline.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::aggregator::{CalcType, Calculation, GroupingDef, IntervalKind};

/// Input filenames must be a bare positive integer stem; capture group 1 is
/// the stream id.
pub const DEFAULT_FILE_PATTERN: &str = r"^([1-9][0-9]*)\.csv$";

pub const STREAM_OUTPUT_FILE: &str = "stream_level_data.csv";
pub const DAILY_OUTPUT_FILE: &str = "daily_interval_data.csv";
pub const HOURLY_OUTPUT_FILE: &str = "hourly_interval_data.csv";

/// Everything one batch run needs: where to read, how to recognize stream
/// files, and which grouping definitions to produce.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub file_pattern: Regex,
    pub stream_output_path: PathBuf,
    pub groupings: Vec<GroupingDef>,
}

impl RunConfig {
    /// Builds a config with the default filename pattern and the built-in
    /// daily and hourly groupings, all outputs under `output_dir`.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: &Path) -> Self {
        Self {
            input_dir: input_dir.into(),
            file_pattern: Regex::new(DEFAULT_FILE_PATTERN).expect("default pattern is valid"),
            stream_output_path: output_dir.join(STREAM_OUTPUT_FILE),
            groupings: vec![daily_grouping(output_dir), hourly_grouping(output_dir)],
        }
    }
}

fn daily_grouping(output_dir: &Path) -> GroupingDef {
    GroupingDef {
        name: "day_interval".to_string(),
        kind: IntervalKind::Daily,
        calcs: calcs(&[
            ("day_max", CalcType::Max),
            ("day_min", CalcType::Min),
            ("day_median", CalcType::Median),
            ("day_mean", CalcType::Mean),
        ]),
        output_path: output_dir.join(DAILY_OUTPUT_FILE),
    }
}

fn hourly_grouping(output_dir: &Path) -> GroupingDef {
    GroupingDef {
        name: "hour_interval".to_string(),
        kind: IntervalKind::Hourly,
        calcs: calcs(&[
            ("hour_max", CalcType::Max),
            ("hour_min", CalcType::Min),
            ("hour_median", CalcType::Median),
            ("hour_mean", CalcType::Mean),
        ]),
        output_path: output_dir.join(HOURLY_OUTPUT_FILE),
    }
}

fn calcs(pairs: &[(&str, CalcType)]) -> Vec<Calculation> {
    pairs
        .iter()
        .map(|(column_name, calc_type)| Calculation {
            column_name: (*column_name).to_string(),
            calc_type: *calc_type,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_builtin_groupings() {
        let config = RunConfig::new("input", Path::new("Output"));

        assert_eq!(config.groupings.len(), 2);
        assert_eq!(config.groupings[0].name, "day_interval");
        assert_eq!(config.groupings[1].name, "hour_interval");
        assert_eq!(
            config.stream_output_path,
            Path::new("Output").join(STREAM_OUTPUT_FILE)
        );
    }

    #[test]
    fn test_builtin_calc_columns_in_configured_order() {
        let config = RunConfig::new("input", Path::new("Output"));

        let daily: Vec<&str> = config.groupings[0]
            .calcs
            .iter()
            .map(|c| c.column_name.as_str())
            .collect();
        assert_eq!(daily, vec!["day_max", "day_min", "day_median", "day_mean"]);

        let hourly: Vec<&str> = config.groupings[1]
            .calcs
            .iter()
            .map(|c| c.column_name.as_str())
            .collect();
        assert_eq!(
            hourly,
            vec!["hour_max", "hour_min", "hour_median", "hour_mean"]
        );
    }

    #[test]
    fn test_default_pattern_captures_stream_id() {
        let pattern = Regex::new(DEFAULT_FILE_PATTERN).unwrap();

        let captures = pattern.captures("42.csv").unwrap();
        assert_eq!(&captures[1], "42");

        assert!(pattern.captures("0.csv").is_none());
        assert!(pattern.captures("42.csv.gz").is_none());
    }

    #[test]
    fn test_grouping_output_paths() {
        let config = RunConfig::new("input", Path::new("Output"));

        assert_eq!(
            config.groupings[0].output_path,
            Path::new("Output").join(DAILY_OUTPUT_FILE)
        );
        assert_eq!(
            config.groupings[1].output_path,
            Path::new("Output").join(HOURLY_OUTPUT_FILE)
        );
    }
}
