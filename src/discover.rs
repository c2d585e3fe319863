//! Input file discovery for the batch run.

use std::path::{Path, PathBuf};

use regex::Regex;
use thiserror::Error;
use tracing::info;

/// Directory-level discovery failures. Both variants halt the batch before
/// any stream is processed.
#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("Invalid directory path: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to list directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Lists files in `dir` whose names match `pattern`, pairing each with the
/// stream id parsed from capture group 1 of the match. Results are ordered
/// by stream id.
pub fn discover_streams(
    dir: &Path,
    pattern: &Regex,
) -> Result<Vec<(u32, PathBuf)>, DiscoverError> {
    if !dir.is_dir() {
        return Err(DiscoverError::NotADirectory(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir).map_err(|source| DiscoverError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| DiscoverError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(captures) = pattern.captures(name) {
            if let Some(id) = captures.get(1).and_then(|m| m.as_str().parse().ok()) {
                found.push((id, entry.path()));
            }
        }
    }
    found.sort_by_key(|(id, _)| *id);

    info!(
        count = found.len(),
        dir = %dir.display(),
        pattern = %pattern,
        "Input files discovered"
    );
    Ok(found)
}
