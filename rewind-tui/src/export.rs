//! Writing replay exports to disk.

use chrono::{DateTime, Utc};
use rewind_core::ReplayExport;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// `replay-{run_id}-{unix_ms}.json`, with path separators in the run id replaced.
pub fn export_file_name(run_id: &str, at: DateTime<Utc>) -> String {
    let safe: String = run_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("replay-{}-{}.json", safe, at.timestamp_millis())
}

/// Write `export` under `dir` and return the file path.
pub fn write_export(dir: &Path, export: &ReplayExport) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(&export.run_id, export.exported_at));
    std::fs::write(&path, export.to_json_pretty()?)?;
    Ok(path)
}
