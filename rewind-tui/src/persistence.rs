//! The saved replay position, so reopening a run resumes where it was left.

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub run_id: String,
    pub current_step_index: usize,
    pub playback_speed: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Corrupt replay state: {0}")]
    Decode(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PersistenceError + '_ {
    move |source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read the saved state. A missing file is `Ok(None)`.
pub fn load(path: &Path) -> Result<Option<PersistedState>, PersistenceError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_error(path)(err)),
    }
}

/// Load the saved state only if it belongs to `run_id`.
pub fn load_for_run(path: &Path, run_id: &str) -> Result<Option<PersistedState>, PersistenceError> {
    Ok(load(path)?.filter(|state| state.run_id == run_id))
}

/// Write through a sibling `.tmp` file, then rename it into place.
pub fn save(path: &Path, state: &PersistedState) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    let staging = path.with_extension("tmp");
    std::fs::write(&staging, serde_json::to_vec_pretty(state)?).map_err(io_error(&staging))?;
    std::fs::rename(&staging, path).map_err(io_error(path))
}
