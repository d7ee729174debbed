//! Error types for REWIND operations
//!
//! Replay navigation and timeline building never fail; these errors cover the
//! edges around them: configuration and decoding fetched run data.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Incompatible options: {option_a} and {option_b}")]
    IncompatibleOptions { option_a: String, option_b: String },
}

/// Errors raised while loading run data from bytes or disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read run data from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode run data: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Master error type for all REWIND errors.
#[derive(Debug, Error)]
pub enum RewindError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

/// Result type alias for REWIND operations.
pub type RewindResult<T> = Result<T, RewindError>;

// =============================================================================
// TESTS
// =============================================================================
