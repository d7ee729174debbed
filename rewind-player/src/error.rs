//! Error types for the replay player

use rewind_core::ConfigError;
use thiserror::Error;

/// Errors raised while setting up playback.
///
/// Once a session exists, every replay operation is total.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlayerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No tokio runtime available to drive playback ticks")]
    NoRuntime,
}

/// Result type for player setup.
pub type PlayerResult<T> = Result<T, PlayerError>;
