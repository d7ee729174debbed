//! Error types for the TUI.

use crate::config::ConfigError;
use crate::persistence::PersistenceError;
use crate::source::SourceError;
use rewind_player::PlayerError;

#[derive(Debug, thiserror::Error)]
pub enum TuiError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Player(#[from] PlayerError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}
