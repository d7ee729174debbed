//! Event types for the TUI event loop.

use crossterm::event::KeyEvent;
use rewind_core::RunSources;

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Input(KeyEvent),
    Resize { width: u16, height: u16 },
    /// A fetched payload that differs from the previous one.
    Sources(RunSources),
    /// The latest poll succeeded but the payload was unchanged.
    SourceUnchanged,
    SourceError(String),
}
