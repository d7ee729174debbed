//! Reusable widget components.

pub mod detail;
pub mod json;
pub mod kpi;
pub mod progress;

pub use detail::DetailPanel;
pub use json::JsonHighlighter;
pub use kpi::KpiTile;
pub use progress::PlaybackBar;
